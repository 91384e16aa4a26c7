//! The BMC core: Frame Builder, BMC Engine, and Witness Reconstructor,
//! plus engine option handling.

mod engine;
mod frame;
mod options;
mod witness;

pub use engine::{BmcEngine, EngineState};
pub use options::{BmcOpt, Options};
