//! The bit-vector circuit collaborator and the one concrete driver the
//! engine can exercise end to end.

pub mod bitblast;
pub mod model;
pub mod subst;
mod tseitin;

pub use bitblast::BvCircuit;
pub use model::{Circuit, Op};
