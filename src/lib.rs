//! A bounded model checker over an SMT/bit-vector circuit, with a
//! pluggable incremental SAT backend abstraction.
//!
//! The crate unrolls a symbolic finite-state transition system — inputs,
//! latches with initial values and next-state functions, environment
//! constraints, and bad-state properties — up to a bound *k*, delegating
//! each bounded query to an incremental SAT solver, and reports the
//! smallest bound at which any bad-state property is satisfiable
//! together with a concrete counterexample trace.
//!
//! [`sat`] is the solver-agnostic façade over the pluggable backend
//! drivers; [`circuit`] is the bit-vector node DAG and its one concrete
//! Tseitin bit-blasting implementation; [`bmc`] is the unroller, engine,
//! and witness reconstructor built on top of both.

pub mod bmc;
pub mod circuit;
pub mod errors;
pub mod sat;

pub use bmc::{BmcEngine, BmcOpt, EngineState};
pub use circuit::{BvCircuit, Circuit};
pub use sat::{BackendKind, SatManager, SolveResult};
