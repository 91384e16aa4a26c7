//! Error types for the SAT manager and BMC engine.
//!
//! Programmer-usage mistakes (calling `next` after frames are built,
//! reading an assignment when the engine isn't `SAT`, ...) are asserts,
//! not values in this enum. What lives here are the two recoverable
//! failure classes: bad backend configuration, and driver-level
//! failures surfaced while talking to a SAT backend.

use thiserror::Error;

/// Recoverable configuration failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("backend already initialized; enable_<backend> must run before init()")]
    AlreadyInitialized,
    #[error("unknown option key {0:?}")]
    UnknownOption(String),
    #[error("malformed option string {0:?}: expected comma-separated key=value pairs")]
    MalformedOptionString(String),
    #[error("invalid value {value:?} for option {key:?}")]
    InvalidOptionValue { key: String, value: String },
    #[error("option {0:?} is out of range [{1}, {2}]")]
    OutOfRange(&'static str, i64, i64),
}

/// Failures surfaced by a SAT backend driver, plus driver-reported
/// I/O-ish failures. `VariableOverflow` is the one fatal case the
/// manager treats as an abort rather than a return value; it is still
/// modeled as a value here so callers embedding the manager in a larger
/// program can choose how to fail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SatManagerError {
    #[error("CNF variable id overflow: backend returned a non-positive id")]
    VariableOverflow,
    #[error("backend driver does not support {0} in the current mode")]
    UnsupportedCapability(&'static str),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
