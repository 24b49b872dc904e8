//! Chartfold Core
//!
//! Shared plumbing for the chartfold crates: logging bootstrap, profiling
//! scopes and the numeric limits every layer agrees on.

pub mod limits;
pub mod logging;
pub mod profiling;
