#![forbid(unsafe_code)]

//! Release maintenance toolkit for FrankenDOM sources.

pub mod cli;
pub mod error;
pub mod stamp;

pub use cli::run_from_env;
pub use error::{DoctorError, Result};
