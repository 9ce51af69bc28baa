//! # lamus-core
//!
//! Core crate for the LAMUS workspace importer. Contains the unified error
//! system, configuration schemas, typed identifiers, tracing setup, and the
//! traits through which the importer talks to its external collaborators
//! (archive graph, metadata documents, type checker, handle server).
//!
//! This crate has **no** internal dependencies on other LAMUS crates.

pub mod config;
pub mod error;
pub mod result;
pub mod telemetry;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
