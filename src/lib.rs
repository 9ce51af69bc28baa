//! LAMUS workspace import pipeline.
//!
//! Re-exports the workspace crates under one name.

pub use lamus_core;
pub use lamus_database;
pub use lamus_entity;
pub use lamus_service;
pub use lamus_storage;
pub use lamus_worker;
