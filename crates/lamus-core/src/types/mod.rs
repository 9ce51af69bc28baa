//! Core type definitions used across the LAMUS workspace.

pub mod id;

pub use id::*;
