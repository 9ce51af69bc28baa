//! # lamus-database
//!
//! Persistence for workspaces, workspace nodes, and node links. The
//! [`WorkspaceDao`] trait is the single entry point the importer uses; it
//! owns the pre-lock predicate so the check and the registration of a new
//! workspace happen in one critical section.
//!
//! Two implementations are provided:
//! - [`PgWorkspaceDao`] on PostgreSQL (transaction-scoped advisory lock)
//! - [`MemoryWorkspaceDao`] in process (`tokio::sync::Mutex`)

pub mod connection;
pub mod dao;
pub mod memory;
pub mod migration;
pub mod postgres;
pub mod repositories;

pub use connection::DatabasePool;
pub use dao::WorkspaceDao;
pub use memory::MemoryWorkspaceDao;
pub use postgres::PgWorkspaceDao;
