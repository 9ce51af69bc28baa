//! Traits for the external collaborators the importer depends on.
//!
//! They are defined here in `lamus-core` and implemented by the hosting
//! application (or by in-process fakes in tests).

pub mod archive;
pub mod handle;
pub mod metadata;
pub mod typecheck;

pub use archive::{ArchiveGraphProvider, ArchiveNode, ArchiveNodeKind};
pub use handle::HandleService;
pub use metadata::{DocumentReference, MetadataApi, MetadataDocument, ReferenceKind};
pub use typecheck::{TypeChecker, TypecheckVerdict};
