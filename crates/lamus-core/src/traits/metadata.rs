//! Metadata document API trait and the document model it exchanges.

use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// The kind of node a document reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    /// A nested metadata document.
    Metadata,
    /// A resource file.
    Resource,
}

/// A reference from a metadata document to one of its children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentReference {
    /// Target of the reference: archive URI, handle, or URL.
    pub uri: String,
    /// Optional local location hint stored next to the target.
    pub local_uri: Option<String>,
    /// Metadata or resource.
    pub kind: ReferenceKind,
    /// Mimetype declared by the reference (resources only).
    pub mimetype: Option<String>,
}

impl DocumentReference {
    /// A reference to a nested metadata document.
    pub fn metadata(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            local_uri: None,
            kind: ReferenceKind::Metadata,
            mimetype: None,
        }
    }

    /// A reference to a resource with its declared mimetype.
    pub fn resource(uri: impl Into<String>, mimetype: Option<String>) -> Self {
        Self {
            uri: uri.into(),
            local_uri: None,
            kind: ReferenceKind::Resource,
            mimetype,
        }
    }
}

/// A parsed metadata document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataDocument {
    /// Display name of the described node.
    pub name: String,
    /// Location of the profile schema the document follows.
    pub schema_location: Option<String>,
    /// Handle recorded inside the document, if any.
    pub handle: Option<String>,
    /// Whether this document type can reference children at all.
    pub referencing: bool,
    /// References in document order.
    pub references: Vec<DocumentReference>,
}

impl MetadataDocument {
    /// Append a reference to a nested metadata document.
    pub fn add_metadata_reference(&mut self, uri: impl Into<String>) -> &DocumentReference {
        self.references.push(DocumentReference::metadata(uri));
        &self.references[self.references.len() - 1]
    }

    /// Append a reference to a resource.
    pub fn add_resource_reference(
        &mut self,
        uri: impl Into<String>,
        mimetype: Option<String>,
    ) -> &DocumentReference {
        self.references.push(DocumentReference::resource(uri, mimetype));
        &self.references[self.references.len() - 1]
    }

    /// Remove every reference pointing at `uri`. Returns true if any was removed.
    pub fn remove_reference(&mut self, uri: &str) -> bool {
        let before = self.references.len();
        self.references.retain(|r| r.uri != uri);
        self.references.len() != before
    }

    /// Find the first reference pointing at `uri`.
    pub fn find_reference(&self, uri: &str) -> Option<&DocumentReference> {
        self.references.iter().find(|r| r.uri == uri)
    }
}

/// Parsing and serialization of metadata documents.
#[async_trait]
pub trait MetadataApi: Send + Sync + std::fmt::Debug + 'static {
    /// Fetch and parse the document at `url`.
    async fn fetch_document(&self, url: &str) -> AppResult<MetadataDocument>;

    /// Serialize a document back to its on-disk representation.
    fn serialize_document(&self, document: &MetadataDocument) -> AppResult<Bytes>;

    /// Whether the file at `path` is a metadata document (by name or content sniffing).
    fn is_metadata_file(&self, path: &Path) -> bool;
}
