//! Semantic type of a workspace node.

use serde::{Deserialize, Serialize};
use std::fmt;

use lamus_core::traits::ArchiveNodeKind;

/// Mimetypes of metadata documents.
pub const METADATA_MIMETYPES: [&str; 2] = ["text/x-cmdi+xml", "text/x-imdi+xml"];

/// What kind of content a workspace node holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "workspace_node_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WorkspaceNodeType {
    /// A metadata document.
    Metadata,
    /// Audio recording.
    ResourceAudio,
    /// Video recording.
    ResourceVideo,
    /// Image.
    ResourceImage,
    /// Written resource (text, annotation, PDF).
    ResourceWritten,
    /// Any other resource the archive accepts.
    ResourceOther,
    /// Type could not be determined.
    Unknown,
}

impl WorkspaceNodeType {
    /// Derive the node type from a mimetype.
    pub fn from_mimetype(mimetype: Option<&str>) -> Self {
        let Some(mimetype) = mimetype.map(str::trim).filter(|m| !m.is_empty()) else {
            return Self::Unknown;
        };
        let mimetype = mimetype.to_ascii_lowercase();

        if METADATA_MIMETYPES.contains(&mimetype.as_str()) {
            Self::Metadata
        } else if mimetype.starts_with("audio/") {
            Self::ResourceAudio
        } else if mimetype.starts_with("video/") {
            Self::ResourceVideo
        } else if mimetype.starts_with("image/") {
            Self::ResourceImage
        } else if mimetype.starts_with("text/") || mimetype == "application/pdf" {
            Self::ResourceWritten
        } else {
            Self::ResourceOther
        }
    }

    /// Map an archive node kind, refining resources by mimetype.
    pub fn from_archive(kind: ArchiveNodeKind, mimetype: Option<&str>) -> Self {
        match kind {
            ArchiveNodeKind::Metadata => Self::Metadata,
            ArchiveNodeKind::Resource => match Self::from_mimetype(mimetype) {
                Self::Metadata => Self::ResourceOther,
                other => other,
            },
        }
    }

    /// Whether this is a metadata node.
    pub fn is_metadata(&self) -> bool {
        matches!(self, Self::Metadata)
    }

    /// Return the type as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Metadata => "metadata",
            Self::ResourceAudio => "resource_audio",
            Self::ResourceVideo => "resource_video",
            Self::ResourceImage => "resource_image",
            Self::ResourceWritten => "resource_written",
            Self::ResourceOther => "resource_other",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for WorkspaceNodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
