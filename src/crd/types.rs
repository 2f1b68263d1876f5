//! Shared types for the snapshot resources

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// What happens to the backing snapshot when its content object is deleted
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub enum DeletionPolicy {
    /// Delete the physical snapshot with the content object
    #[default]
    Delete,
    /// Keep the physical snapshot
    Retain,
}

impl std::fmt::Display for DeletionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Delete => write!(f, "Delete"),
            Self::Retain => write!(f, "Retain"),
        }
    }
}

/// Last error reported by the snapshot controller or CSI driver
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VolumeSnapshotError {
    /// Error message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// RFC 3339 timestamp of when the error occurred
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}
