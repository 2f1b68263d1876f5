//! VolumeSnapshotContent resource
//!
//! Cluster-scoped object representing the physical snapshot on the storage
//! system. Bound one-to-one to a VolumeSnapshot by the snapshot controller.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::types::{DeletionPolicy, VolumeSnapshotError};

/// Physical source of the snapshot content
///
/// Exactly one of the fields is set.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VolumeSnapshotContentSource {
    /// CSI volume handle to snapshot (dynamic provisioning)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_handle: Option<String>,

    /// Existing CSI snapshot handle (static provisioning)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_handle: Option<String>,
}

/// Reference back to the bound VolumeSnapshot
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotObjectReference {
    /// API version of the referent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    /// Kind of the referent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Name of the referent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Namespace of the referent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// UID of the referent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

/// Status of a VolumeSnapshotContent
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VolumeSnapshotContentStatus {
    /// CSI snapshot handle on the storage system
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_handle: Option<String>,

    /// Creation time in nanoseconds since the epoch, as reported by the driver
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<i64>,

    /// Whether the snapshot can be used to provision a volume
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ready_to_use: Option<bool>,

    /// Restore size in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restore_size: Option<i64>,

    /// Last error encountered while creating the snapshot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<VolumeSnapshotError>,
}

/// Specification for a VolumeSnapshotContent
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "snapshot.storage.k8s.io",
    version = "v1",
    kind = "VolumeSnapshotContent",
    plural = "volumesnapshotcontents",
    shortname = "vsc",
    status = "VolumeSnapshotContentStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct VolumeSnapshotContentSpec {
    /// CSI driver that created the physical snapshot
    pub driver: String,

    /// What happens to the physical snapshot when this object is deleted
    pub deletion_policy: DeletionPolicy,

    /// Physical source of the snapshot
    pub source: VolumeSnapshotContentSource,

    /// The VolumeSnapshot this content is bound to
    pub volume_snapshot_ref: SnapshotObjectReference,

    /// Class the snapshot was created from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_snapshot_class_name: Option<String>,
}

impl VolumeSnapshotContent {
    /// CSI snapshot handle, once the driver has cut the snapshot
    pub fn snapshot_handle(&self) -> Option<&str> {
        self.status
            .as_ref()
            .and_then(|s| s.snapshot_handle.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bound_content() {
        let content: VolumeSnapshotContent = serde_json::from_value(serde_json::json!({
            "apiVersion": "snapshot.storage.k8s.io/v1",
            "kind": "VolumeSnapshotContent",
            "metadata": { "name": "snapcontent-123" },
            "spec": {
                "driver": "ebs.csi.aws.com",
                "deletionPolicy": "Delete",
                "source": { "volumeHandle": "vol-0abc" },
                "volumeSnapshotRef": {
                    "kind": "VolumeSnapshot",
                    "name": "snap",
                    "namespace": "ns1"
                },
                "volumeSnapshotClassName": "csi-aws-vsc"
            },
            "status": {
                "snapshotHandle": "snap-0def",
                "readyToUse": true,
                "restoreSize": 10737418240i64
            }
        }))
        .expect("parse VolumeSnapshotContent");

        assert_eq!(content.spec.driver, "ebs.csi.aws.com");
        assert_eq!(content.spec.source.volume_handle.as_deref(), Some("vol-0abc"));
        assert_eq!(
            content.spec.volume_snapshot_ref.namespace.as_deref(),
            Some("ns1")
        );
        assert_eq!(content.snapshot_handle(), Some("snap-0def"));
        assert_eq!(content.status.unwrap().restore_size, Some(10_737_418_240));
    }

    #[test]
    fn content_without_status_has_no_handle() {
        let content = VolumeSnapshotContent::new(
            "snapcontent-1",
            VolumeSnapshotContentSpec {
                driver: "pd.csi.storage.gke.io".to_string(),
                ..Default::default()
            },
        );
        assert_eq!(content.snapshot_handle(), None);
    }
}
