//! VolumeSnapshot resource
//!
//! A namespaced request for a point-in-time copy of a PVC. The snapshot
//! controller reconciles it asynchronously and records the bound
//! VolumeSnapshotContent name in the status.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::types::VolumeSnapshotError;

/// Where the snapshot is taken from
///
/// Exactly one of the fields is set.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VolumeSnapshotSource {
    /// PVC to snapshot (dynamic provisioning)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persistent_volume_claim_name: Option<String>,

    /// Pre-existing VolumeSnapshotContent (static provisioning)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_snapshot_content_name: Option<String>,
}

/// Status of a VolumeSnapshot
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VolumeSnapshotStatus {
    /// Name of the VolumeSnapshotContent this snapshot is bound to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bound_volume_snapshot_content_name: Option<String>,

    /// RFC 3339 timestamp of when the storage system took the snapshot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<String>,

    /// Whether the snapshot can be used to provision a volume
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ready_to_use: Option<bool>,

    /// Minimum size of a volume restored from this snapshot (quantity)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restore_size: Option<String>,

    /// Last error encountered while creating the snapshot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<VolumeSnapshotError>,
}

/// Specification for a VolumeSnapshot
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "snapshot.storage.k8s.io",
    version = "v1",
    kind = "VolumeSnapshot",
    plural = "volumesnapshots",
    shortname = "vs",
    namespaced,
    status = "VolumeSnapshotStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct VolumeSnapshotSpec {
    /// Source of the snapshot
    pub source: VolumeSnapshotSource,

    /// VolumeSnapshotClass to use; the cluster default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_snapshot_class_name: Option<String>,
}

impl VolumeSnapshot {
    /// Name of the bound VolumeSnapshotContent, once the controller has set it
    pub fn bound_content_name(&self) -> Option<&str> {
        self.status
            .as_ref()
            .and_then(|s| s.bound_volume_snapshot_content_name.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::ResourceExt;

    fn parse(value: serde_json::Value) -> VolumeSnapshot {
        serde_json::from_value(value).expect("parse VolumeSnapshot")
    }

    #[test]
    fn pending_snapshot_has_no_content_name() {
        let vs = parse(serde_json::json!({
            "apiVersion": "snapshot.storage.k8s.io/v1",
            "kind": "VolumeSnapshot",
            "metadata": { "name": "velero-pvc-a-xyz", "namespace": "ns1" },
            "spec": {
                "source": { "persistentVolumeClaimName": "pvc-a" },
                "volumeSnapshotClassName": "csi-aws-vsc"
            }
        }));

        assert_eq!(vs.name_any(), "velero-pvc-a-xyz");
        assert_eq!(vs.namespace().as_deref(), Some("ns1"));
        assert_eq!(
            vs.spec.source.persistent_volume_claim_name.as_deref(),
            Some("pvc-a")
        );
        assert!(vs.status.is_none());
        assert_eq!(vs.bound_content_name(), None);
    }

    #[test]
    fn status_without_binding_is_still_pending() {
        let vs = parse(serde_json::json!({
            "apiVersion": "snapshot.storage.k8s.io/v1",
            "kind": "VolumeSnapshot",
            "metadata": { "name": "snap", "namespace": "ns1" },
            "spec": { "source": { "persistentVolumeClaimName": "pvc-a" } },
            "status": { "readyToUse": false }
        }));

        assert!(vs.status.is_some());
        assert_eq!(vs.bound_content_name(), None);
    }

    #[test]
    fn bound_snapshot_exposes_content_name() {
        let vs = parse(serde_json::json!({
            "apiVersion": "snapshot.storage.k8s.io/v1",
            "kind": "VolumeSnapshot",
            "metadata": { "name": "snap", "namespace": "ns1" },
            "spec": { "source": { "persistentVolumeClaimName": "pvc-a" } },
            "status": {
                "boundVolumeSnapshotContentName": "snapcontent-123",
                "readyToUse": true,
                "restoreSize": "10Gi"
            }
        }));

        assert_eq!(vs.bound_content_name(), Some("snapcontent-123"));
        let status = vs.status.unwrap();
        assert_eq!(status.ready_to_use, Some(true));
        assert_eq!(status.restore_size.as_deref(), Some("10Gi"));
    }
}
