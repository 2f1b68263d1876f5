//! VolumeSnapshotClass resource
//!
//! Cluster-scoped configuration that selects the CSI driver servicing a
//! VolumeSnapshot. Unlike most resources it has no spec/status split, so the
//! kube `Resource` plumbing is provided through the k8s-openapi traits instead
//! of the `CustomResource` derive.

use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::{Deserialize, Serialize};

use super::types::DeletionPolicy;

/// Annotation marking the cluster default VolumeSnapshotClass
pub const DEFAULT_SNAPSHOT_CLASS_ANNOTATION: &str =
    "snapshot.storage.kubernetes.io/is-default-class";

/// VolumeSnapshotClass resource
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VolumeSnapshotClass {
    /// Standard object metadata
    #[serde(default)]
    pub metadata: ObjectMeta,

    /// Name of the CSI driver that handles snapshots of this class
    pub driver: String,

    /// Deletion policy applied to contents created from this class
    pub deletion_policy: DeletionPolicy,

    /// Driver-specific parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<BTreeMap<String, String>>,
}

impl k8s_openapi::Resource for VolumeSnapshotClass {
    const API_VERSION: &'static str = "snapshot.storage.k8s.io/v1";
    const GROUP: &'static str = super::SNAPSHOT_GROUP;
    const KIND: &'static str = "VolumeSnapshotClass";
    const VERSION: &'static str = super::SNAPSHOT_VERSION;
    const URL_PATH_SEGMENT: &'static str = "volumesnapshotclasses";
    type Scope = k8s_openapi::ClusterResourceScope;
}

impl k8s_openapi::Metadata for VolumeSnapshotClass {
    type Ty = ObjectMeta;

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

impl VolumeSnapshotClass {
    /// Whether the class carries the default-class annotation
    pub fn is_default(&self) -> bool {
        self.metadata
            .annotations
            .as_ref()
            .and_then(|a| a.get(DEFAULT_SNAPSHOT_CLASS_ANNOTATION))
            .is_some_and(|v| v == "true")
    }
}
