//! Resolver facade
//!
//! Bundles the capability implementations and polling configuration so a
//! backup item action can call every lookup through one value.

use std::sync::Arc;

use k8s_openapi::api::core::v1::{PersistentVolume, PersistentVolumeClaim, Pod};
use kube::Client;
use tokio_util::sync::CancellationToken;

use crate::capabilities::{
    KubeCapabilities, PersistentVolumeGetter, PodLister, SnapshotClassLister, SnapshotGetter,
};
use crate::crd::{VolumeSnapshot, VolumeSnapshotClass, VolumeSnapshotContent};
use crate::snapshot::{PollConfig, Sleeper, TokioSleeper};
use crate::{pvc, snapshot, Result};

/// Resolves PVC, pod and snapshot relationships against the API server
#[derive(Clone)]
pub struct Resolver {
    volumes: Arc<dyn PersistentVolumeGetter>,
    pods: Arc<dyn PodLister>,
    snapshot_classes: Arc<dyn SnapshotClassLister>,
    snapshots: Arc<dyn SnapshotGetter>,
    poll: PollConfig,
    sleeper: Arc<dyn Sleeper>,
    cancel: CancellationToken,
}

impl Resolver {
    /// Create a resolver backed by a kube Client with default polling
    pub fn new(client: Client) -> Self {
        let caps = Arc::new(KubeCapabilities::new(client));
        Self::from_parts(caps.clone(), caps.clone(), caps.clone(), caps)
    }

    /// Create a resolver from individual capability implementations
    pub fn from_parts(
        volumes: Arc<dyn PersistentVolumeGetter>,
        pods: Arc<dyn PodLister>,
        snapshot_classes: Arc<dyn SnapshotClassLister>,
        snapshots: Arc<dyn SnapshotGetter>,
    ) -> Self {
        Self {
            volumes,
            pods,
            snapshot_classes,
            snapshots,
            poll: PollConfig::default(),
            sleeper: Arc::new(TokioSleeper),
            cancel: CancellationToken::new(),
        }
    }

    /// Replace the polling bounds used by [`Resolver::snapshot_content`]
    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Replace the sleeper used between polls
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Use `cancel` to abort in-flight snapshot waits
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Polling bounds in effect
    pub fn poll_config(&self) -> &PollConfig {
        &self.poll
    }

    /// PersistentVolume bound to the claim
    pub async fn persistent_volume(&self, claim: &PersistentVolumeClaim) -> Result<PersistentVolume> {
        pvc::get_pv_for_pvc(claim, self.volumes.as_ref()).await
    }

    /// Pods in `namespace` mounting the claim
    pub async fn pods_using_claim(&self, namespace: &str, claim: &str) -> Result<Vec<Pod>> {
        pvc::get_pods_using_pvc(namespace, claim, self.pods.as_ref()).await
    }

    /// Whether the claim is covered by Velero file-system backup
    pub async fn is_backed_up_by_fs_backup(&self, namespace: &str, claim: &str) -> Result<bool> {
        pvc::is_pvc_backed_up_by_fs_backup(namespace, claim, self.pods.as_ref()).await
    }

    /// VolumeSnapshotClass for the provisioner
    pub async fn snapshot_class(&self, provisioner: &str) -> Result<VolumeSnapshotClass> {
        snapshot::get_snapshot_class_for_provisioner(provisioner, self.snapshot_classes.as_ref())
            .await
    }

    /// VolumeSnapshotContent bound to the snapshot, waiting for the binding
    pub async fn snapshot_content(
        &self,
        volume_snapshot: &VolumeSnapshot,
    ) -> Result<VolumeSnapshotContent> {
        snapshot::get_snapshot_content_for_snapshot(
            volume_snapshot,
            self.snapshots.as_ref(),
            &self.poll,
            self.sleeper.as_ref(),
            &self.cancel,
        )
        .await
    }
}
