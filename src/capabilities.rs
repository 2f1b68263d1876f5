//! Read-only capability traits over the Kubernetes API
//!
//! Each resolver operation takes the narrowest slice of API access it needs
//! (a PV getter, a pod lister, ...). This allows mocking the API in tests
//! while using [`KubeCapabilities`] against a real cluster.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{PersistentVolume, Pod};
use kube::api::{Api, ListParams};
use kube::Client;

#[cfg(test)]
use mockall::automock;

use crate::crd::{VolumeSnapshot, VolumeSnapshotClass, VolumeSnapshotContent};

/// Get PersistentVolumes by name
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PersistentVolumeGetter: Send + Sync {
    /// Get a PersistentVolume by name
    async fn get_persistent_volume(&self, name: &str) -> Result<PersistentVolume, kube::Error>;
}

/// List Pods in a namespace
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PodLister: Send + Sync {
    /// List every Pod in the namespace, in server order
    async fn list_pods(&self, namespace: &str) -> Result<Vec<Pod>, kube::Error>;
}

/// List VolumeSnapshotClasses
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SnapshotClassLister: Send + Sync {
    /// List every VolumeSnapshotClass, in server order
    async fn list_snapshot_classes(&self) -> Result<Vec<VolumeSnapshotClass>, kube::Error>;
}

/// Get VolumeSnapshots and VolumeSnapshotContents by name
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SnapshotGetter: Send + Sync {
    /// Get a VolumeSnapshot by namespace and name
    async fn get_volume_snapshot(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<VolumeSnapshot, kube::Error>;

    /// Get a VolumeSnapshotContent by name
    async fn get_volume_snapshot_content(
        &self,
        name: &str,
    ) -> Result<VolumeSnapshotContent, kube::Error>;
}

/// Real Kubernetes implementation of every capability
#[derive(Clone)]
pub struct KubeCapabilities {
    client: Client,
}

impl KubeCapabilities {
    /// Create a new KubeCapabilities wrapping the given kube Client
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PersistentVolumeGetter for KubeCapabilities {
    async fn get_persistent_volume(&self, name: &str) -> Result<PersistentVolume, kube::Error> {
        let api: Api<PersistentVolume> = Api::all(self.client.clone());
        api.get(name).await
    }
}

#[async_trait]
impl PodLister for KubeCapabilities {
    async fn list_pods(&self, namespace: &str) -> Result<Vec<Pod>, kube::Error> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let pods = api.list(&ListParams::default()).await?;
        Ok(pods.items)
    }
}

#[async_trait]
impl SnapshotClassLister for KubeCapabilities {
    async fn list_snapshot_classes(&self) -> Result<Vec<VolumeSnapshotClass>, kube::Error> {
        let api: Api<VolumeSnapshotClass> = Api::all(self.client.clone());
        let classes = api.list(&ListParams::default()).await?;
        Ok(classes.items)
    }
}

#[async_trait]
impl SnapshotGetter for KubeCapabilities {
    async fn get_volume_snapshot(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<VolumeSnapshot, kube::Error> {
        let api: Api<VolumeSnapshot> = Api::namespaced(self.client.clone(), namespace);
        api.get(name).await
    }

    async fn get_volume_snapshot_content(
        &self,
        name: &str,
    ) -> Result<VolumeSnapshotContent, kube::Error> {
        let api: Api<VolumeSnapshotContent> = Api::all(self.client.clone());
        api.get(name).await
    }
}
