//! Shared fixtures for live-cluster tests

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{
    Container, Namespace, PersistentVolumeClaimVolumeSource, Pod, PodSpec, Volume, VolumeMount,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{Api, DeleteParams, PostParams};
use kube::Client;

use velero_csi_resolver::pvc::FS_BACKUP_VOLUMES_ANNOTATION;

/// Connect with the ambient kubeconfig
pub async fn test_client() -> Client {
    Client::try_default()
        .await
        .expect("kubeconfig for a test cluster")
}

/// Create a throwaway namespace and return its name
pub async fn create_namespace(client: &Client, prefix: &str) -> String {
    let name = format!(
        "{}-{}",
        prefix,
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("clock after epoch")
            .as_millis()
    );
    let api: Api<Namespace> = Api::all(client.clone());
    api.create(
        &PostParams::default(),
        &Namespace {
            metadata: ObjectMeta {
                name: Some(name.clone()),
                ..Default::default()
            },
            ..Default::default()
        },
    )
    .await
    .expect("create namespace");
    name
}

/// Delete a namespace created by [`create_namespace`]
pub async fn delete_namespace(client: &Client, name: &str) {
    let api: Api<Namespace> = Api::all(client.clone());
    let _ = api.delete(name, &DeleteParams::default()).await;
}

/// Create a pod mounting `claim` as volume `volume`
///
/// The claim does not need to exist; the pod stays Pending but is listed.
pub async fn create_pod_with_claim(
    client: &Client,
    namespace: &str,
    name: &str,
    volume: &str,
    claim: &str,
    fs_backup: Option<&str>,
) {
    let annotations = fs_backup.map(|v| {
        BTreeMap::from([(FS_BACKUP_VOLUMES_ANNOTATION.to_string(), v.to_string())])
    });
    let pod = Pod {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            annotations,
            ..Default::default()
        },
        spec: Some(PodSpec {
            containers: vec![Container {
                name: "app".to_string(),
                image: Some("registry.k8s.io/pause:3.10".to_string()),
                volume_mounts: Some(vec![VolumeMount {
                    name: volume.to_string(),
                    mount_path: "/data".to_string(),
                    ..Default::default()
                }]),
                ..Default::default()
            }],
            volumes: Some(vec![Volume {
                name: volume.to_string(),
                persistent_volume_claim: Some(PersistentVolumeClaimVolumeSource {
                    claim_name: claim.to_string(),
                    read_only: None,
                }),
                ..Default::default()
            }]),
            ..Default::default()
        }),
        status: None,
    };

    let api: Api<Pod> = Api::namespaced(client.clone(), namespace);
    api.create(&PostParams::default(), &pod)
        .await
        .expect("create pod");
}
