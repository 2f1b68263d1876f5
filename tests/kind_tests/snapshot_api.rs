//! VolumeSnapshotClass lookup against a live API server
//!
//! Requires the external-snapshotter CRDs to be installed in the cluster.

use velero_csi_resolver::{Error, Resolver};

use super::helpers::test_client;

#[tokio::test]
#[ignore = "requires a Kubernetes cluster with snapshot CRDs"]
async fn unknown_driver_has_no_snapshot_class() {
    let resolver = Resolver::new(test_client().await);

    let err = resolver
        .snapshot_class("does-not-exist.csi.example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }), "got {err:?}");
}
