//! Pod usage and file-system backup coverage against a live API server

use velero_csi_resolver::Resolver;

use super::helpers::{create_namespace, create_pod_with_claim, delete_namespace, test_client};

#[tokio::test]
#[ignore = "requires a Kubernetes cluster"]
async fn annotated_pod_marks_claim_as_fs_backed_up() {
    let client = test_client().await;
    let ns = create_namespace(&client, "csi-resolver-fs").await;

    create_pod_with_claim(&client, &ns, "web-0", "data", "pvc-a", None).await;
    create_pod_with_claim(&client, &ns, "web-1", "data", "pvc-a", Some("data")).await;
    create_pod_with_claim(&client, &ns, "cache-0", "cache", "pvc-b", Some("logs")).await;

    let resolver = Resolver::new(client.clone());

    let pods = resolver.pods_using_claim(&ns, "pvc-a").await.unwrap();
    assert_eq!(pods.len(), 2);

    assert!(resolver.is_backed_up_by_fs_backup(&ns, "pvc-a").await.unwrap());
    assert!(!resolver.is_backed_up_by_fs_backup(&ns, "pvc-b").await.unwrap());
    assert!(!resolver.is_backed_up_by_fs_backup(&ns, "pvc-none").await.unwrap());

    delete_namespace(&client, &ns).await;
}
