//! PersistentVolumeClaim resolution
//!
//! Resolves the PersistentVolume behind a claim, the pods mounting it, and
//! whether Velero's file-system backup already covers it. A claim covered by
//! file-system backup is skipped by the CSI snapshot path.

use std::collections::HashSet;

use k8s_openapi::api::core::v1::{PersistentVolume, PersistentVolumeClaim, Pod};
use kube::ResourceExt;
use tracing::debug;

use crate::capabilities::{PersistentVolumeGetter, PodLister};
use crate::{Error, Result};

/// Pod annotation listing the volumes handled by Velero's file-system backup
pub const FS_BACKUP_VOLUMES_ANNOTATION: &str = "backup.velero.io/backup-volumes";

/// Claim phase in which `spec.volumeName` is authoritative
pub const CLAIM_BOUND: &str = "Bound";

/// Resolve the PersistentVolume bound to a claim
///
/// The claim must name a volume and be in the `Bound` phase. The phase is
/// authoritative: a claim that names a volume but is not `Bound` is rejected.
pub async fn get_pv_for_pvc(
    pvc: &PersistentVolumeClaim,
    volumes: &dyn PersistentVolumeGetter,
) -> Result<PersistentVolume> {
    let namespace = pvc.namespace().unwrap_or_default();
    let name = pvc.name_any();

    let pv_name = pvc
        .spec
        .as_ref()
        .and_then(|s| s.volume_name.as_deref())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::not_bound(&namespace, &name, "no volume backing this claim"))?;

    let phase = pvc.status.as_ref().and_then(|s| s.phase.as_deref());
    if phase != Some(CLAIM_BOUND) {
        return Err(Error::not_bound(
            &namespace,
            &name,
            format!("claim is in phase {}", phase.unwrap_or("<none>")),
        ));
    }

    debug!(namespace = %namespace, pvc = %name, pv = %pv_name, "Resolving PV for PVC");

    volumes.get_persistent_volume(pv_name).await.map_err(|e| {
        Error::lookup(
            format!("PV {} for PVC {}/{}", pv_name, namespace, name),
            e,
        )
    })
}

/// List the pods in `namespace` that mount the claim `pvc_name`
///
/// Filtering happens client side; server order is preserved. No match is an
/// empty list, not an error.
pub async fn get_pods_using_pvc(
    namespace: &str,
    pvc_name: &str,
    pods: &dyn PodLister,
) -> Result<Vec<Pod>> {
    let all = pods.list_pods(namespace).await?;

    let using: Vec<Pod> = all
        .into_iter()
        .filter(|p| claim_volume_name(p, pvc_name).is_some())
        .collect();

    debug!(
        namespace = %namespace,
        pvc = %pvc_name,
        pods = using.len(),
        "Found pods using PVC"
    );

    Ok(using)
}

/// Name of the pod volume that mounts the claim `pvc_name`
pub fn get_pod_volume_name_for_pvc(pod: &Pod, pvc_name: &str) -> Result<String> {
    claim_volume_name(pod, pvc_name)
        .map(str::to_string)
        .ok_or_else(|| {
            let namespace = pod.namespace().unwrap_or_default();
            Error::not_found(
                "pod volume",
                format!(
                    "pod {}/{} does not use PVC {}/{}",
                    namespace,
                    pod.name_any(),
                    namespace,
                    pvc_name
                ),
            )
        })
}

/// Volume names listed in the pod's file-system backup annotation
///
/// A missing or empty annotation yields an empty list.
pub fn get_pod_volumes_using_fs_backup(pod: &Pod) -> Vec<String> {
    match pod.annotations().get(FS_BACKUP_VOLUMES_ANNOTATION) {
        Some(value) if !value.is_empty() => value.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    }
}

/// Whether any pod mounting the claim has opted that volume into file-system backup
pub async fn is_pvc_backed_up_by_fs_backup(
    namespace: &str,
    pvc_name: &str,
    pods: &dyn PodLister,
) -> Result<bool> {
    for pod in get_pods_using_pvc(namespace, pvc_name, pods).await? {
        let fs_volumes: HashSet<String> = get_pod_volumes_using_fs_backup(&pod)
            .into_iter()
            .collect();
        if fs_volumes.is_empty() {
            continue;
        }

        let volume_name = get_pod_volume_name_for_pvc(&pod, pvc_name)?;
        if fs_volumes.contains(&volume_name) {
            debug!(
                namespace = %namespace,
                pvc = %pvc_name,
                pod = %pod.name_any(),
                volume = %volume_name,
                "PVC is backed up by file-system backup"
            );
            return Ok(true);
        }
    }

    Ok(false)
}

fn claim_volume_name<'a>(pod: &'a Pod, pvc_name: &str) -> Option<&'a str> {
    pod.spec
        .as_ref()?
        .volumes
        .as_ref()?
        .iter()
        .find(|v| {
            v.persistent_volume_claim
                .as_ref()
                .is_some_and(|c| c.claim_name == pvc_name)
        })
        .map(|v| v.name.as_str())
}
