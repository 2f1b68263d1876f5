//! VolumeSnapshotClass and VolumeSnapshotContent resolution
//!
//! The snapshot controller binds a VolumeSnapshot to its content
//! asynchronously, so content resolution polls the snapshot until the binding
//! shows up. The wait is driven through [`Sleeper`] and bounded by
//! [`PollConfig`] and a cancellation token.

use std::time::Duration;

use async_trait::async_trait;
use kube::ResourceExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[cfg(test)]
use mockall::automock;

use crate::capabilities::{SnapshotClassLister, SnapshotGetter};
use crate::crd::{VolumeSnapshot, VolumeSnapshotClass, VolumeSnapshotContent};
use crate::{Error, Result};

/// Default interval between VolumeSnapshot polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// How long to wait between polls
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Suspend for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the tokio timer
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Polling bounds for VolumeSnapshotContent resolution
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollConfig {
    /// Time between VolumeSnapshot fetches
    pub interval: Duration,
    /// Maximum accumulated wait before giving up (None = wait forever)
    ///
    /// The total time slept never exceeds this; the final wait is shortened
    /// to whatever is left.
    pub timeout: Option<Duration>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: None,
        }
    }
}

impl PollConfig {
    /// Create a config that gives up after `timeout` of accumulated waiting
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..Default::default()
        }
    }
}

/// Find the VolumeSnapshotClass whose driver matches `provisioner`
///
/// When several classes share the driver, the first in list order wins.
pub async fn get_snapshot_class_for_provisioner(
    provisioner: &str,
    classes: &dyn SnapshotClassLister,
) -> Result<VolumeSnapshotClass> {
    let all = classes
        .list_snapshot_classes()
        .await
        .map_err(|e| Error::lookup("VolumeSnapshotClass list", e))?;

    let class = all
        .into_iter()
        .find(|c| c.driver == provisioner)
        .ok_or_else(|| {
            Error::not_found("VolumeSnapshotClass", format!("provisioner {}", provisioner))
        })?;

    debug!(
        provisioner = %provisioner,
        class = %class.name_any(),
        "Resolved VolumeSnapshotClass"
    );

    Ok(class)
}

/// Wait for `snapshot` to be bound and return its VolumeSnapshotContent
///
/// The snapshot is re-fetched every `poll.interval` until its status names a
/// content object. Fetch failures are terminal and are not retried. With no
/// timeout configured the wait only ends on binding or cancellation.
pub async fn get_snapshot_content_for_snapshot(
    snapshot: &VolumeSnapshot,
    snapshots: &dyn SnapshotGetter,
    poll: &PollConfig,
    sleeper: &dyn Sleeper,
    cancel: &CancellationToken,
) -> Result<VolumeSnapshotContent> {
    let namespace = snapshot.namespace().unwrap_or_default();
    let name = snapshot.name_any();
    let cancelled = || Error::Cancelled {
        namespace: namespace.clone(),
        name: name.clone(),
    };

    let mut waited = Duration::ZERO;

    let content_name = loop {
        if cancel.is_cancelled() {
            return Err(cancelled());
        }

        let current = snapshots
            .get_volume_snapshot(&namespace, &name)
            .await
            .map_err(|e| Error::lookup(format!("VolumeSnapshot {}/{}", namespace, name), e))?;

        if let Some(content_name) = current.bound_content_name() {
            break content_name.to_string();
        }

        let delay = match poll.timeout {
            Some(timeout) if waited >= timeout => {
                return Err(Error::Timeout {
                    namespace: namespace.clone(),
                    name: name.clone(),
                    waited,
                });
            }
            // The last wait is cut short so the total never exceeds the timeout
            Some(timeout) => poll.interval.min(timeout - waited),
            None => poll.interval,
        };

        info!(
            namespace = %namespace,
            snapshot = %name,
            retry_in_ms = delay.as_millis() as u64,
            "Waiting for CSI driver to reconcile VolumeSnapshot"
        );

        tokio::select! {
            _ = cancel.cancelled() => return Err(cancelled()),
            _ = sleeper.sleep(delay) => {}
        }
        waited += delay;
    };

    let content = snapshots
        .get_volume_snapshot_content(&content_name)
        .await
        .map_err(|e| {
            Error::lookup(
                format!(
                    "VolumeSnapshotContent {} for VolumeSnapshot {}/{}",
                    content_name, namespace, name
                ),
                e,
            )
        })?;

    debug!(
        namespace = %namespace,
        snapshot = %name,
        content = %content_name,
        "Resolved VolumeSnapshotContent"
    );

    Ok(content)
}
