//! velero-csi-resolver - PVC, pod and CSI snapshot lookups for Velero's CSI plugin
//!
//! Before Velero takes a CSI snapshot of a PersistentVolumeClaim it needs to
//! know which PersistentVolume backs the claim, whether a pod has already
//! opted the volume into file-system backup, which VolumeSnapshotClass serves
//! the volume's driver, and which VolumeSnapshotContent the snapshot
//! controller bound the resulting VolumeSnapshot to. This crate answers those
//! questions. It only reads from the API server.
//!
//! # Modules
//!
//! - [`pvc`] - PV, pod usage and file-system backup coverage for a claim
//! - [`snapshot`] - VolumeSnapshotClass lookup and VolumeSnapshotContent polling
//! - [`resolver`] - Facade bundling capabilities and polling configuration
//! - [`capabilities`] - Narrow read-only API traits and their kube-rs implementation
//! - [`crd`] - snapshot.storage.k8s.io resource types
//! - [`kube_utils`] - Client construction with explicit credential plugins
//! - [`telemetry`] - Logging initialization
//! - [`error`] - Error types

#![deny(missing_docs)]

pub mod capabilities;
pub mod crd;
pub mod error;
pub mod kube_utils;
pub mod pvc;
pub mod resolver;
pub mod snapshot;
pub mod telemetry;

pub use error::Error;
pub use resolver::Resolver;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;
