//! CSI snapshot resource types
//!
//! Typed structs for the external-snapshotter resources in the
//! `snapshot.storage.k8s.io/v1` API group. The resolver only reads these;
//! none of them are created or patched by this crate.

mod types;
mod volume_snapshot;
mod volume_snapshot_class;
mod volume_snapshot_content;

pub use types::{DeletionPolicy, VolumeSnapshotError};
pub use volume_snapshot::{
    VolumeSnapshot, VolumeSnapshotSource, VolumeSnapshotSpec, VolumeSnapshotStatus,
};
pub use volume_snapshot_class::{VolumeSnapshotClass, DEFAULT_SNAPSHOT_CLASS_ANNOTATION};
pub use volume_snapshot_content::{
    SnapshotObjectReference, VolumeSnapshotContent, VolumeSnapshotContentSource,
    VolumeSnapshotContentSpec, VolumeSnapshotContentStatus,
};

/// API group of the CSI snapshot resources
pub const SNAPSHOT_GROUP: &str = "snapshot.storage.k8s.io";

/// API version of the CSI snapshot resources
pub const SNAPSHOT_VERSION: &str = "v1";
