//! Live-cluster tests
//!
//! - `fs_backup`: pod usage and file-system backup coverage of claims
//! - `snapshot_api`: VolumeSnapshotClass lookup (needs the external-snapshotter CRDs)

mod fs_backup;
mod helpers;
mod snapshot_api;
