//! Object-storage seam for the merge pipeline.
//!
//! Two traits: [`ObjectStore`] for the per-bucket transfer operations and
//! [`ObjectStoreFactory`] for constructing a handle from bucket credentials.
//! The merge operation only talks to these traits, so any S3-compatible
//! client (or a test mock) can be plugged in. Real implementation lives in
//! [`s3`].
//!
//! Both traits are annotated for `mockall` so consumers can generate
//! deterministic mocks in unit and integration tests.

pub mod s3;

use crate::settings::S3BucketSettings;
use async_trait::async_trait;
use std::path::Path;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

/// Error type for storage operations (simple boxed error for now).
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// A handle to one remote bucket.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Download every object under `prefix` into `local_dir` (flat; the key
    /// segment after the last `/` becomes the local file name). Returns the
    /// number of objects downloaded.
    async fn download_files_in_prefix_to_dir(
        &self,
        prefix: &str,
        local_dir: &Path,
    ) -> Result<usize, StoreError>;

    /// Upload a single local file to `remote_key` in this bucket.
    async fn upload_file_to_s3(
        &self,
        local_path: &Path,
        remote_key: &str,
    ) -> Result<(), StoreError>;
}

/// Constructs [`ObjectStore`] handles from bucket credentials.
///
/// The merge operation builds its two handles (main and interim bucket)
/// through this seam, which keeps construction observable in tests.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait ObjectStoreFactory: Send + Sync {
    fn connect(&self, bucket: &S3BucketSettings) -> Result<Box<dyn ObjectStore>, StoreError>;
}
