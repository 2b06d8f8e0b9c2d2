//! `aws-sdk-s3` backed implementation of the [`ObjectStore`] seam.

use super::{ObjectStore, ObjectStoreFactory, StoreError};
use crate::settings::S3BucketSettings;
use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// One S3-compatible bucket, addressed path-style via an explicit endpoint.
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    pub fn new(
        endpoint_url: &str,
        access_key_id: &str,
        secret_access_key: &str,
        bucket_name: &str,
    ) -> Self {
        let credentials = Credentials::new(
            access_key_id,
            secret_access_key,
            None,
            None,
            "extraction-utils-settings",
        );
        // Region is required by the SDK but irrelevant for path-style
        // endpoints; any value works against MinIO and friends.
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .endpoint_url(endpoint_url)
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        info!(endpoint = endpoint_url, bucket = bucket_name, "Constructed S3 client");

        Self {
            client: Client::from_conf(config),
            bucket: bucket_name.to_owned(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn download_files_in_prefix_to_dir(
        &self,
        prefix: &str,
        local_dir: &Path,
    ) -> Result<usize, StoreError> {
        debug!(bucket = %self.bucket, prefix, dir = %local_dir.display(), "Downloading prefix");

        let mut downloaded = 0usize;
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .into_paginator()
            .send();

        while let Some(page) = pages.next().await {
            let page = page?;
            for object in page.contents() {
                let Some(key) = object.key() else { continue };
                // Flat staging: the key segment after the last '/' becomes
                // the local file name; pseudo-directory markers are skipped.
                let Some(file_name) = key.rsplit('/').next().filter(|n| !n.is_empty()) else {
                    warn!(key, "Skipping prefix marker object");
                    continue;
                };

                let response = self.client
                    .get_object()
                    .bucket(&self.bucket)
                    .key(key)
                    .send()
                    .await?;
                let bytes = response.body.collect().await?.into_bytes();
                fs::write(local_dir.join(file_name), &bytes)?;
                downloaded += 1;
            }
        }

        info!(bucket = %self.bucket, prefix, downloaded, "Prefix download complete");
        Ok(downloaded)
    }

    async fn upload_file_to_s3(
        &self,
        local_path: &Path,
        remote_key: &str,
    ) -> Result<(), StoreError> {
        debug!(bucket = %self.bucket, key = remote_key, file = %local_path.display(), "Uploading file");

        let body = ByteStream::from_path(local_path).await?;
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(remote_key)
            .body(body)
            .send()
            .await?;

        info!(bucket = %self.bucket, key = remote_key, "Upload complete");
        Ok(())
    }
}

/// Production [`ObjectStoreFactory`]: builds an [`S3ObjectStore`] straight
/// from the credentials in the settings file.
pub struct S3StoreFactory;

impl ObjectStoreFactory for S3StoreFactory {
    fn connect(&self, bucket: &S3BucketSettings) -> Result<Box<dyn ObjectStore>, StoreError> {
        Ok(Box::new(S3ObjectStore::new(
            &bucket.s3_endpoint,
            &bucket.s3_access_key,
            &bucket.s3_secret_key,
            &bucket.s3_bucket_name,
        )))
    }
}
