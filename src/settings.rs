// extraction-utils/src/settings.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info};

/// Project-level pipeline configuration.
///
/// Only `data_dir` is interpreted by this crate (path resolution); every
/// other named option is carried through untouched so downstream pipeline
/// stages can read their own keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainSettings {
    /// Root directory holding one subdirectory per project.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Remaining named options, passed through verbatim.
    #[serde(flatten)]
    pub options: BTreeMap<String, serde_yaml::Value>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

impl Default for MainSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            options: BTreeMap::new(),
        }
    }
}

impl MainSettings {
    pub fn trace_loaded(&self) {
        info!(
            data_dir = %self.data_dir.display(),
            options_count = self.options.len(),
            "Loaded MainSettings"
        );
        debug!(?self, "MainSettings loaded (full debug)");
    }
}

/// Credentials and location of a single S3-compatible bucket.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct S3BucketSettings {
    pub s3_endpoint: String,
    pub s3_access_key: String,
    pub s3_secret_key: String,
    pub s3_bucket_name: String,
}

/// Remote-storage configuration: a shared key prefix plus the two buckets
/// the pipeline uses — interim for staging inputs, main for final outputs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct S3Settings {
    pub prefix: String,
    pub main_bucket: S3BucketSettings,
    pub interim_bucket: S3BucketSettings,
}

impl S3Settings {
    pub fn trace_loaded(&self) {
        info!(
            prefix = %self.prefix,
            main_endpoint = %self.main_bucket.s3_endpoint,
            interim_endpoint = %self.interim_bucket.s3_endpoint,
            "Loaded S3Settings"
        );
    }
}

/// A settings document whose kind was not known ahead of parse time.
///
/// The kind is decided once, at the parse boundary: a YAML mapping carrying
/// a `main_bucket` key is S3 configuration, anything else is main settings.
#[derive(Debug, Clone, PartialEq)]
pub enum Settings {
    Main(MainSettings),
    S3(S3Settings),
}

impl Settings {
    /// Classify and convert an already-parsed YAML document.
    pub fn from_value(value: serde_yaml::Value) -> Result<Self, serde_yaml::Error> {
        if value.get("main_bucket").is_some() {
            serde_yaml::from_value(value).map(Settings::S3)
        } else {
            serde_yaml::from_value(value).map(Settings::Main)
        }
    }
}
