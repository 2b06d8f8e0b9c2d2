//! Merges per-document relevance CSV fragments into one `text_3434.csv`.
//!
//! This is the one piece of actual pipeline logic in this crate:
//!   - Optionally stages input fragments from the interim bucket into the
//!     local relevance directory
//!   - Concatenates all fragments under a single shared header (the header
//!     of the first fragment in filename order; every later fragment's
//!     header line is dropped)
//!   - Optionally uploads the merged file to the main bucket.
//!
//! The operation talks to remote storage only through the
//! [`ObjectStoreFactory`] seam, so tests can substitute mocks for both
//! bucket handles.

use crate::paths::ProjectPaths;
use crate::settings::S3Settings;
use crate::storage::{ObjectStoreFactory, StoreError};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{error, info, warn};

/// File name of the merged output, kept from the upstream pipeline contract.
pub const MERGED_TEXT_FILE_NAME: &str = "text_3434.csv";

#[derive(Debug, Error)]
pub enum MergeError {
    /// The relevance directory held no fragments; no output was written.
    #[error("no relevance inference results found in {path}")]
    NoRelevanceResults { path: PathBuf },
    #[error("failed to connect to remote storage: {0}")]
    Connect(#[source] StoreError),
    #[error("failed to stage relevance fragments from the interim bucket: {0}")]
    Download(#[source] StoreError),
    #[error("failed to upload the merged text file to the main bucket: {0}")]
    Upload(#[source] StoreError),
    #[error("I/O failure while merging relevance fragments: {0}")]
    Io(#[from] std::io::Error),
}

/// What a successful merge produced.
#[derive(Debug)]
pub struct MergeReport {
    pub fragments_merged: usize,
    pub path_merged_text: PathBuf,
    pub uploaded: bool,
}

/// Merges every relevance fragment for `project_name` into
/// `path_folder_text_3434/text_3434.csv`.
///
/// With `s3_settings` present, fragments are first downloaded from the
/// interim bucket under `{prefix}/{project}/interim/ml/relevance`, and the
/// merged file is afterwards uploaded to the main bucket under
/// `{prefix}/{project}/output/text_3434.csv`. With `None`, the operation is
/// purely local and no storage handle is ever constructed.
///
/// Fragments are processed in filename order so the shared header (taken
/// from the first fragment) is reproducible across runs.
pub async fn generate_merged_text(
    project_name: &str,
    s3_settings: Option<&S3Settings>,
    stores: &dyn ObjectStoreFactory,
    project_paths: &ProjectPaths,
) -> Result<MergeReport, MergeError> {
    info!(project = project_name, s3 = s3_settings.is_some(), "Starting relevance merge");

    let main_store = match s3_settings {
        Some(s3) => {
            let main_store = stores.connect(&s3.main_bucket).map_err(|e| {
                error!(error = ?e, "Failed to connect to the main bucket");
                MergeError::Connect(e)
            })?;
            let interim_store = stores.connect(&s3.interim_bucket).map_err(|e| {
                error!(error = ?e, "Failed to connect to the interim bucket");
                MergeError::Connect(e)
            })?;

            let prefix = relevance_prefix(&s3.prefix, project_name);
            let staged = interim_store
                .download_files_in_prefix_to_dir(&prefix, &project_paths.path_folder_relevance)
                .await
                .map_err(|e| {
                    error!(error = ?e, prefix = %prefix, "Staging download failed");
                    MergeError::Download(e)
                })?;
            info!(staged, prefix = %prefix, "Staged relevance fragments from interim bucket");

            Some(main_store)
        }
        None => None,
    };

    let mut fragments: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(&project_paths.path_folder_relevance)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            fragments.push(entry.path());
        }
    }
    fragments.sort();

    if fragments.is_empty() {
        println!("No relevance inference results found.");
        warn!(
            path = %project_paths.path_folder_relevance.display(),
            "Relevance directory is empty, nothing to merge"
        );
        return Err(MergeError::NoRelevanceResults {
            path: project_paths.path_folder_relevance.clone(),
        });
    }

    let path_merged_text = project_paths.path_folder_text_3434.join(MERGED_TEXT_FILE_NAME);
    write_merged_file(&path_merged_text, &fragments)?;
    info!(
        fragments = fragments.len(),
        output = %path_merged_text.display(),
        "Merged relevance fragments"
    );

    let uploaded = match (main_store, s3_settings) {
        (Some(store), Some(s3)) => {
            let key = merged_text_key(&s3.prefix, project_name);
            store
                .upload_file_to_s3(&path_merged_text, &key)
                .await
                .map_err(|e| {
                    error!(error = ?e, key = %key, "Upload of merged text file failed");
                    MergeError::Upload(e)
                })?;
            true
        }
        _ => false,
    };

    Ok(MergeReport {
        fragments_merged: fragments.len(),
        path_merged_text,
        uploaded,
    })
}

/// Key prefix the interim bucket stages relevance fragments under.
fn relevance_prefix(prefix: &str, project_name: &str) -> String {
    format!("{prefix}/{project_name}/interim/ml/relevance")
}

/// Key the merged file is uploaded to in the main bucket.
fn merged_text_key(prefix: &str, project_name: &str) -> String {
    format!("{prefix}/{project_name}/output/{MERGED_TEXT_FILE_NAME}")
}

fn write_merged_file(path_merged_text: &std::path::Path, fragments: &[PathBuf]) -> Result<(), std::io::Error> {
    let mut output = BufWriter::new(File::create(path_merged_text)?);

    for (index, fragment) in fragments.iter().enumerate() {
        let content = fs::read_to_string(fragment)?;
        let chunk = if index == 0 {
            // First fragment verbatim, header included.
            content.as_str()
        } else {
            // Later fragments contribute body lines only.
            match content.split_once('\n') {
                Some((_header, body)) => body,
                // Header-only fragment, nothing to append.
                None => continue,
            }
        };

        if chunk.is_empty() {
            continue;
        }
        output.write_all(chunk.as_bytes())?;
        // Repair a missing trailing newline so records never join across
        // fragment boundaries.
        if !chunk.ends_with('\n') {
            output.write_all(b"\n")?;
        }
    }

    output.flush()
}
