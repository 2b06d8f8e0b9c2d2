use crate::settings::{MainSettings, S3Settings, Settings};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file could not be opened or parsed. The underlying
    /// cause is logged at the point of failure, not carried here.
    #[error("settings file not found or unreadable: {path}")]
    ConfigurationNotFound { path: PathBuf },
    #[error("failed to write settings file {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Loads the main settings and the S3 settings from their YAML files.
///
/// Any read or parse failure surfaces as [`SettingsError::ConfigurationNotFound`]
/// after the cause has been logged.
pub fn read_settings(
    path_main_settings: &Path,
    path_s3_settings: &Path,
) -> Result<(MainSettings, S3Settings), SettingsError> {
    let main_settings: MainSettings = read_yaml(path_main_settings)?;
    let s3_settings: S3Settings = read_yaml(path_s3_settings)?;

    main_settings.trace_loaded();
    s3_settings.trace_loaded();

    Ok((main_settings, s3_settings))
}

/// Loads a settings file whose kind is unknown ahead of parse time and
/// classifies it: a mapping with a `main_bucket` key is S3 configuration,
/// anything else is main settings.
pub fn read_settings_file(path: &Path) -> Result<Settings, SettingsError> {
    let value: serde_yaml::Value = read_yaml(path)?;

    match Settings::from_value(value) {
        Ok(settings) => Ok(settings),
        Err(e) => {
            error!(error = ?e, path = ?path, "Settings file did not match either schema");
            Err(SettingsError::ConfigurationNotFound {
                path: path.to_path_buf(),
            })
        }
    }
}

/// Serialises both settings records back to their YAML files.
pub fn write_settings(
    path_main_settings: &Path,
    path_s3_settings: &Path,
    main_settings: &MainSettings,
    s3_settings: &S3Settings,
) -> Result<(), SettingsError> {
    write_yaml(path_main_settings, main_settings)?;
    write_yaml(path_s3_settings, s3_settings)?;
    info!(
        path_main = ?path_main_settings,
        path_s3 = ?path_s3_settings,
        "Settings written"
    );
    Ok(())
}

fn read_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, SettingsError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => {
            info!(path = ?path, "Settings file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, path = ?path, "Failed to read settings file");
            return Err(SettingsError::ConfigurationNotFound {
                path: path.to_path_buf(),
            });
        }
    };

    match serde_yaml::from_str(&content) {
        Ok(parsed) => Ok(parsed),
        Err(e) => {
            error!(error = ?e, path = ?path, "Failed to parse settings YAML");
            Err(SettingsError::ConfigurationNotFound {
                path: path.to_path_buf(),
            })
        }
    }
}

fn write_yaml<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), SettingsError> {
    let rendered = serde_yaml::to_string(value).map_err(|e| SettingsError::WriteFailed {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;
    fs::write(path, rendered).map_err(|e| SettingsError::WriteFailed {
        path: path.to_path_buf(),
        source: Box::new(e),
    })
}
