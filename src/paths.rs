use crate::settings::MainSettings;
use std::path::PathBuf;

/// The directories one project's pipeline run reads from and writes to.
///
/// Derived once from the project name and the main settings; nothing here
/// touches the file system. Callers create the directories they need before
/// invoking the merge. Fields are public so tests can redirect I/O.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectPaths {
    /// Root of this project's data tree: `<data_dir>/<project>`.
    pub path_project_data_dir: PathBuf,
    /// Per-document relevance CSV fragments land here.
    pub path_folder_relevance: PathBuf,
    /// The merged `text_3434.csv` is written here.
    pub path_folder_text_3434: PathBuf,
}

impl ProjectPaths {
    pub fn new(project_name: &str, settings: &MainSettings) -> Self {
        let path_project_data_dir = settings.data_dir.join(project_name);
        let path_folder_relevance = path_project_data_dir
            .join("interim")
            .join("ml")
            .join("relevance");
        let path_folder_text_3434 = path_project_data_dir.join("output");

        Self {
            path_project_data_dir,
            path_folder_relevance,
            path_folder_text_3434,
        }
    }
}
