use extraction_utils::paths::ProjectPaths;
use extraction_utils::settings::MainSettings;
use std::path::PathBuf;

#[test]
fn paths_derive_from_data_dir_and_project_name() {
    let settings = MainSettings {
        data_dir: PathBuf::from("/srv/pipeline"),
        ..Default::default()
    };

    let paths = ProjectPaths::new("esg_reports", &settings);

    assert_eq!(
        paths.path_project_data_dir,
        PathBuf::from("/srv/pipeline/esg_reports")
    );
    assert_eq!(
        paths.path_folder_relevance,
        PathBuf::from("/srv/pipeline/esg_reports/interim/ml/relevance")
    );
    assert_eq!(
        paths.path_folder_text_3434,
        PathBuf::from("/srv/pipeline/esg_reports/output")
    );
}

#[test]
fn path_resolution_is_pure_and_creates_nothing() {
    let settings = MainSettings {
        data_dir: PathBuf::from("./never_created"),
        ..Default::default()
    };

    let paths = ProjectPaths::new("test", &settings);

    assert!(!paths.path_project_data_dir.exists());
    assert_eq!(ProjectPaths::new("test", &settings), paths);
}
