use extraction_utils::merger::{generate_merged_text, MergeError};
use extraction_utils::paths::ProjectPaths;
use extraction_utils::settings::{S3BucketSettings, S3Settings};
use extraction_utils::storage::{MockObjectStore, MockObjectStoreFactory, ObjectStore};
use mockall::Sequence;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Builds the directory layout the merge operation expects, redirected into
/// a temporary folder, with the directories already created.
fn project_paths(root: &Path) -> ProjectPaths {
    let paths = ProjectPaths {
        path_project_data_dir: root.to_path_buf(),
        path_folder_relevance: root.join("relevance"),
        path_folder_text_3434: root.join("folder_test_3434"),
    };
    fs::create_dir_all(&paths.path_folder_relevance).unwrap();
    fs::create_dir_all(&paths.path_folder_text_3434).unwrap();
    paths
}

fn seed_relevance_fragments(dir: &Path) {
    for i in 0..5 {
        fs::write(
            dir.join(format!("{i}_test.csv")),
            format!("HEADER\nThat is a test {i}\n"),
        )
        .unwrap();
    }
}

fn s3_settings() -> S3Settings {
    S3Settings {
        prefix: "test_prefix".to_owned(),
        main_bucket: S3BucketSettings {
            s3_endpoint: "S3_END_MAIN".to_owned(),
            s3_access_key: "S3_ACCESS_MAIN".to_owned(),
            s3_secret_key: "S3_SECRET_MAIN".to_owned(),
            s3_bucket_name: "S3_NAME_MAIN".to_owned(),
        },
        interim_bucket: S3BucketSettings {
            s3_endpoint: "S3_END_INTERIM".to_owned(),
            s3_access_key: "S3_ACCESS_INTERIM".to_owned(),
            s3_secret_key: "S3_SECRET_INTERIM".to_owned(),
            s3_bucket_name: "S3_NAME_INTERIM".to_owned(),
        },
    }
}

/// Without remote storage, all fragments merge under the first fragment's
/// header and no storage handle is ever constructed.
#[tokio::test]
async fn merge_without_remote_storage_concatenates_under_one_header() {
    let tmp = TempDir::new().unwrap();
    let paths = project_paths(tmp.path());
    seed_relevance_fragments(&paths.path_folder_relevance);

    let mut factory = MockObjectStoreFactory::new();
    factory.expect_connect().times(0);

    let report = generate_merged_text("test", None, &factory, &paths)
        .await
        .expect("merge should succeed");

    assert_eq!(report.fragments_merged, 5);
    assert!(!report.uploaded);

    let merged = fs::read_to_string(paths.path_folder_text_3434.join("text_3434.csv")).unwrap();
    let expected = "HEADER\n\
        That is a test 0\n\
        That is a test 1\n\
        That is a test 2\n\
        That is a test 3\n\
        That is a test 4\n";
    assert_eq!(merged, expected);
}

/// Fragments missing a trailing newline must not join records across
/// fragment boundaries.
#[tokio::test]
async fn merge_repairs_missing_trailing_newline() {
    let tmp = TempDir::new().unwrap();
    let paths = project_paths(tmp.path());
    fs::write(paths.path_folder_relevance.join("a.csv"), "HEADER\nrow a").unwrap();
    fs::write(paths.path_folder_relevance.join("b.csv"), "HEADER\nrow b\n").unwrap();

    let factory = MockObjectStoreFactory::new();
    generate_merged_text("test", None, &factory, &paths)
        .await
        .expect("merge should succeed");

    let merged = fs::read_to_string(paths.path_folder_text_3434.join("text_3434.csv")).unwrap();
    assert_eq!(merged, "HEADER\nrow a\nrow b\n");
}

/// An empty relevance directory is a typed failure and writes no output.
#[tokio::test]
async fn merge_fails_on_empty_relevance_directory() {
    let tmp = TempDir::new().unwrap();
    let paths = project_paths(tmp.path());

    let factory = MockObjectStoreFactory::new();
    let err = generate_merged_text("test", None, &factory, &paths)
        .await
        .expect_err("merge should fail");

    assert!(matches!(err, MergeError::NoRelevanceResults { .. }));
    assert!(!paths.path_folder_text_3434.join("text_3434.csv").exists());
}

/// A failing directory enumeration surfaces as a typed I/O error, never a
/// panic or a raw propagated error.
#[tokio::test]
async fn merge_fails_on_unreadable_relevance_directory() {
    let tmp = TempDir::new().unwrap();
    let mut paths = project_paths(tmp.path());
    paths.path_folder_relevance = tmp.path().join("does_not_exist");

    let factory = MockObjectStoreFactory::new();
    let err = generate_merged_text("test", None, &factory, &paths)
        .await
        .expect_err("merge should fail");

    assert!(matches!(err, MergeError::Io(_)));
}

/// With remote storage, exactly two handles are constructed with the
/// credentials verbatim from the settings, the staging download happens
/// before the merge and the upload happens after it.
#[tokio::test]
async fn merge_with_remote_storage_stages_and_uploads() {
    let tmp = TempDir::new().unwrap();
    let paths = project_paths(tmp.path());
    seed_relevance_fragments(&paths.path_folder_relevance);

    let mut seq = Sequence::new();

    let mut interim_store = MockObjectStore::new();
    interim_store
        .expect_download_files_in_prefix_to_dir()
        .withf(|prefix, dir| {
            prefix == "test_prefix/test/interim/ml/relevance" && dir.ends_with("relevance")
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(0));

    let mut main_store = MockObjectStore::new();
    main_store
        .expect_upload_file_to_s3()
        .withf(|local_path, remote_key| {
            local_path.ends_with("text_3434.csv")
                && remote_key == "test_prefix/test/output/text_3434.csv"
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(()));

    let mut factory = MockObjectStoreFactory::new();
    factory
        .expect_connect()
        .withf(|bucket| {
            bucket.s3_endpoint == "S3_END_MAIN"
                && bucket.s3_access_key == "S3_ACCESS_MAIN"
                && bucket.s3_secret_key == "S3_SECRET_MAIN"
                && bucket.s3_bucket_name == "S3_NAME_MAIN"
        })
        .times(1)
        .return_once(move |_| Ok(Box::new(main_store) as Box<dyn ObjectStore>));
    factory
        .expect_connect()
        .withf(|bucket| {
            bucket.s3_endpoint == "S3_END_INTERIM"
                && bucket.s3_access_key == "S3_ACCESS_INTERIM"
                && bucket.s3_secret_key == "S3_SECRET_INTERIM"
                && bucket.s3_bucket_name == "S3_NAME_INTERIM"
        })
        .times(1)
        .return_once(move |_| Ok(Box::new(interim_store) as Box<dyn ObjectStore>));

    let settings = s3_settings();
    let report = generate_merged_text("test", Some(&settings), &factory, &paths)
        .await
        .expect("merge should succeed");

    assert_eq!(report.fragments_merged, 5);
    assert!(report.uploaded);
}

/// A failing staging download is reported as a download error; no output is
/// written and nothing is uploaded.
#[tokio::test]
async fn merge_reports_download_failure() {
    let tmp = TempDir::new().unwrap();
    let paths = project_paths(tmp.path());
    seed_relevance_fragments(&paths.path_folder_relevance);

    let mut interim_store = MockObjectStore::new();
    interim_store
        .expect_download_files_in_prefix_to_dir()
        .times(1)
        .returning(|_, _| Err("connection reset".into()));

    let mut main_store = MockObjectStore::new();
    main_store.expect_upload_file_to_s3().times(0);

    let mut factory = MockObjectStoreFactory::new();
    factory
        .expect_connect()
        .withf(|bucket| bucket.s3_endpoint == "S3_END_MAIN")
        .times(1)
        .return_once(move |_| Ok(Box::new(main_store) as Box<dyn ObjectStore>));
    factory
        .expect_connect()
        .withf(|bucket| bucket.s3_endpoint == "S3_END_INTERIM")
        .times(1)
        .return_once(move |_| Ok(Box::new(interim_store) as Box<dyn ObjectStore>));

    let settings = s3_settings();
    let err = generate_merged_text("test", Some(&settings), &factory, &paths)
        .await
        .expect_err("merge should fail");

    assert!(matches!(err, MergeError::Download(_)));
    assert!(!paths.path_folder_text_3434.join("text_3434.csv").exists());
}
