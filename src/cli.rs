use crate::load_settings::read_settings;
use crate::merger::generate_merged_text;
use crate::paths::ProjectPaths;
use crate::storage::s3::S3StoreFactory;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

/// CLI for extraction-utils: merge relevance inference results for a project.
#[derive(Parser)]
#[clap(
    name = "extraction-utils",
    version,
    about = "Merge per-document relevance CSV fragments into a single text_3434.csv, optionally staged through S3"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Merge all relevance fragments of one project under a shared header
    MergeText {
        /// Project whose fragments are merged
        #[clap(long)]
        project: String,
        /// Path to the main settings YAML file
        #[clap(long)]
        settings: PathBuf,
        /// Path to the S3 settings YAML file
        #[clap(long)]
        s3_settings: PathBuf,
        /// Stage inputs from / upload the result to the configured buckets
        #[clap(long)]
        s3: bool,
        /// Override the data directory from the settings file
        /// (falls back to the EXTRACTION_DATA_DIR environment variable)
        #[clap(long)]
        data_dir: Option<PathBuf>,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main().
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::MergeText {
            project,
            settings,
            s3_settings,
            s3,
            data_dir,
        } => {
            let (mut main_settings, s3_settings) = read_settings(&settings, &s3_settings)?;

            // The environment is consulted here and nowhere deeper: the
            // merge operation only ever sees the resolved settings.
            let data_dir_override =
                data_dir.or_else(|| std::env::var_os("EXTRACTION_DATA_DIR").map(PathBuf::from));
            if let Some(dir) = data_dir_override {
                tracing::info!(data_dir = %dir.display(), "Overriding data directory");
                main_settings.data_dir = dir;
            }

            let project_paths = ProjectPaths::new(&project, &main_settings);
            fs::create_dir_all(&project_paths.path_folder_relevance)?;
            fs::create_dir_all(&project_paths.path_folder_text_3434)?;

            let report = generate_merged_text(
                &project,
                s3.then_some(&s3_settings),
                &S3StoreFactory,
                &project_paths,
            )
            .await?;

            println!(
                "Merged {} relevance fragment(s) into {}",
                report.fragments_merged,
                report.path_merged_text.display()
            );
            if report.uploaded {
                println!("Uploaded merged text file to the main bucket.");
            }
            Ok(())
        }
    }
}
