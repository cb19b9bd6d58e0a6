use std::{fs::File, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use smimop::{
    input_data::load_tables,
    outcome::{classify, Outcome},
    pipeline::run_batch,
    settings::Settings,
    workspace::reset,
};

#[derive(Parser)]
#[command(version, about, long_about = None)]
/// Convert SMILES tables into MOPAC-optimized mol2 structures.
enum Operation {
    /// Run the conversion pipeline over one or more tables
    Run {
        /// Table file pattern, for example "./*.csv". Files ending in `.tsv`
        /// are read as tab separated.
        #[clap(short = 'i')]
        input: String,
        /// YAML settings file
        #[clap(short = 'c')]
        config: Option<PathBuf>,
        /// Column holding the molecule identifiers
        #[clap(long)]
        id_column: Option<String>,
        /// Column holding the SMILES strings
        #[clap(long)]
        smiles_column: Option<String>,
        /// Directory for the per-molecule workspaces
        #[clap(short = 'w')]
        workspace: Option<PathBuf>,
        /// Output archive path
        #[clap(short = 'o')]
        archive: Option<PathBuf>,
        /// Write the batch result as JSON
        #[clap(long)]
        report: Option<PathBuf>,
    },
    /// Remove the workspace and archive of a previous run
    Clean {
        /// YAML settings file
        #[clap(short = 'c')]
        config: Option<PathBuf>,
    },
    /// Print how a MOPAC log would be classified
    Classify {
        /// MOPAC output file
        log: PathBuf,
    },
}

impl Operation {
    fn operate(self) -> Result<()> {
        let current_directory =
            std::env::current_dir().with_context(|| "Unable to read current directory")?;
        match self {
            Self::Run {
                input,
                config,
                id_column,
                smiles_column,
                workspace,
                archive,
                report,
            } => {
                let mut settings = Settings::load(config.as_deref())?;
                if let Some(id_column) = id_column {
                    settings.id_column = id_column;
                }
                if let Some(smiles_column) = smiles_column {
                    settings.smiles_column = smiles_column;
                }
                if let Some(workspace) = workspace {
                    settings.workspace = workspace;
                }
                if let Some(archive) = archive {
                    settings.archive = archive;
                }
                let settings = settings.anchored(&current_directory);
                let records = load_tables(&input, &settings.id_column, &settings.smiles_column)
                    .with_context(|| format!("Failed to load tables from {:?}", input))?;
                reset(&settings.workspace, &settings.archive)?;

                let progress = ProgressBar::new(records.len() as u64);
                progress.set_style(
                    ProgressStyle::default_bar()
                        .template("{bar:40.cyan/blue} {pos}/{len} {msg}")
                        .with_context(|| "Invalid progress bar template")?,
                );
                let result = run_batch(&records, &settings, |index, record| {
                    progress.set_position(index as u64);
                    progress.set_message(record.name.clone());
                })?;
                progress.finish_with_message("done");

                for warning in &result.warnings {
                    warn!("{} ({:?}): {}", warning.name, warning.stage, warning.message);
                }
                match &result.archive_path {
                    Some(path) => info!(
                        "{}/{} molecules processed, archive at {:?}",
                        result.processed.len(),
                        records.len(),
                        path
                    ),
                    None => warn!("No molecule could be processed, no archive written"),
                }
                if let Some(report) = report {
                    let report = current_directory.join(report);
                    let file = File::create(&report)
                        .with_context(|| format!("Unable to create report file {:?}", report))?;
                    serde_json::to_writer_pretty(file, &result)
                        .with_context(|| format!("Failed to write report {:?}", report))?;
                }
                Ok(())
            }
            Self::Clean { config } => {
                let settings = Settings::load(config.as_deref())?.anchored(&current_directory);
                reset(&settings.workspace, &settings.archive)?;
                Ok(())
            }
            Self::Classify { log } => {
                match classify(&log)? {
                    Outcome::PiBondFailure => println!("pi-bond assignment failed"),
                    Outcome::Failed => println!("failed"),
                    Outcome::Success(pdb) => println!("ended normally, structure at {:?}", pdb),
                }
                Ok(())
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
    let operation = Operation::parse();
    operation.operate()
}
