//! Per-molecule pipeline and the batch driver around it.
//!
//! A molecule goes `Start -> Converted -> Solved -> Classified`, then either
//! `Reconciling` (normal MOPAC termination), `FallbackConverting` (pi-bond
//! assignment failed) or straight to a reported failure. Both non-failing
//! branches end in `FinalFormatConverted` with a mol2 file.

use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::Serialize;

use crate::{
    archive::write_archive,
    atom_names::{reconcile, AtomNameList},
    error::{BatchError, PipelineError},
    external::{
        mopac::Mopac,
        obabel::{OpenBabel, TargetFormat},
    },
    input_data::MoleculeRecord,
    outcome::{classify, Outcome},
    settings::Settings,
    smiles::{ion_type, model_type, IonType, ModelType},
    utils::fs::remove_if_exists,
    workspace::{BatchWorkspace, JobWorkspace},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    Start,
    Converted,
    Solved,
    Classified,
    Reconciling,
    FallbackConverting,
    FinalFormatConverted,
}

/// Files a finished job contributes to the archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum MoleculeOutcome {
    /// MOPAC ended normally, the structure carries the optimized geometry.
    Optimized { structure: PathBuf, log: PathBuf },
    /// MOPAC failed to assign pi-bonds, the structure comes from the
    /// converter alone.
    ConverterOnly { structure: PathBuf, log: PathBuf },
}

impl MoleculeOutcome {
    pub fn structure(&self) -> &Path {
        match self {
            Self::Optimized { structure, .. } | Self::ConverterOnly { structure, .. } => structure,
        }
    }

    pub fn log(&self) -> &Path {
        match self {
            Self::Optimized { log, .. } | Self::ConverterOnly { log, .. } => log,
        }
    }
}

#[derive(Debug)]
pub struct MoleculeFailure {
    pub stage: Stage,
    pub error: PipelineError,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessedMolecule {
    pub name: String,
    pub smiles: String,
    pub ion_type: IonType,
    pub model_type: ModelType,
    pub outcome: MoleculeOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchWarning {
    pub name: String,
    pub stage: Stage,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    /// Whether an archive was produced.
    pub ready: bool,
    pub archive_path: Option<PathBuf>,
    pub processed: Vec<ProcessedMolecule>,
    pub warnings: Vec<BatchWarning>,
}

/// Keeps the current stage of a molecule for logging and error reports.
struct StageTracker<'a> {
    name: &'a str,
    stage: Stage,
}

impl<'a> StageTracker<'a> {
    fn new(name: &'a str) -> Self {
        Self {
            name,
            stage: Stage::Start,
        }
    }

    fn advance(&mut self, stage: Stage) {
        debug!("{}: {:?} -> {:?}", self.name, self.stage, stage);
        self.stage = stage;
    }

    fn fail(&self, error: PipelineError) -> MoleculeFailure {
        MoleculeFailure {
            stage: self.stage,
            error,
        }
    }
}

pub struct Pipeline<'a> {
    settings: &'a Settings,
    converter: OpenBabel,
    solver: Mopac,
}

impl<'a> Pipeline<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self {
            settings,
            converter: OpenBabel::new(&settings.converter, &settings.solver),
            solver: Mopac::new(&settings.solver),
        }
    }

    /// Run every stage for one molecule inside its workspace.
    pub fn run_molecule(
        &self,
        record: &MoleculeRecord,
        job: &JobWorkspace,
    ) -> Result<MoleculeOutcome, MoleculeFailure> {
        let mut tracker = StageTracker::new(&record.name);
        let input = self
            .converter
            .convert_smiles(&record.smiles, TargetFormat::SolverInput, job)
            .map_err(|err| tracker.fail(err))?;
        tracker.advance(Stage::Converted);

        let log = self.solver.run(&input, job).map_err(|err| tracker.fail(err))?;
        tracker.advance(Stage::Solved);

        let outcome = classify(&log).map_err(|err| tracker.fail(err))?;
        tracker.advance(Stage::Classified);

        let outcome = match outcome {
            Outcome::PiBondFailure => {
                tracker.advance(Stage::FallbackConverting);
                let structure = self
                    .converter
                    .convert_smiles(&record.smiles, TargetFormat::Interchange, job)
                    .map_err(|err| tracker.fail(err))?;
                MoleculeOutcome::ConverterOnly { structure, log }
            }
            Outcome::Success(pdb) => {
                tracker.advance(Stage::Reconciling);
                let names = self
                    .reference_names(&record.smiles, job)
                    .map_err(|err| tracker.fail(err))?;
                reconcile(&pdb, &names, &self.settings.reconcile)
                    .map_err(|err| tracker.fail(err))?;
                let structure = self
                    .converter
                    .convert_file(&pdb, TargetFormat::Interchange, job)
                    .map_err(|err| tracker.fail(err))?;
                MoleculeOutcome::Optimized { structure, log }
            }
            Outcome::Failed => return Err(tracker.fail(PipelineError::SolverFailed(log))),
        };
        tracker.advance(Stage::FinalFormatConverted);
        Ok(outcome)
    }

    /// Atom names of a throwaway reference structure.
    fn reference_names(
        &self,
        smiles: &str,
        job: &JobWorkspace,
    ) -> Result<AtomNameList, PipelineError> {
        let reference = self
            .converter
            .convert_smiles(smiles, TargetFormat::Reference, job)?;
        let names = AtomNameList::read_reference(&reference, &self.settings.reconcile.record)?;
        remove_if_exists(&reference)
            .map_err(|err| PipelineError::FileWriteError(reference.clone(), err))?;
        Ok(names)
    }

    fn archive_entries(&self, outcome: &MoleculeOutcome) -> Vec<PathBuf> {
        let mut entries = vec![outcome.structure().to_path_buf()];
        if self.settings.include_logs && outcome.log().is_file() {
            entries.push(outcome.log().to_path_buf());
        }
        entries
    }
}

/// Process a batch one molecule after the other and pack the results.
///
/// `on_start` is called before each molecule with its position in `records`.
/// Failures of single molecules end up in [`BatchResult::warnings`]; only
/// problems with the batch workspace or the archive are returned as errors.
pub fn run_batch<F>(
    records: &[MoleculeRecord],
    settings: &Settings,
    mut on_start: F,
) -> Result<BatchResult, BatchError>
where
    F: FnMut(usize, &MoleculeRecord),
{
    let mut workspace = BatchWorkspace::create(&settings.workspace)?;
    let pipeline = Pipeline::new(settings);
    pipeline.converter.locate()?;

    let mut processed = vec![];
    let mut warnings = vec![];
    let mut archive_entries = vec![];
    for (index, record) in records.iter().enumerate() {
        on_start(index, record);
        let result = workspace
            .job(&record.name)
            .map_err(|error| MoleculeFailure {
                stage: Stage::Start,
                error,
            })
            .and_then(|job| pipeline.run_molecule(record, &job));
        match result {
            Ok(outcome) => {
                if let MoleculeOutcome::ConverterOnly { .. } = outcome {
                    let message =
                        "MOPAC could not assign pi-bonds, structure converted by Open Babel only"
                            .to_string();
                    warn!("{}: {}", record.name, message);
                    warnings.push(BatchWarning {
                        name: record.name.clone(),
                        stage: Stage::FallbackConverting,
                        message,
                    });
                }
                info!("{}: {:?}", record.name, outcome.structure());
                archive_entries.extend(pipeline.archive_entries(&outcome));
                processed.push(ProcessedMolecule {
                    name: record.name.clone(),
                    smiles: record.smiles.clone(),
                    ion_type: ion_type(&record.smiles),
                    model_type: model_type(&record.smiles),
                    outcome,
                });
            }
            Err(failure) => {
                warn!(
                    "Unable to process {} ({:?}): {}",
                    record.name, failure.stage, failure.error
                );
                warnings.push(BatchWarning {
                    name: record.name.clone(),
                    stage: failure.stage,
                    message: failure.error.to_string(),
                });
            }
        }
    }

    let archive_path = if archive_entries.is_empty() {
        None
    } else {
        write_archive(&settings.archive, &archive_entries)?;
        Some(settings.archive.clone())
    };
    Ok(BatchResult {
        ready: archive_path.is_some(),
        archive_path,
        processed,
        warnings,
    })
}
