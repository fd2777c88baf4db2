// Dotlanth
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.


//! Parallel translation of many class files
//!
//! Files are translated on a bounded worker pool. Outcomes and diagnostics are
//! reported in submission order no matter which worker finished first, and a
//! file's output is either written completely or not at all. Output paths are
//! planned before any worker starts so two inputs never write the same file.

use crate::config::ToolConfig;
use crate::error::{ToolError, ToolResult};
use clap::Args;
use mdoxy_compiler::{Diagnostic, Filter, FilterConfig, namespaces_for};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// CLI arguments for batch translation
#[derive(Args, Debug, Clone)]
pub struct BatchArgs {
    /// Class definition files to translate
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Directory receiving the translated files
    #[arg(short = 'd', long)]
    pub output_dir: PathBuf,

    /// Worker threads, bounded by the available cores
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Documentation group of every class
    #[arg(long)]
    pub group: Option<String>,

    /// Write a JSON report of the run
    #[arg(long)]
    pub report: Option<PathBuf>,
}

/// Shared flag that stops a batch from starting further files
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// What happened to one input file
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FileOutcome {
    Translated { input: PathBuf, output: PathBuf },
    Failed { input: PathBuf, error: String },
    /// Cancelled before the file was started
    Skipped { input: PathBuf },
}

impl FileOutcome {
    pub fn input(&self) -> &Path {
        match self {
            FileOutcome::Translated { input, .. } | FileOutcome::Failed { input, .. } | FileOutcome::Skipped { input } => input,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, FileOutcome::Failed { .. })
    }
}

/// One input's outcome with the diagnostics found while translating it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    #[serde(flatten)]
    pub outcome: FileOutcome,
    pub diagnostics: Vec<Diagnostic>,
}

/// Result of a batch run, in submission order
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
}

impl BatchReport {
    pub fn outcomes(&self) -> impl Iterator<Item = &FileOutcome> {
        self.files.iter().map(|file| &file.outcome)
    }

    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.files.iter().flat_map(|file| &file.diagnostics)
    }

    /// Lines for stderr: each file's diagnostics, then its failure if any
    pub fn messages(&self) -> Vec<String> {
        let mut messages = Vec::new();
        for file in &self.files {
            messages.extend(file.diagnostics.iter().map(Diagnostic::to_string));
            if let FileOutcome::Failed { error, .. } = &file.outcome {
                messages.push(error.clone());
            }
        }
        messages
    }

    pub fn translated(&self) -> usize {
        self.outcomes().filter(|o| matches!(o, FileOutcome::Translated { .. })).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes().filter(|o| o.is_failure()).count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes().filter(|o| matches!(o, FileOutcome::Skipped { .. })).count()
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> ToolResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        write_atomic(path.as_ref(), &content)
    }
}

/// Translates a list of files on a bounded worker pool
pub struct BatchDriver {
    filter: Filter,
    output_dir: PathBuf,
    extension: String,
    jobs: usize,
}

impl BatchDriver {
    pub fn new(config: FilterConfig, output_dir: impl Into<PathBuf>) -> ToolResult<Self> {
        Ok(Self {
            filter: Filter::new(config)?,
            output_dir: output_dir.into(),
            extension: ToolConfig::default().output_extension,
            jobs: 1,
        })
    }

    /// Worker count, clamped to the available cores and at least one
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        let cores = std::thread::available_parallelism().map_or(1, |n| n.get());
        self.jobs = jobs.clamp(1, cores);
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// Output path of an input: package directories are kept below the output directory
    pub fn output_path(&self, input: &Path) -> PathBuf {
        let mut path = self.output_dir.clone();
        for package in namespaces_for(input) {
            path.push(format!("+{}", package));
        }
        let stem = input.file_stem().map_or_else(|| "out".into(), |s| s.to_os_string());
        path.push(stem);
        path.set_extension(&self.extension);
        path
    }

    /// Output path of every input; an input whose path is already claimed by
    /// an earlier one gets a collision error instead
    pub fn plan_outputs(&self, paths: &[PathBuf]) -> Vec<ToolResult<PathBuf>> {
        let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();
        paths
            .iter()
            .map(|input| match claimed.entry(self.output_path(input)) {
                Entry::Occupied(entry) => Err(ToolError::OutputCollision {
                    input: input.clone(),
                    output: entry.key().clone(),
                    first: entry.get().to_path_buf(),
                }),
                Entry::Vacant(entry) => {
                    let output = entry.key().clone();
                    entry.insert(input.as_path());
                    Ok(output)
                }
            })
            .collect()
    }

    pub fn run(&self, paths: &[PathBuf], cancel: &CancelToken) -> ToolResult<BatchReport> {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(self.jobs).build()?;
        info!(files = paths.len(), jobs = self.jobs, "starting batch");

        let jobs: Vec<(&PathBuf, ToolResult<PathBuf>)> = paths.iter().zip(self.plan_outputs(paths)).collect();
        let files: Vec<FileReport> = pool.install(|| jobs.into_par_iter().map(|(input, output)| self.process(input, output, cancel)).collect());
        let report = BatchReport { files };

        info!(translated = report.translated(), failed = report.failed(), skipped = report.skipped(), "batch finished");
        Ok(report)
    }

    fn process(&self, input: &Path, output: ToolResult<PathBuf>, cancel: &CancelToken) -> FileReport {
        if cancel.is_cancelled() {
            debug!(file = %input.display(), "skipped after cancellation");
            return FileReport {
                outcome: FileOutcome::Skipped { input: input.to_path_buf() },
                diagnostics: Vec::new(),
            };
        }

        match output.and_then(|output| self.translate_file(input, output)) {
            Ok((output, diagnostics)) => FileReport {
                outcome: FileOutcome::Translated { input: input.to_path_buf(), output },
                diagnostics,
            },
            Err(error) => {
                warn!(file = %input.display(), %error, "translation failed");
                FileReport {
                    outcome: FileOutcome::Failed {
                        input: input.to_path_buf(),
                        error: error.to_string(),
                    },
                    diagnostics: Vec::new(),
                }
            }
        }
    }

    fn translate_file(&self, input: &Path, output: PathBuf) -> ToolResult<(PathBuf, Vec<Diagnostic>)> {
        let source = std::fs::read_to_string(input).map_err(|source| ToolError::Read { path: input.to_path_buf(), source })?;
        let translation = self.filter.translate(&source, input)?;
        write_atomic(&output, &translation.output)?;
        Ok((output, translation.diagnostics))
    }
}

/// Write a file completely or not at all, through a temporary file in the target directory
pub fn write_atomic(path: &Path, content: &str) -> ToolResult<()> {
    let write_error = |source: std::io::Error| ToolError::Write { path: path.to_path_buf(), source };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(write_error)?;

    let mut file = NamedTempFile::new_in(dir).map_err(write_error)?;
    file.write_all(content.as_bytes()).map_err(write_error)?;
    file.persist(path).map_err(|error| write_error(error.error))?;
    Ok(())
}

/// Run the `batch` subcommand
pub fn run_batch(args: BatchArgs, config: &ToolConfig) -> ToolResult<BatchReport> {
    let mut filter_config = config.filter_config()?;
    if let Some(group) = args.group {
        filter_config = filter_config.with_group(group);
    }

    let jobs = args.jobs.unwrap_or_else(|| config.worker_count());
    let driver = BatchDriver::new(filter_config, args.output_dir)?.with_jobs(jobs).with_extension(config.output_extension.clone());
    let report = driver.run(&args.inputs, &CancelToken::new())?;

    for message in report.messages() {
        eprintln!("{}", message);
    }

    if let Some(path) = args.report {
        report.save_to_file(&path)?;
        info!(path = %path.display(), "wrote batch report");
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const GOOD: &str = "classdef A\n  properties\n    x = 1; % the x\n  end\nend\n";
    const BAD: &str = "classdef B\n  properties\n    x = [1 2\n  end\nend\n";

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_output_path_keeps_packages() {
        let driver = BatchDriver::new(FilterConfig::new(), "out").unwrap().with_extension("cpp");
        assert_eq!(driver.output_path(Path::new("src/+grid/+cells/Rect.m")), PathBuf::from("out/+grid/+cells/Rect.cpp"));
        assert_eq!(driver.output_path(Path::new("A.m")), PathBuf::from("out/A.cpp"));
    }

    #[test]
    fn test_failures_do_not_discard_other_outputs() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let paths = vec![write(input.path(), "A.m", GOOD), write(input.path(), "B.m", BAD), write(input.path(), "C.m", &GOOD.replace("A", "C"))];

        let driver = BatchDriver::new(FilterConfig::new(), output.path()).unwrap().with_jobs(4);
        let report = driver.run(&paths, &CancelToken::new()).unwrap();

        assert_eq!(report.translated(), 2);
        assert_eq!(report.failed(), 1);
        assert!(report.has_failures());
        assert_eq!(report.outcomes().map(FileOutcome::input).collect::<Vec<_>>(), paths.iter().map(PathBuf::as_path).collect::<Vec<_>>());

        match &report.files[1].outcome {
            FileOutcome::Failed { error, .. } => assert!(error.contains("B.m:3:9: "), "{}", error),
            other => panic!("expected a failure, got {:?}", other),
        }
        assert!(output.path().join("A.cc").exists());
        assert!(!output.path().join("B.cc").exists());
        assert!(std::fs::read_to_string(output.path().join("C.cc")).unwrap().contains("class C {"));
    }

    #[test]
    fn test_diagnostics_follow_submission_order() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let noisy = |name: &str| format!("classdef {}\n  properties (Mystery)\n    x\n  end\nend\n", name);
        let paths: Vec<PathBuf> = (0..8).map(|i| write(input.path(), &format!("K{}.m", i), &noisy(&format!("K{}", i)))).collect();

        let driver = BatchDriver::new(FilterConfig::new(), output.path()).unwrap().with_jobs(4);
        let report = driver.run(&paths, &CancelToken::new()).unwrap();

        let files: Vec<PathBuf> = report.diagnostics().filter_map(|d| d.file.clone()).collect();
        assert_eq!(files, paths);
    }

    #[test]
    fn test_messages_interleave_failures_in_submission_order() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let noisy = |name: &str| format!("classdef {}\n  properties (Mystery)\n    x\n  end\nend\n", name);
        let paths = vec![write(input.path(), "B.m", BAD), write(input.path(), "K1.m", &noisy("K1")), write(input.path(), "B2.m", &BAD.replace("B", "B2")), write(input.path(), "K3.m", &noisy("K3"))];

        let driver = BatchDriver::new(FilterConfig::new(), output.path()).unwrap().with_jobs(4);
        let messages = driver.run(&paths, &CancelToken::new()).unwrap().messages();

        assert_eq!(messages.len(), 4);
        assert!(messages[0].contains("B.m:3:9: "), "{}", messages[0]);
        assert!(messages[1].contains("K1.m:2:") && messages[1].contains("info"), "{}", messages[1]);
        assert!(messages[2].contains("B2.m:3:9: "), "{}", messages[2]);
        assert!(messages[3].contains("K3.m:2:"), "{}", messages[3]);
    }

    #[test]
    fn test_colliding_outputs_fail_later_inputs() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let first = write(input.path(), "a/A.m", GOOD);
        let second = write(input.path(), "b/A.m", &GOOD.replace("x = 1", "x = 2"));
        let paths = vec![first.clone(), second.clone(), write(input.path(), "b/+pkg/A.m", GOOD)];

        let driver = BatchDriver::new(FilterConfig::new().with_banner(false), output.path()).unwrap().with_jobs(4);
        let report = driver.run(&paths, &CancelToken::new()).unwrap();

        assert_eq!(report.translated(), 2);
        match &report.files[1].outcome {
            FileOutcome::Failed { input, error } => {
                assert_eq!(input, &second);
                assert!(error.contains(&first.display().to_string()), "{}", error);
            }
            other => panic!("expected a collision, got {:?}", other),
        }
        assert!(std::fs::read_to_string(output.path().join("A.cc")).unwrap().contains("x = 1;"));
        assert!(output.path().join("+pkg/A.cc").exists());
    }

    #[test]
    fn test_cancelled_batch_skips_files() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let paths = vec![write(input.path(), "A.m", GOOD)];
        let cancel = CancelToken::new();
        cancel.cancel();

        let report = BatchDriver::new(FilterConfig::new(), output.path()).unwrap().run(&paths, &cancel).unwrap();
        assert_eq!(report.skipped(), 1);
        assert!(!output.path().join("A.cc").exists());
    }

    #[test]
    fn test_missing_input_is_a_failure() {
        let output = TempDir::new().unwrap();
        let paths = vec![output.path().join("missing.m")];
        let report = BatchDriver::new(FilterConfig::new(), output.path()).unwrap().run(&paths, &CancelToken::new()).unwrap();
        assert_eq!(report.failed(), 1);
    }

    #[test]
    fn test_report_serializes_outcomes() {
        let report = BatchReport {
            files: vec![
                FileReport {
                    outcome: FileOutcome::Skipped { input: PathBuf::from("A.m") },
                    diagnostics: Vec::new(),
                },
                FileReport {
                    outcome: FileOutcome::Failed {
                        input: PathBuf::from("B.m"),
                        error: "B.m:1:1: broken".to_string(),
                    },
                    diagnostics: Vec::new(),
                },
            ],
        };
        let json: serde_json::Value = serde_json::to_value(&report).unwrap();
        assert_eq!(json["files"][0]["status"], "skipped");
        assert_eq!(json["files"][1]["error"], "B.m:1:1: broken");
        assert_eq!(report.messages(), vec!["B.m:1:1: broken".to_string()]);
    }

    #[test]
    fn test_write_atomic_replaces_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/out.cc");
        write_atomic(&path, "first").unwrap();
        write_atomic(&path, "second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        assert_eq!(std::fs::read_dir(path.parent().unwrap()).unwrap().count(), 1);
    }
}
