use crate::core::{Solver, VALUE_TOLERANCE};
use crate::data::deserialize;
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result};
use std::fs::File;
use std::io::BufReader;

/// Report of running a directory of samples.
#[derive(Debug, Deserialize, Serialize)]
pub struct Report {
    solver: String,
    entries: Vec<ReportEntry>,
}

impl Report {
    fn new(solver: String) -> Self {
        let entries = Vec::new();
        Self { solver, entries }
    }

    /// Get the solver name.
    #[must_use]
    pub fn solver_name(&self) -> &str {
        &self.solver
    }

    /// Get the entries.
    #[must_use]
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        writeln!(f, "Solver: {}", self.solver)?;
        for entry in &self.entries {
            writeln!(f, "{entry}")?;
        }
        writeln!(f, "-------------------")
    }
}

/// Report of running a single sample.
#[non_exhaustive]
#[derive(Debug, Deserialize, Serialize)]
pub struct ReportEntry {
    pub name: String,
    pub value: f64,
    pub time: f64,
}

impl Display for ReportEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}: {} in {:.2} sec", self.name, self.value, self.time)
    }
}

/// Run all samples in the `samples` directory.
/// Print the report to stdout.
///
/// # Arguments
/// - `valid` is true, check if the value is optimal.
/// - `solver` is the solver to run.
///
/// # Errors
/// - If a file cannot be read or a solver fails.
/// - If no samples are found.
///
/// # Panics
/// - If the selection is invalid.
/// - If the value is not optimal and `valid` is true.
pub fn samples(valid: bool, solver: &mut dyn Solver) -> anyhow::Result<()> {
    run("samples", valid, solver).and_then(|report| {
        if report.entries.is_empty() {
            Err(anyhow!("No samples found"))
        } else {
            println!("{report}");
            Ok(())
        }
    })
}

/// Run all samples in the `dir` directory.
/// Grouped samples are skipped for solvers without group support.
///
/// # Arguments
/// - `valid` is true, check if the value is optimal.
/// - `solver` is the solver to run.
///
/// # Errors
/// - If a file cannot be read or a solver fails.
///
/// # Panics
/// - If the selection is invalid.
/// - If the value is not optimal and `valid` is true.
pub fn run(dir: &str, valid: bool, solver: &mut dyn Solver) -> anyhow::Result<Report> {
    let mut report = Report::new(solver.name().into());

    let mut files = std::fs::read_dir(dir)?.collect::<std::io::Result<Vec<_>>>()?;
    files.sort_by_key(std::fs::DirEntry::file_name);

    for file in files {
        let (name, optimum, grouped) = parse_filename(&file.file_name())?;

        if grouped && !solver.supports_groups() {
            log::debug!("{} skips grouped sample {name}", solver.name());
            continue;
        }

        let instance = deserialize(&mut BufReader::new(File::open(file.path())?))?;

        let time = std::time::Instant::now();
        let selection = solver.solve(&instance)?;
        let time = time.elapsed().as_secs_f64();

        assert!(selection.verify(), "Invalid selection created");

        let value = selection.value();
        if valid {
            assert!(
                (value - optimum).abs() <= VALUE_TOLERANCE,
                "Invalid value {name}: {value} != {optimum}"
            );
        }

        report.entries.push(ReportEntry { name, value, time });
    }

    Ok(report)
}

fn parse_filename(filename: &std::ffi::OsString) -> anyhow::Result<(String, f64, bool)> {
    static NAME_ERR: &str = "Cannot read filename";

    let name = filename.to_str().ok_or_else(|| anyhow!(NAME_ERR))?;
    let stem = name.rsplit_once('.').map_or(name, |(stem, _)| stem);
    let mut parts = stem.split('_');
    let optimum = parts.next().ok_or_else(|| anyhow!(NAME_ERR))?.parse()?;
    let _: usize = parts.next().ok_or_else(|| anyhow!(NAME_ERR))?.parse()?;
    let grouped = parts.next().is_some_and(|x| x == "grouped");
    Ok((name.into(), optimum, grouped))
}
