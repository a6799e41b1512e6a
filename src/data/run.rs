use super::format::{write_solution, InstanceReader};
use crate::core::{Cost, SolveError, Solver};
use anyhow::{anyhow, ensure, Context};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

/// Report of running a solver over a set of instances.
#[derive(Debug, Deserialize, Serialize)]
pub struct Report {
    solver: String,
    entries: Vec<ReportEntry>,
}

impl Report {
    /// Create a new report.
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

/// Report of solving a single instance.
/// `cost` is `None` when the instance has no feasible schedule.
#[non_exhaustive]
#[derive(Debug, Deserialize, Serialize)]
pub struct ReportEntry {
    pub name: String,
    pub cost: Option<Cost>,
    pub batches: usize,
    pub time: f64,
}

impl Display for ReportEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self.cost {
            Some(cost) => write!(
                f,
                "{}: {cost} with {} batches in {:.3} sec",
                self.name, self.batches, self.time
            ),
            None => write!(f, "{}: infeasible in {:.3} sec", self.name, self.time),
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.to_string_lossy(), |name| name.to_string_lossy())
        .into_owned()
}

/// Returns the path of the solution file matching an `instance*.txt` file,
/// `solution*.txt` in the same directory.
#[must_use]
pub fn solution_path(input: &Path) -> Option<PathBuf> {
    let name = input.file_name()?.to_str()?;
    let suffix = name.strip_prefix("instance")?.strip_suffix(".txt")?;
    Some(input.with_file_name(format!("solution{suffix}.txt")))
}

/// Solves the instance file `input` and writes the solution to `output`.
/// An infeasible instance is reported without writing any output.
///
/// # Errors
/// - If the instance cannot be read or is invalid.
/// - If the instance has more jobs than the solver handles.
/// - If the solution cannot be written.
pub fn solve_file(
    input: &Path,
    output: &Path,
    reader: &InstanceReader,
    solver: &mut dyn Solver,
) -> anyhow::Result<ReportEntry> {
    let instance = reader
        .read_path(input)
        .with_context(|| format!("Error reading {}", input.display()))?;

    let time = std::time::Instant::now();
    let result = solver.solve(&instance);
    let time = time.elapsed().as_secs_f64();
    let name = file_name(input);

    let schedule = match result {
        Ok(schedule) => schedule,
        Err(error @ SolveError::TooManyJobs { .. }) => {
            return Err(error).with_context(|| format!("Error solving {}", input.display()));
        }
        Err(error @ SolveError::Infeasible(_)) => {
            tracing::warn!("Skipping {}: {error}", input.display());
            return Ok(ReportEntry {
                name,
                cost: None,
                batches: 0,
                time,
            });
        }
    };

    debug_assert!(schedule.verify(), "Schedule is invalid: {schedule:?}");

    let mut writer = BufWriter::new(
        File::create(output).with_context(|| format!("Error creating {}", output.display()))?,
    );
    write_solution(&mut writer, schedule.batches())?;
    writer.flush()?;

    tracing::info!(
        "Processed {} -> {} ({} jobs, {} batches, cost {})",
        input.display(),
        output.display(),
        instance.jobs.len(),
        schedule.batches().len(),
        schedule.cost()
    );

    Ok(ReportEntry {
        name,
        cost: Some(schedule.cost()),
        batches: schedule.batches().len(),
        time,
    })
}

/// Processes `instanceNN.txt` files of `dir` for every `NN` in `numbers`,
/// writing each solution to the matching `solutionNN.txt`.
/// Missing, unreadable, infeasible and too large instances are skipped.
#[must_use]
pub fn process_dir(
    dir: &Path,
    numbers: RangeInclusive<u32>,
    reader: &InstanceReader,
    solver: &mut dyn Solver,
) -> Report {
    let mut report = Report::new(solver.name().into());

    for number in numbers {
        let input = dir.join(format!("instance{number:02}.txt"));
        let output = dir.join(format!("solution{number:02}.txt"));

        if !input.is_file() {
            tracing::debug!("No instance at {}", input.display());
            continue;
        }

        match solve_file(&input, &output, reader, solver) {
            Ok(entry) => report.entries.push(entry),
            Err(error) => tracing::warn!("{error:#}"),
        }
    }

    report
}

/// Runs the solver on every `.txt` instance in `dir`, in file name order,
/// verifying each schedule. No solution files are written.
/// Instances larger than the solver handles are skipped.
///
/// # Errors
/// - If a directory entry or an instance cannot be read.
/// - If the solver creates an invalid schedule.
pub fn run(dir: &Path, reader: &InstanceReader, solver: &mut dyn Solver) -> anyhow::Result<Report> {
    let mut report = Report::new(solver.name().into());

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|extension| extension == "txt") {
            files.push(path);
        }
    }
    files.sort();

    for path in files {
        let instance = reader
            .read_path(&path)
            .with_context(|| format!("Error reading {}", path.display()))?;
        let name = file_name(&path);

        if instance.jobs.len() > solver.maximum_jobs() {
            tracing::debug!("Skipping {name}: too many jobs for {}", solver.name());
            continue;
        }

        let time = std::time::Instant::now();
        let result = solver.solve(&instance);
        let time = time.elapsed().as_secs_f64();

        let entry = match result {
            Ok(schedule) => {
                ensure!(schedule.verify(), "Invalid schedule created for {name}");
                ReportEntry {
                    name,
                    cost: Some(schedule.cost()),
                    batches: schedule.batches().len(),
                    time,
                }
            }
            Err(_) => ReportEntry {
                name,
                cost: None,
                batches: 0,
                time,
            },
        };

        report.entries.push(entry);
    }

    Ok(report)
}

/// Run the solver on every instance of the `samples` directory
/// and check the results against the expected costs.
///
/// # Errors
/// - If a sample cannot be read or has an invalid name.
/// - If no samples are found.
/// - If a schedule is invalid or its cost differs from the expected one.
pub fn samples(solver: &mut dyn Solver) -> anyhow::Result<()> {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("samples");
    let report = run(&dir, &InstanceReader::default(), solver)?;

    ensure!(!report.entries.is_empty(), "No samples found");

    for entry in &report.entries {
        let expected = parse_sample_name(&entry.name)?;
        ensure!(
            entry.cost == expected,
            "Invalid cost {:?} of {}, expected {expected:?}",
            entry.cost,
            entry.name
        );
    }

    Ok(())
}

/// Parses a sample file name `<cost>_<index>.txt`, where cost `x` marks an infeasible sample.
fn parse_sample_name(name: &str) -> anyhow::Result<Option<Cost>> {
    static NAME_ERR: &str = "Cannot read sample name";

    let stem = name.strip_suffix(".txt").ok_or_else(|| anyhow!(NAME_ERR))?;
    let mut parts = stem.split('_');
    let cost = parts.next().ok_or_else(|| anyhow!(NAME_ERR))?;
    let _: usize = parts.next().ok_or_else(|| anyhow!(NAME_ERR))?.parse()?;
    ensure!(parts.next().is_none(), NAME_ERR);

    if cost == "x" {
        Ok(None)
    } else {
        Ok(Some(cost.parse()?))
    }
}
