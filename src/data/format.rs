use crate::core::{Batch, Instance, Job, MachineType};
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::num::ParseIntError;
use std::path::Path;

/// Errors raised while reading an instance.
#[derive(Debug, thiserror::Error)]
pub enum InstanceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unexpected end of input, expected {0}")]
    UnexpectedEof(&'static str),
    #[error("Line {line}: expected {expected} integers, found {found}")]
    TokenCount {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("Line {line}: {source}")]
    ParseInt {
        line: usize,
        #[source]
        source: ParseIntError,
    },
    #[error("Line {line}: count {value} must not be negative")]
    NegativeCount { line: usize, value: i64 },
    #[error("Number of jobs exceeds maximum limit of {limit}")]
    TooManyJobs { found: usize, limit: usize },
    #[error("Number of machine types exceeds maximum limit of {limit}")]
    TooManyMachineTypes { found: usize, limit: usize },
    #[error("Job {job} has deadline before release time")]
    DeadlineBeforeRelease { job: usize },
    #[error("Machine type {index} must have cost and capacity of at least 1")]
    NonPositiveMachine { index: usize },
}

/// Reads instances in the textual format:
/// the job count, one `release deadline` line per job,
/// the machine type count and one `cost capacity` line per machine type.
/// Blank lines are ignored.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InstanceReader {
    max_jobs: usize,
    max_machine_types: usize,
}

impl Default for InstanceReader {
    fn default() -> Self {
        Self {
            max_jobs: 1000,
            max_machine_types: 100,
        }
    }
}

impl InstanceReader {
    /// Creates a reader with the default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of jobs.
    #[must_use]
    pub const fn max_jobs(mut self, limit: usize) -> Self {
        self.max_jobs = limit;
        self
    }

    /// Sets the maximum number of machine types.
    #[must_use]
    pub const fn max_machine_types(mut self, limit: usize) -> Self {
        self.max_machine_types = limit;
        self
    }

    /// Reads an instance from a buffered reader.
    ///
    /// # Errors
    /// - If the input is malformed or violates the limits.
    pub fn read<R: BufRead>(&self, reader: R) -> Result<Instance, InstanceError> {
        let mut lines = Lines::new(reader);

        let jobs_number = lines.count("the number of jobs")?;
        if jobs_number > self.max_jobs {
            return Err(InstanceError::TooManyJobs {
                found: jobs_number,
                limit: self.max_jobs,
            });
        }

        let mut jobs = Vec::with_capacity(jobs_number);
        for id in 1..=jobs_number {
            let [release, deadline] = lines.integers::<2>("a job")?;
            if deadline < release {
                return Err(InstanceError::DeadlineBeforeRelease { job: id });
            }
            jobs.push(Job::new(id, release, deadline));
        }

        let machines_number = lines.count("the number of machine types")?;
        if machines_number > self.max_machine_types {
            return Err(InstanceError::TooManyMachineTypes {
                found: machines_number,
                limit: self.max_machine_types,
            });
        }

        let mut machines = Vec::with_capacity(machines_number);
        for index in 0..machines_number {
            let [cost, capacity] = lines.integers::<2>("a machine type")?;
            let cost = u64::try_from(cost).ok().filter(|&cost| cost >= 1);
            let capacity = usize::try_from(capacity).ok().filter(|&capacity| capacity >= 1);
            match (cost, capacity) {
                (Some(cost), Some(capacity)) => machines.push(MachineType::new(cost, capacity)),
                _ => return Err(InstanceError::NonPositiveMachine { index }),
            }
        }

        Ok(Instance::new(jobs, machines))
    }

    /// Reads an instance from a file.
    ///
    /// # Errors
    /// - If the file cannot be opened or its content is malformed.
    pub fn read_path(&self, path: impl AsRef<Path>) -> Result<Instance, InstanceError> {
        self.read(BufReader::new(File::open(path)?))
    }

    /// Reads an instance from any reader.
    ///
    /// # Errors
    /// - If the input is malformed or violates the limits.
    pub fn read_from(&self, reader: impl Read) -> Result<Instance, InstanceError> {
        self.read(BufReader::new(reader))
    }

    /// Reads an instance from a string.
    ///
    /// # Errors
    /// - If the input is malformed or violates the limits.
    pub fn read_str(&self, input: &str) -> Result<Instance, InstanceError> {
        self.read(input.as_bytes())
    }
}

struct Lines<R: BufRead> {
    reader: R,
    buffer: String,
    line: usize,
}

impl<R: BufRead> Lines<R> {
    const fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: String::new(),
            line: 0,
        }
    }

    fn next_record(&mut self, what: &'static str) -> Result<(), InstanceError> {
        loop {
            self.buffer.clear();
            self.line += 1;
            if self.reader.read_line(&mut self.buffer)? == 0 {
                return Err(InstanceError::UnexpectedEof(what));
            }
            if !self.buffer.trim().is_empty() {
                return Ok(());
            }
        }
    }

    fn integers<const N: usize>(&mut self, what: &'static str) -> Result<[i64; N], InstanceError> {
        self.next_record(what)?;

        let tokens: Vec<_> = self.buffer.split_whitespace().collect();
        if tokens.len() != N {
            return Err(InstanceError::TokenCount {
                line: self.line,
                expected: N,
                found: tokens.len(),
            });
        }

        let mut values = [0; N];
        for (value, token) in values.iter_mut().zip(tokens) {
            *value = token.parse().map_err(|source| InstanceError::ParseInt {
                line: self.line,
                source,
            })?;
        }
        Ok(values)
    }

    fn count(&mut self, what: &'static str) -> Result<usize, InstanceError> {
        let [value] = self.integers::<1>(what)?;
        usize::try_from(value).map_err(|_| InstanceError::NegativeCount {
            line: self.line,
            value,
        })
    }
}

/// Writes batches in the solution format:
/// the batch count, then one `start machine ids...` line per batch.
///
/// # Errors
/// - If the writer fails.
pub fn write_solution(writer: &mut impl Write, batches: &[Batch]) -> std::io::Result<()> {
    writeln!(writer, "{}", batches.len())?;
    for batch in batches {
        writeln!(writer, "{batch}")?;
    }
    Ok(())
}

/// Writes an instance in the format accepted by [`InstanceReader`].
/// Machine types are written in catalogue order.
///
/// # Errors
/// - If the writer fails.
pub fn write_instance(writer: &mut impl Write, instance: &Instance) -> std::io::Result<()> {
    writeln!(writer, "{}", instance.jobs.len())?;
    for job in &instance.jobs {
        writeln!(writer, "{} {}", job.release, job.deadline)?;
    }
    writeln!(writer, "{}", instance.machines.len())?;
    for machine in &instance.machines {
        writeln!(writer, "{} {}", machine.cost, machine.capacity)?;
    }
    Ok(())
}

/// Formats batches in the solution format.
#[must_use]
pub fn to_string(batches: &[Batch]) -> String {
    let lines = batches.iter().map(|batch| format!("{batch}\n"));
    std::iter::once(format!("{}\n", batches.len())).chain(lines).collect()
}
