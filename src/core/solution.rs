use super::{job_order, Cost, Instance, Job};
use ahash::{HashSet, HashSetExt};
use serde::{Deserialize, Serialize};

/// A group of jobs processed together at one start time on one machine.
/// `machine` is the index into the sorted machine catalogue
/// and `jobs` holds job ids in ascending order.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, Eq, Hash, Serialize, PartialEq)]
pub struct Batch {
    pub start: i64,
    pub machine: usize,
    pub jobs: Vec<usize>,
}

impl Batch {
    /// Creates a new batch. Job ids are sorted ascending.
    #[must_use]
    pub fn new(start: i64, machine: usize, mut jobs: Vec<usize>) -> Self {
        jobs.sort_unstable();
        Self {
            start,
            machine,
            jobs,
        }
    }
}

/// Formats the batch as a solution line: start, machine index and job ids.
impl std::fmt::Display for Batch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.start, self.machine)?;
        for id in &self.jobs {
            write!(f, " {id}")?;
        }
        Ok(())
    }
}

/// Returned when no partition of the jobs into feasible batches exists.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
#[error("No feasible schedule for {jobs} jobs on {machines} machine types")]
pub struct Infeasible {
    pub jobs: usize,
    pub machines: usize,
}

impl Infeasible {
    /// Creates the error for the given instance.
    #[must_use]
    pub fn of(instance: &Instance) -> Self {
        Self {
            jobs: instance.jobs.len(),
            machines: instance.machines.len(),
        }
    }
}

/// Errors a solver can return instead of a schedule.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum SolveError {
    #[error(transparent)]
    Infeasible(#[from] Infeasible),
    #[error("Instance has {jobs} jobs, the solver handles at most {limit}")]
    TooManyJobs { jobs: usize, limit: usize },
}

/// A schedule of an instance: the batches ordered by start time.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Schedule<'a> {
    instance: &'a Instance,
    batches: Vec<Batch>,
}

impl<'a> Schedule<'a> {
    /// Creates a new schedule. Batches are stably ordered by start time.
    #[must_use]
    pub fn new(instance: &'a Instance, mut batches: Vec<Batch>) -> Self {
        batches.sort_by_key(|batch| batch.start);
        Self { instance, batches }
    }

    /// Returns the batches ordered by start time.
    #[must_use]
    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    /// Calculates the total machine cost of the schedule.
    /// Batches pointing outside the catalogue are not counted.
    #[must_use]
    pub fn cost(&self) -> Cost {
        self.batches
            .iter()
            .filter_map(|batch| self.instance.machines.get(batch.machine))
            .map(|machine| Cost::from(machine.cost))
            .sum()
    }

    /// Checks that the schedule is valid:
    /// - every job id appears in exactly one batch,
    /// - no batch exceeds the capacity of its machine type,
    /// - every batch starts within the window of each of its jobs,
    /// - every batch is a contiguous run of the release/deadline order.
    #[must_use]
    pub fn verify(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.instance.jobs.len());
        let mut position = vec![0; self.instance.jobs.len() + 1];

        for (index, job) in self.instance.sorted_jobs().iter().enumerate() {
            match position.get_mut(job.id) {
                Some(slot) => *slot = index,
                None => return false,
            }
        }

        for batch in &self.batches {
            let Some(machine) = self.instance.machines.get(batch.machine) else {
                return false;
            };

            if batch.jobs.is_empty() || batch.jobs.len() > machine.capacity {
                return false;
            }

            let mut positions = Vec::with_capacity(batch.jobs.len());
            for &id in &batch.jobs {
                let Some(job) = self.instance.job(id) else {
                    return false;
                };

                if !seen.insert(id) || batch.start < job.release || batch.start > job.deadline {
                    return false;
                }

                positions.push(position[id]);
            }

            positions.sort_unstable();
            if positions.windows(2).any(|pair| pair[1] != pair[0] + 1) {
                return false;
            }
        }

        seen.len() == self.instance.jobs.len()
    }
}

/// Returns the ids of a run of sorted jobs in ascending order.
#[must_use]
pub fn run_ids(run: &[Job]) -> Vec<usize> {
    let mut ids: Vec<_> = run.iter().map(|job| job.id).collect();
    ids.sort_unstable();
    ids
}

/// Returns true if the jobs are listed in release/deadline order.
#[must_use]
pub fn is_sorted_order(jobs: &[Job]) -> bool {
    jobs.windows(2).all(|pair| job_order(&pair[0], &pair[1]).is_le())
}
