use super::oracle::batch_start;
use crate::core::{run_ids, Batch, Cost, Infeasible, Instance, Job, Schedule, SolveError, Solver};

/// Largest number of jobs the exhaustive search accepts.
pub const MAXIMUM_JOBS: usize = 16;

/// Brute-force search over every split of the release/deadline order into contiguous runs.
/// Each run takes the cheapest machine type able to hold it.
/// It runs in `O(2^n * n * K)` time and serves as a reference for the exact solvers.
/// Instances with more than [`MAXIMUM_JOBS`] jobs are rejected.
#[derive(Clone, Debug, Default)]
pub struct Exhaustive;

/// Cheapest machine type able to batch the run and the resulting batch start.
fn cheapest(instance: &Instance, run: &[Job]) -> Option<(u64, usize, i64)> {
    let start = batch_start(run)?;
    instance
        .machines
        .iter()
        .enumerate()
        .filter(|(_, machine)| machine.capacity >= run.len())
        .min_by_key(|(_, machine)| machine.cost)
        .map(|(index, machine)| (machine.cost, index, start))
}

/// Splits the jobs into runs, cutting after position `i` when bit `i` of `cuts` is set.
fn runs(jobs: &[Job], cuts: u64) -> impl Iterator<Item = &[Job]> {
    let mut begin = 0;
    (1..=jobs.len()).filter_map(move |end| {
        if end == jobs.len() || cuts & (1 << (end - 1)) != 0 {
            let run = &jobs[begin..end];
            begin = end;
            Some(run)
        } else {
            None
        }
    })
}

fn split_cost(instance: &Instance, jobs: &[Job], cuts: u64) -> Option<Cost> {
    runs(jobs, cuts)
        .map(|run| cheapest(instance, run).map(|(cost, ..)| Cost::from(cost)))
        .sum()
}

impl Solver for Exhaustive {
    fn solve<'a>(&mut self, instance: &'a Instance) -> Result<Schedule<'a>, SolveError> {
        let jobs = instance.sorted_jobs();
        if jobs.is_empty() {
            return Ok(Schedule::new(instance, Vec::new()));
        }

        if jobs.len() > MAXIMUM_JOBS {
            return Err(SolveError::TooManyJobs {
                jobs: jobs.len(),
                limit: MAXIMUM_JOBS,
            });
        }

        let mut best: Option<(Cost, u64)> = None;
        for cuts in 0..(1_u64 << (jobs.len() - 1)) {
            if let Some(cost) = split_cost(instance, &jobs, cuts) {
                if best.map_or(true, |(current, _)| cost < current) {
                    best = Some((cost, cuts));
                }
            }
        }

        let (_, cuts) = best.ok_or_else(|| Infeasible::of(instance))?;
        let batches = runs(&jobs, cuts)
            .filter_map(|run| {
                let (_, machine, start) = cheapest(instance, run)?;
                Some(Batch::new(start, machine, run_ids(run)))
            })
            .collect();

        Ok(Schedule::new(instance, batches))
    }

    fn maximum_jobs(&self) -> usize {
        MAXIMUM_JOBS
    }

    fn name(&self) -> &'static str {
        "Exhaustive"
    }
}

#[allow(unsafe_code)]
#[linkme::distributed_slice(super::SOLVERS)]
static INSTANCE: fn() -> Box<dyn Solver> = || Box::new(Exhaustive);
