use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A job. Contains its 1-based id, the release time and the deadline.
/// Deadline is never before the release time.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Serialize, PartialEq)]
pub struct Job {
    pub id: usize,
    pub release: i64,
    pub deadline: i64,
}

impl Job {
    /// Creates a new job.
    #[must_use]
    pub const fn new(id: usize, release: i64, deadline: i64) -> Self {
        Self {
            id,
            release,
            deadline,
        }
    }
}

/// Total cost of a set of batches. Wide enough to sum any number of `u64` machine costs
/// an instance can hold.
pub type Cost = u128;

/// A machine type. Every batch on a machine of this type costs `cost`
/// and holds at most `capacity` jobs.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Serialize, PartialEq)]
pub struct MachineType {
    pub cost: u64,
    pub capacity: usize,
}

impl MachineType {
    /// Creates a new machine type.
    #[must_use]
    pub const fn new(cost: u64, capacity: usize) -> Self {
        Self { cost, capacity }
    }
}

impl PartialOrd<Self> for MachineType {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Machine types are ordered by capacity, then by cost.
impl Ord for MachineType {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.capacity.cmp(&other.capacity) {
            Ordering::Equal => self.cost.cmp(&other.cost),
            order => order,
        }
    }
}

/// Compares two jobs by release time, then deadline, then id.
#[must_use]
pub fn job_order(first: &Job, second: &Job) -> Ordering {
    (first.release, first.deadline, first.id).cmp(&(second.release, second.deadline, second.id))
}

/// An instance of the batch scheduling problem.
/// Machine types are kept sorted by capacity and cost,
/// so their indices are the ones reported in solutions.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, Eq, Serialize, PartialEq)]
pub struct Instance {
    pub jobs: Vec<Job>,
    pub machines: Vec<MachineType>,
}

impl Instance {
    /// Creates a new instance from jobs and machine types.
    /// The machine catalogue is sorted by capacity and cost.
    #[must_use]
    pub fn new(jobs: Vec<Job>, mut machines: Vec<MachineType>) -> Self {
        machines.sort();
        Self { jobs, machines }
    }

    /// Creates a new instance from `(release, deadline)` pairs.
    /// Ids are assigned by position, starting from 1.
    #[must_use]
    pub fn from_windows(windows: &[(i64, i64)], machines: Vec<MachineType>) -> Self {
        let jobs = windows
            .iter()
            .enumerate()
            .map(|(i, &(release, deadline))| Job::new(i + 1, release, deadline))
            .collect();
        Self::new(jobs, machines)
    }

    /// Returns the jobs sorted by release time and deadline, stable by id.
    #[must_use]
    pub fn sorted_jobs(&self) -> Vec<Job> {
        let mut jobs = self.jobs.clone();
        jobs.sort_by(job_order);
        jobs
    }

    /// Returns the largest capacity in the catalogue, zero if it is empty.
    #[must_use]
    pub fn max_capacity(&self) -> usize {
        self.machines.last().map_or(0, |machine| machine.capacity)
    }

    /// Returns the job with the given id.
    #[must_use]
    pub fn job(&self, id: usize) -> Option<&Job> {
        id.checked_sub(1).and_then(|index| self.jobs.get(index))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn catalogue_should_be_sorted_by_capacity_then_cost() {
        let machines = vec![
            MachineType::new(5, 3),
            MachineType::new(2, 1),
            MachineType::new(1, 3),
        ];
        let instance = Instance::new(Vec::new(), machines);

        assert_eq!(
            instance.machines,
            vec![
                MachineType::new(2, 1),
                MachineType::new(1, 3),
                MachineType::new(5, 3),
            ]
        );
        assert_eq!(instance.max_capacity(), 3);
    }

    #[test]
    fn sorted_jobs_should_break_ties_by_id() {
        let instance = Instance::from_windows(&[(3, 4), (1, 5), (1, 2), (1, 5)], Vec::new());
        let ids: Vec<_> = instance.sorted_jobs().iter().map(|job| job.id).collect();
        assert_eq!(ids, vec![3, 2, 4, 1]);
    }

    #[test]
    fn job_lookup_should_use_one_based_ids() {
        let instance = Instance::from_windows(&[(0, 1), (2, 3)], Vec::new());
        assert_eq!(instance.job(2), Some(&Job::new(2, 2, 3)));
        assert_eq!(instance.job(0), None);
        assert_eq!(instance.job(3), None);
    }

    #[test]
    fn empty_catalogue_should_have_zero_capacity() {
        assert_eq!(Instance::new(Vec::new(), Vec::new()).max_capacity(), 0);
    }
}
