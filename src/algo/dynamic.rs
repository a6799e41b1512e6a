use super::oracle::RunWindow;
use super::reconstruct::reconstruct;
use crate::core::{is_sorted_order, Cost, Infeasible, Instance, Job, Schedule, SolveError, Solver};

/// The last batch of an optimally covered prefix.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Choice {
    pub start: i64,
    pub machine: usize,
    pub length: usize,
}

/// An entry of the optimal-cost table, one per prefix of the sorted jobs.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Entry {
    /// No partition of the prefix into feasible batches exists.
    Unreachable,
    /// The empty prefix, covered at zero cost.
    Empty,
    /// The prefix is covered at `cost` by covering `previous` jobs and adding `choice`.
    Reached {
        cost: Cost,
        previous: usize,
        choice: Choice,
    },
}

impl Entry {
    /// Returns the cost of the entry, `None` if the prefix is unreachable.
    #[must_use]
    pub const fn cost(&self) -> Option<Cost> {
        match self {
            Self::Unreachable => None,
            Self::Empty => Some(0),
            Self::Reached { cost, .. } => Some(*cost),
        }
    }
}

/// Optimal-cost table over the prefixes of the sorted jobs.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Table {
    jobs: Vec<Job>,
    entries: Vec<Entry>,
}

impl Table {
    /// Fills the table for the given instance.
    ///
    /// For every prefix it tries each batch length up to the largest capacity
    /// and each machine type able to hold it, keeping the cheapest choice.
    /// Ties keep the shortest batch, then the lowest catalogue index.
    #[must_use]
    pub fn fill(instance: &Instance) -> Self {
        let jobs = instance.sorted_jobs();
        debug_assert!(is_sorted_order(&jobs));

        let mut entries = vec![Entry::Unreachable; jobs.len() + 1];
        entries[0] = Entry::Empty;

        let max_capacity = instance.max_capacity();

        for end in 1..=jobs.len() {
            let mut best = Entry::Unreachable;
            let mut window = RunWindow::new(&jobs[end - 1]);

            for length in 1..=end.min(max_capacity) {
                if length > 1 {
                    window.extend(&jobs[end - length]);
                }

                // The last job has the latest release, so growing the run leftwards
                // keeps the maximum release and can only lower the minimum deadline.
                let Some(start) = window.start() else {
                    break;
                };

                let previous = end - length;
                let Some(prefix) = entries[previous].cost() else {
                    continue;
                };

                let first_fit = instance
                    .machines
                    .partition_point(|machine| machine.capacity < length);

                for (machine, kind) in instance.machines.iter().enumerate().skip(first_fit) {
                    let cost = prefix + Cost::from(kind.cost);
                    if best.cost().map_or(true, |current| cost < current) {
                        let choice = Choice {
                            start,
                            machine,
                            length,
                        };
                        best = Entry::Reached {
                            cost,
                            previous,
                            choice,
                        };
                    }
                }
            }

            entries[end] = best;
        }

        Self { jobs, entries }
    }

    /// Returns the jobs in release/deadline order, the index space of the table.
    #[must_use]
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// Returns the entry of every prefix, from the empty one up to all jobs.
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Returns the minimum cost of batching all jobs, `None` if it is impossible.
    #[must_use]
    pub fn cost(&self) -> Option<Cost> {
        self.entries.last().and_then(Entry::cost)
    }
}

/// Exact dynamic program over contiguous runs of the release/deadline order.
/// It runs in `O(n * B * K)` time, where `B` is the largest capacity
/// and `K` the number of machine types.
#[derive(Clone, Debug, Default)]
pub struct DynamicProgramming;

impl Solver for DynamicProgramming {
    fn solve<'a>(&mut self, instance: &'a Instance) -> Result<Schedule<'a>, SolveError> {
        let table = Table::fill(instance);
        let batches = reconstruct(&table).ok_or_else(|| Infeasible::of(instance))?;
        Ok(Schedule::new(instance, batches))
    }

    fn name(&self) -> &'static str {
        "DynamicProgramming"
    }
}

#[allow(unsafe_code)]
#[linkme::distributed_slice(super::SOLVERS)]
static INSTANCE: fn() -> Box<dyn Solver> = || Box::new(DynamicProgramming);

#[cfg(test)]
mod test {
    use super::*;
    use crate::algo::Exhaustive;
    use crate::core::{Batch, MachineType};
    use crate::data::samples;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_instance(rng: &mut impl Rng) -> Instance {
        let jobs = rng.gen_range(0..=8);
        let windows: Vec<_> = (0..jobs)
            .map(|_| {
                let release = rng.gen_range(0..=6);
                (release, release + rng.gen_range(0..=4))
            })
            .collect();
        let machines = (0..rng.gen_range(1..=3))
            .map(|_| MachineType::new(rng.gen_range(1..=10), rng.gen_range(1..=4)))
            .collect();
        Instance::from_windows(&windows, machines)
    }

    #[test]
    fn test_dynamic_programming() {
        assert!(samples(&mut DynamicProgramming).is_ok());
    }

    #[test]
    fn overlapping_pair_should_share_a_batch() -> anyhow::Result<()> {
        let instance = Instance::from_windows(&[(0, 0), (0, 2)], vec![MachineType::new(1, 2)]);
        let schedule = DynamicProgramming.solve(&instance)?;

        assert_eq!(schedule.batches(), &[Batch::new(0, 0, vec![1, 2])]);
        assert_eq!(schedule.cost(), 1);
        Ok(())
    }

    #[test]
    fn disjoint_pair_should_use_two_batches() -> anyhow::Result<()> {
        let instance = Instance::from_windows(&[(0, 1), (3, 3)], vec![MachineType::new(4, 2)]);
        let schedule = DynamicProgramming.solve(&instance)?;

        assert_eq!(
            schedule.batches(),
            &[Batch::new(1, 0, vec![1]), Batch::new(3, 0, vec![2])]
        );
        assert_eq!(schedule.cost(), 8);
        Ok(())
    }

    #[test]
    fn empty_instance_should_have_no_batches() -> anyhow::Result<()> {
        let instance = Instance::new(Vec::new(), vec![MachineType::new(3, 1)]);
        let schedule = DynamicProgramming.solve(&instance)?;

        assert!(schedule.batches().is_empty());
        assert_eq!(schedule.cost(), 0);

        let instance = Instance::new(Vec::new(), Vec::new());
        assert!(DynamicProgramming.solve(&instance)?.batches().is_empty());
        Ok(())
    }

    #[test]
    fn missing_machines_should_be_infeasible() {
        let instance = Instance::from_windows(&[(0, 3)], Vec::new());
        let table = Table::fill(&instance);

        assert_eq!(table.cost(), None);
        assert_eq!(table.entries(), &[Entry::Empty, Entry::Unreachable]);
        assert_eq!(
            DynamicProgramming.solve(&instance),
            Err(SolveError::Infeasible(Infeasible {
                jobs: 1,
                machines: 0
            }))
        );
    }

    #[test]
    fn large_costs_should_not_overflow() -> anyhow::Result<()> {
        let instance = crate::data::InstanceReader::new()
            .read_str("3\n0 0\n5 5\n9 9\n1\n9223372036854775807 1\n")?;
        let schedule = DynamicProgramming.solve(&instance)?;

        let expected = 3 * Cost::from(u64::try_from(i64::MAX)?);
        assert_eq!(schedule.batches().len(), 3);
        assert_eq!(schedule.cost(), expected);
        assert_eq!(Table::fill(&instance).cost(), Some(expected));
        assert_eq!(Exhaustive.solve(&instance)?.cost(), expected);
        Ok(())
    }

    #[test]
    fn single_jobs_should_follow_the_single_job_rule() -> anyhow::Result<()> {
        let instance = Instance::from_windows(&[(2, 2), (10, 15)], vec![MachineType::new(1, 5)]);
        let schedule = DynamicProgramming.solve(&instance)?;

        assert_eq!(
            schedule.batches(),
            &[Batch::new(2, 0, vec![1]), Batch::new(11, 0, vec![2])]
        );
        Ok(())
    }

    #[test]
    fn cheaper_small_machines_should_be_preferred() -> anyhow::Result<()> {
        let instance = Instance::from_windows(
            &[(0, 5), (1, 5), (2, 5)],
            vec![MachineType::new(10, 3), MachineType::new(2, 1)],
        );
        let schedule = DynamicProgramming.solve(&instance)?;

        assert_eq!(schedule.cost(), 6);
        assert_eq!(schedule.batches().len(), 3);
        assert!(schedule.batches().iter().all(|batch| batch.machine == 0));
        Ok(())
    }

    #[test]
    fn ties_should_keep_the_shortest_last_batch() {
        let machines = vec![MachineType::new(1, 1), MachineType::new(2, 2)];
        let instance = Instance::from_windows(&[(0, 4), (1, 4)], machines);
        let table = Table::fill(&instance);

        assert_eq!(table.cost(), Some(2));
        assert_eq!(
            table.entries()[2],
            Entry::Reached {
                cost: 2,
                previous: 1,
                choice: Choice {
                    start: 2,
                    machine: 0,
                    length: 1
                }
            }
        );
    }

    #[test]
    fn table_should_be_deterministic() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let instance = random_instance(&mut rng);
            assert_eq!(Table::fill(&instance), Table::fill(&instance));
        }
    }

    #[test]
    fn cost_should_match_exhaustive_search() -> anyhow::Result<()> {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..300 {
            let instance = random_instance(&mut rng);
            let dynamic = DynamicProgramming.solve(&instance)?;
            let exhaustive = Exhaustive.solve(&instance)?;

            assert!(dynamic.verify(), "Invalid schedule: {dynamic:?}");
            assert_eq!(dynamic.cost(), exhaustive.cost(), "Instance: {instance:?}");
            assert_eq!(Table::fill(&instance).cost(), Some(dynamic.cost()));
        }
        Ok(())
    }
}
