use super::dynamic::{Entry, Table};
use crate::core::{run_ids, Batch};

/// Walks the back-pointers of a filled table from the full prefix down to the empty one.
/// Returns the batches in the order of the prefixes they close,
/// or `None` if the jobs cannot be batched at all.
#[must_use]
pub fn reconstruct(table: &Table) -> Option<Vec<Batch>> {
    let entries = table.entries();
    let mut batches = Vec::new();
    let mut end = entries.len().checked_sub(1)?;

    loop {
        match entries.get(end)? {
            Entry::Unreachable => return None,
            Entry::Empty => break,
            Entry::Reached {
                previous, choice, ..
            } => {
                let run = table.jobs().get(*previous..end)?;
                batches.push(Batch::new(choice.start, choice.machine, run_ids(run)));
                end = *previous;
            }
        }
    }

    batches.reverse();
    Some(batches)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::{Cost, Instance, MachineType};

    #[test]
    fn batches_should_cover_every_job_once() {
        let instance = Instance::from_windows(
            &[(4, 6), (0, 3), (1, 2), (5, 5), (9, 12)],
            vec![MachineType::new(3, 2), MachineType::new(2, 1)],
        );
        let table = Table::fill(&instance);
        let Some(batches) = reconstruct(&table) else {
            panic!("Instance should be feasible");
        };

        let mut ids: Vec<_> = batches.iter().flat_map(|batch| batch.jobs.clone()).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);

        let cost: Cost = batches
            .iter()
            .map(|batch| Cost::from(instance.machines[batch.machine].cost))
            .sum();
        assert_eq!(Some(cost), table.cost());
        assert_eq!(cost, 8);
    }

    #[test]
    fn job_ids_should_be_ascending_within_batch() {
        let instance =
            Instance::from_windows(&[(3, 9), (1, 9), (2, 9)], vec![MachineType::new(1, 3)]);
        let table = Table::fill(&instance);

        assert_eq!(reconstruct(&table), Some(vec![Batch::new(3, 0, vec![1, 2, 3])]));
        assert_eq!(table.jobs().iter().map(|job| job.id).collect::<Vec<_>>(), vec![2, 3, 1]);
    }

    #[test]
    fn unreachable_table_should_not_reconstruct() {
        let instance = Instance::from_windows(&[(0, 1), (1, 2)], Vec::new());
        assert_eq!(reconstruct(&Table::fill(&instance)), None);
    }

    #[test]
    fn empty_table_should_reconstruct_nothing() {
        let instance = Instance::new(Vec::new(), Vec::new());
        assert_eq!(reconstruct(&Table::fill(&instance)), Some(Vec::new()));
    }
}
