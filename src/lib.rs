#![deny(clippy::all, clippy::cargo, clippy::expect_used, clippy::unwrap_used)]
#![deny(clippy::pedantic, clippy::nursery, unsafe_code)]
#![warn(clippy::unimplemented, clippy::redundant_type_annotations)]

use anyhow::Result;
use std::io::{BufRead, Write};

pub mod algo;
pub mod core;
pub mod data;

/// Runs the given solver on the instance read from reader and writes the solution to writer.
/// Returns the cost of the solution.
///
/// # Errors
/// - If the instance could not be read from the reader.
/// - If the solver rejects the instance or it has no feasible schedule.
/// - If the solution could not be written.
///
/// # Panics
///  - If the schedule is invalid in debug mode.
pub fn run_reader(
    solver: &mut dyn core::Solver,
    reader: &data::InstanceReader,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<core::Cost> {
    let instance = reader.read(input)?;
    let schedule = solver.solve(&instance)?;

    debug_assert!(schedule.verify(), "Schedule is invalid: {schedule:?}");

    data::write_solution(output, schedule.batches())?;
    Ok(schedule.cost())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::algo::DynamicProgramming;
    use crate::core::SolveError;

    #[test]
    fn reader_should_be_solved() -> Result<()> {
        let mut input = "3\n0 0\n0 2\n6 9\n2\n1 2\n5 3\n".as_bytes();
        let mut output = Vec::new();
        let reader = data::InstanceReader::default();

        let cost = run_reader(&mut DynamicProgramming, &reader, &mut input, &mut output)?;

        assert_eq!(cost, 2);
        assert_eq!(String::from_utf8(output)?, "2\n0 0 1 2\n7 0 3\n");
        Ok(())
    }

    #[test]
    fn infeasible_reader_should_fail() {
        let mut input = "1\n0 2\n0\n".as_bytes();
        let mut output = Vec::new();
        let reader = data::InstanceReader::default();

        let result = run_reader(&mut DynamicProgramming, &reader, &mut input, &mut output);

        let Err(error) = result else {
            panic!("Instance should be infeasible");
        };
        assert!(matches!(
            error.downcast_ref::<SolveError>(),
            Some(SolveError::Infeasible(_))
        ));
        assert!(output.is_empty());
    }
}
