mod problem;
mod solution;

pub use problem::*;
pub use solution::*;

/// Solves instances of the batch scheduling problem.
pub trait Solver {
    /// Computes a schedule of the given instance.
    ///
    /// # Errors
    /// - If no partition of the jobs into feasible batches exists.
    /// - If the instance has more jobs than [`Solver::maximum_jobs`].
    fn solve<'a>(&mut self, instance: &'a Instance) -> Result<Schedule<'a>, SolveError>;

    /// Returns the maximum number of jobs the solver can handle.
    fn maximum_jobs(&self) -> usize {
        usize::MAX
    }

    /// Returns the name of the solver.
    fn name(&self) -> &str;
}
