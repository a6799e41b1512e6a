use crate::core::Job;

/// Common time window of a run of jobs.
/// The run can be grown one job at a time, in any direction.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RunWindow {
    max_release: i64,
    min_deadline: i64,
    len: usize,
}

impl RunWindow {
    /// Creates the window of a run holding a single job.
    #[must_use]
    pub const fn new(job: &Job) -> Self {
        Self {
            max_release: job.release,
            min_deadline: job.deadline,
            len: 1,
        }
    }

    /// Adds a job to the run.
    pub fn extend(&mut self, job: &Job) {
        self.max_release = self.max_release.max(job.release);
        self.min_deadline = self.min_deadline.min(job.deadline);
        self.len += 1;
    }

    /// Returns whether some instant lies within the window of every job.
    #[must_use]
    pub const fn is_feasible(&self) -> bool {
        self.max_release <= self.min_deadline
    }

    /// Returns the start time of the batch formed by the run,
    /// or `None` if the run is infeasible.
    ///
    /// A run of several jobs starts as soon as all of them are released.
    /// A single job with a non-degenerate window starts one unit after its release,
    /// but never after its deadline.
    #[must_use]
    pub fn start(&self) -> Option<i64> {
        if !self.is_feasible() {
            return None;
        }

        if self.len > 1 {
            return Some(self.max_release);
        }

        let (release, deadline) = (self.max_release, self.min_deadline);
        if release == deadline {
            Some(release)
        } else {
            Some(deadline.min(release + 1))
        }
    }
}

/// Returns the start time of the batch formed by the given run of jobs,
/// or `None` if the run is empty or no instant fits every job.
#[must_use]
pub fn batch_start(run: &[Job]) -> Option<i64> {
    let (first, rest) = run.split_first()?;
    let mut window = RunWindow::new(first);
    for job in rest {
        window.extend(job);
    }
    window.start()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn degenerate_single_job_should_start_at_release() {
        assert_eq!(batch_start(&[Job::new(1, 4, 4)]), Some(4));
    }

    #[test]
    fn single_job_with_slack_should_start_one_unit_later() {
        assert_eq!(batch_start(&[Job::new(1, 3, 8)]), Some(4));
        assert_eq!(batch_start(&[Job::new(1, 3, 4)]), Some(4));
        assert_eq!(batch_start(&[Job::new(1, -2, 9)]), Some(-1));
    }

    #[test]
    fn run_should_start_at_latest_release() {
        let run = [Job::new(1, 0, 5), Job::new(2, 2, 6), Job::new(3, 3, 3)];
        assert_eq!(batch_start(&run), Some(3));
    }

    #[test]
    fn disjoint_windows_should_be_infeasible() {
        let run = [Job::new(1, 0, 1), Job::new(2, 2, 3)];
        assert_eq!(batch_start(&run), None);
    }

    #[test]
    fn touching_windows_should_be_feasible() {
        let run = [Job::new(1, 0, 2), Job::new(2, 2, 3)];
        assert_eq!(batch_start(&run), Some(2));
    }

    #[test]
    fn empty_run_should_have_no_start() {
        assert_eq!(batch_start(&[]), None);
    }

    #[test]
    fn window_should_track_extension() {
        let mut window = RunWindow::new(&Job::new(1, 5, 9));
        assert_eq!(window.start(), Some(6));

        window.extend(&Job::new(2, 1, 7));
        assert!(window.is_feasible());
        assert_eq!(window.start(), Some(5));

        window.extend(&Job::new(3, 0, 4));
        assert!(!window.is_feasible());
        assert_eq!(window.start(), None);
    }
}
