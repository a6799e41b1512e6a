mod dynamic;
mod exhaustive;
pub mod oracle;
mod reconstruct;

pub use dynamic::{Choice, DynamicProgramming, Entry, Table};
pub use exhaustive::{Exhaustive, MAXIMUM_JOBS};
pub use reconstruct::reconstruct;

use crate::core::Solver;

/// Constructors of every available solver.
#[allow(unsafe_code)]
#[linkme::distributed_slice]
pub static SOLVERS: [fn() -> Box<dyn Solver>];

