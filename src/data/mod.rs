mod format;
mod run;

pub use format::*;
pub use run::*;
