mod batch;
mod job;
mod recognition;
mod slip;

pub use batch::*;
pub use job::*;
pub use recognition::*;
pub use slip::*;
