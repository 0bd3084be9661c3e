//! Job lifecycle: submission, recognition, extraction and lookup.

mod orchestrator;
mod status;

pub use orchestrator::JobOrchestrator;
pub use status::JobStatusView;
