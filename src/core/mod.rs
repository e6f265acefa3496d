pub mod classifier;
pub mod gate;
pub mod git;
pub mod pipeline;
pub mod project;
pub mod prompt;

pub use gate::AbsentVerdictPolicy;
pub use git::{create_diff_source, DiffBackend};
pub use pipeline::{CommitGate, GateRun};
pub use project::{GatePaths, ProjectType};
