//! Command workflows shared by the binary

pub mod orchestration;

pub use orchestration::{
    plan_release, resolve_branch, run_release_workflow, ReleasePlan, ReleaseResult,
    ReleaseWorkflowArgs, WorkflowOutcome,
};
