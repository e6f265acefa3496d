use crate::adapters::llm::{LLMAdapter, LLMRequest};
use crate::core::classifier::is_comment_only;
use crate::core::gate::{self, AbsentVerdictPolicy, GateResult, ReviewVerdict};
use crate::core::git::DiffSource;
use crate::core::project::{GatePaths, ProjectType};
use crate::core::prompt::PromptBuilder;
use crate::error::GateError;
use tracing::{info, warn};

/// Everything a finished run reports back to the caller.
#[derive(Debug)]
pub struct GateRun {
    pub result: GateResult,
    pub verdict: Option<ReviewVerdict>,
}

/// Runs the staged-diff review for one project type.
pub struct CommitGate<'a> {
    project_type: ProjectType,
    paths: GatePaths,
    marker: String,
    policy: AbsentVerdictPolicy,
    diff_source: &'a dyn DiffSource,
}

impl<'a> CommitGate<'a> {
    pub fn new(
        project_type: ProjectType,
        paths: GatePaths,
        marker: impl Into<String>,
        policy: AbsentVerdictPolicy,
        diff_source: &'a dyn DiffSource,
    ) -> Self {
        Self {
            project_type,
            paths,
            marker: marker.into(),
            policy,
            diff_source,
        }
    }

    /// Executes the gate. `make_adapter` is only called once the checklist is
    /// known to exist, and before the diff is read, so a missing API key
    /// aborts without touching the repository.
    pub async fn run<F>(&self, make_adapter: F) -> Result<GateRun, GateError>
    where
        F: FnOnce() -> Result<Box<dyn LLMAdapter>, GateError>,
    {
        if !self.paths.checklist.is_file() {
            return Err(GateError::Configuration(format!(
                "No se encontró el checklist en {}",
                self.paths.checklist.display()
            )));
        }

        let adapter = make_adapter()?;

        let checklist = std::fs::read_to_string(&self.paths.checklist).map_err(|e| {
            GateError::Configuration(format!(
                "No se pudo leer el checklist {}: {e}",
                self.paths.checklist.display()
            ))
        })?;

        let diff = self.diff_source.staged_diff().await?;
        if diff.trim().is_empty() {
            info!("No staged changes, skipping review");
            return Ok(GateRun {
                result: GateResult::no_changes(),
                verdict: None,
            });
        }

        let comment_only = is_comment_only(&diff, &self.project_type);
        info!(
            "Reviewing staged diff ({} bytes, comment_only={}) with {}",
            diff.len(),
            comment_only,
            adapter.model_name()
        );

        let prompt =
            PromptBuilder::new(self.marker.clone()).build_prompt(&checklist, &diff, comment_only);
        let verdict = match adapter.complete(LLMRequest { prompt }).await {
            Ok(response) => {
                info!("Verdict received from {}", response.model);
                ReviewVerdict::Present(response.content)
            }
            Err(err) if !err.is_fatal() => {
                warn!("{err}; treating verdict as absent");
                ReviewVerdict::Absent
            }
            Err(err) => return Err(err),
        };

        if let Err(err) = gate::persist_report(&self.paths.report, &verdict) {
            warn!("{err}");
        }

        let result = gate::decide(&verdict, &self.marker, self.policy);
        info!("Gate outcome: {:?} ({:?})", result.outcome, result.basis);

        Ok(GateRun {
            result,
            verdict: Some(verdict),
        })
    }
}
