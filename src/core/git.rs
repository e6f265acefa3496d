use crate::error::GateError;
use async_trait::async_trait;
use git2::{DiffFormat, ErrorCode, Repository};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

/// Source of the staged changes to validate.
#[async_trait]
pub trait DiffSource: Send + Sync {
    async fn staged_diff(&self) -> Result<String, GateError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DiffBackend {
    #[default]
    GitCli,
    Libgit2,
}

pub fn create_diff_source(backend: DiffBackend, repo_path: PathBuf) -> Box<dyn DiffSource> {
    match backend {
        DiffBackend::GitCli => Box::new(GitCommand::new(repo_path)),
        DiffBackend::Libgit2 => Box::new(GitIntegration::new(repo_path)),
    }
}

/// Runs `git diff --cached` in the repository directory.
///
/// Colour, external diff drivers and custom prefixes from the user's git
/// config are overridden so the output is a plain unified diff.
pub struct GitCommand {
    workdir: PathBuf,
}

impl GitCommand {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }
}

#[async_trait]
impl DiffSource for GitCommand {
    async fn staged_diff(&self) -> Result<String, GateError> {
        debug!("Running git diff --cached in {}", self.workdir.display());
        let output = Command::new("git")
            .args([
                "diff",
                "--cached",
                "--no-color",
                "--no-ext-diff",
                "--src-prefix=a/",
                "--dst-prefix=b/",
            ])
            .current_dir(&self.workdir)
            .output()
            .await
            .map_err(|e| GateError::Transport(format!("failed to run git: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GateError::Transport(format!(
                "git diff --cached exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Computes the staged diff in-process with libgit2.
pub struct GitIntegration {
    repo_path: PathBuf,
}

impl GitIntegration {
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self {
            repo_path: repo_path.into(),
        }
    }

    fn staged_patch(repo_path: &Path) -> Result<String, git2::Error> {
        let repo = Repository::discover(repo_path)?;
        // Before the first commit HEAD is unborn and everything staged is new.
        let head_tree = match repo.head() {
            Ok(head) => Some(head.peel_to_tree()?),
            Err(e) if e.code() == ErrorCode::UnbornBranch => None,
            Err(e) => return Err(e),
        };
        let index = repo.index()?;
        let diff = repo.diff_tree_to_index(head_tree.as_ref(), Some(&index), None)?;

        let mut diff_text = Vec::new();
        diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
            let origin = line.origin();
            if matches!(origin, '+' | '-' | ' ') {
                diff_text.push(origin as u8);
            }
            diff_text.extend_from_slice(line.content());
            true
        })?;

        Ok(String::from_utf8_lossy(&diff_text).into_owned())
    }
}

#[async_trait]
impl DiffSource for GitIntegration {
    async fn staged_diff(&self) -> Result<String, GateError> {
        let repo_path = self.repo_path.clone();
        tokio::task::spawn_blocking(move || GitIntegration::staged_patch(&repo_path))
            .await
            .map_err(|e| GateError::Transport(format!("libgit2 task failed: {e}")))?
            .map_err(|e| GateError::Transport(format!("libgit2 diff failed: {}", e.message())))
    }
}
