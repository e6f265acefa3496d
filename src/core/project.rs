use std::convert::Infallible;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const CHECKLIST_FILE: &str = "checklist.md";
pub const REPORT_FILE: &str = "checkcommit_report.md";
pub const CONFIG_FILE: &str = ".checkcommit.yml";

/// Project flavour selecting the comment heuristic and the directory that
/// holds its checklist. Anything other than `dotnet` uses the web rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ProjectType {
    #[default]
    Dotnet,
    Web(String),
}

impl ProjectType {
    pub fn as_str(&self) -> &str {
        match self {
            ProjectType::Dotnet => "dotnet",
            ProjectType::Web(name) => name,
        }
    }

    /// Line prefixes treated as comment openers for this project type.
    pub fn comment_openers(&self) -> &'static [&'static str] {
        match self {
            ProjectType::Dotnet => &["//", "/*"],
            ProjectType::Web(_) => &["//", "/*", "<!--"],
        }
    }
}

impl FromStr for ProjectType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed == "dotnet" {
            Ok(ProjectType::Dotnet)
        } else {
            Ok(ProjectType::Web(trimmed.to_string()))
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Files read and written for one project type under the checklist root.
#[derive(Debug, Clone)]
pub struct GatePaths {
    pub base_dir: PathBuf,
    pub checklist: PathBuf,
    pub report: PathBuf,
}

impl GatePaths {
    pub fn resolve(root: impl AsRef<Path>, project_type: &ProjectType) -> Self {
        let base_dir = root.as_ref().join(project_type.as_str());
        Self {
            checklist: base_dir.join(CHECKLIST_FILE),
            report: base_dir.join(REPORT_FILE),
            base_dir,
        }
    }

    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join(CONFIG_FILE)
    }
}

/// Default checklist root: `~/checkcommit`, or `./checkcommit` when no home
/// directory can be determined.
pub fn default_root() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join("checkcommit"))
        .unwrap_or_else(|| PathBuf::from("checkcommit"))
}
