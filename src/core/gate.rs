use crate::error::GateError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Verdict text extracted from the reviewer response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewVerdict {
    Present(String),
    /// The response did not carry a verdict at the expected location.
    Absent,
}

impl ReviewVerdict {
    pub fn text(&self) -> Option<&str> {
        match self {
            ReviewVerdict::Present(text) => Some(text),
            ReviewVerdict::Absent => None,
        }
    }
}

/// What to do when the reviewer produced nothing to judge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum AbsentVerdictPolicy {
    #[default]
    FailOpen,
    FailClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    Pass,
    Fail,
    NoChanges,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionBasis {
    NoDiff,
    Violations(usize),
    Compliant,
    EmptyVerdict,
    AbsentVerdict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateResult {
    pub outcome: GateOutcome,
    pub basis: DecisionBasis,
}

impl GateResult {
    pub fn no_changes() -> Self {
        Self {
            outcome: GateOutcome::NoChanges,
            basis: DecisionBasis::NoDiff,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.outcome {
            GateOutcome::Fail => 1,
            GateOutcome::Pass | GateOutcome::NoChanges => 0,
        }
    }

    /// Operator-facing summary line.
    pub fn message(&self) -> String {
        match self.basis {
            DecisionBasis::NoDiff => "⚠️ No hay cambios staged para validar.".to_string(),
            DecisionBasis::Violations(count) => format!(
                "❌ Se encontraron {count} incumplimiento(s). Revisa checkcommit_report.md para más detalles."
            ),
            DecisionBasis::Compliant => "✅ Checklist cumplido. Puedes hacer commit.".to_string(),
            DecisionBasis::EmptyVerdict | DecisionBasis::AbsentVerdict => {
                if self.outcome == GateOutcome::Fail {
                    "❌ El revisor no devolvió un veredicto. Se bloquea el commit.".to_string()
                } else {
                    "No se detectaron cambios en el código. Puedes hacer commit.".to_string()
                }
            }
        }
    }
}

/// Turns the reviewer verdict into a gate result.
///
/// Any occurrence of `marker` fails the gate. An absent or blank verdict
/// follows `policy`.
pub fn decide(verdict: &ReviewVerdict, marker: &str, policy: AbsentVerdictPolicy) -> GateResult {
    let basis = match verdict.text() {
        None => DecisionBasis::AbsentVerdict,
        Some(text) if text.trim().is_empty() => DecisionBasis::EmptyVerdict,
        Some(text) if !marker.is_empty() && text.contains(marker) => {
            let count = text.lines().filter(|line| line.contains(marker)).count();
            DecisionBasis::Violations(count)
        }
        Some(_) => DecisionBasis::Compliant,
    };

    let outcome = match basis {
        DecisionBasis::NoDiff => GateOutcome::NoChanges,
        DecisionBasis::Violations(_) => GateOutcome::Fail,
        DecisionBasis::Compliant => GateOutcome::Pass,
        DecisionBasis::EmptyVerdict | DecisionBasis::AbsentVerdict => match policy {
            AbsentVerdictPolicy::FailOpen => GateOutcome::Pass,
            AbsentVerdictPolicy::FailClosed => GateOutcome::Fail,
        },
    };

    GateResult { outcome, basis }
}

/// Overwrites the report with the verdict text. An absent verdict leaves an
/// empty report behind.
pub fn persist_report(path: &Path, verdict: &ReviewVerdict) -> Result<(), GateError> {
    let content = verdict.text().unwrap_or_default();
    std::fs::write(path, content).map_err(|source| GateError::Persistence {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn present(text: &str) -> ReviewVerdict {
        ReviewVerdict::Present(text.to_string())
    }

    #[test]
    fn marker_fails_the_gate() {
        let verdict = present("##Archivo: foo.cs\n✖ Falta encabezado de licencia\n✖ Falta XML doc\n---");
        let result = decide(&verdict, "✖", AbsentVerdictPolicy::FailOpen);
        assert_eq!(result.outcome, GateOutcome::Fail);
        assert_eq!(result.basis, DecisionBasis::Violations(2));
        assert_eq!(result.exit_code(), 1);
    }

    #[test]
    fn verdict_without_marker_passes() {
        let result = decide(&present("Ortografía correcta."), "✖", AbsentVerdictPolicy::FailOpen);
        assert_eq!(result.outcome, GateOutcome::Pass);
        assert_eq!(result.basis, DecisionBasis::Compliant);
        assert_eq!(result.exit_code(), 0);
    }

    #[test]
    fn absent_and_empty_are_distinct_but_pass_when_fail_open() {
        let absent = decide(&ReviewVerdict::Absent, "✖", AbsentVerdictPolicy::FailOpen);
        let empty = decide(&present("  \n"), "✖", AbsentVerdictPolicy::FailOpen);
        assert_eq!(absent.basis, DecisionBasis::AbsentVerdict);
        assert_eq!(empty.basis, DecisionBasis::EmptyVerdict);
        assert_eq!(absent.exit_code(), 0);
        assert_eq!(empty.exit_code(), 0);
    }

    #[test]
    fn fail_closed_blocks_missing_verdicts() {
        let absent = decide(&ReviewVerdict::Absent, "✖", AbsentVerdictPolicy::FailClosed);
        let empty = decide(&present(""), "✖", AbsentVerdictPolicy::FailClosed);
        assert_eq!(absent.outcome, GateOutcome::Fail);
        assert_eq!(empty.outcome, GateOutcome::Fail);
        assert!(absent.message().contains("Se bloquea"));
    }

    #[test]
    fn no_changes_exits_zero() {
        let result = GateResult::no_changes();
        assert_eq!(result.outcome, GateOutcome::NoChanges);
        assert_eq!(result.exit_code(), 0);
    }

    #[test]
    fn report_is_overwritten_with_verdict() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("checkcommit_report.md");
        std::fs::write(&path, "old report").unwrap();

        persist_report(&path, &present("✖ nuevo")).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "✖ nuevo");

        persist_report(&path, &ReviewVerdict::Absent).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn unwritable_report_is_persistence_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing-dir").join("report.md");
        let err = persist_report(&path, &present("ok")).unwrap_err();
        assert!(matches!(err, GateError::Persistence { .. }));
    }
}
