//! Per-source outcomes of an ingestion cycle.

use std::fmt;

use serde::Serialize;

/// Where in the per-source sequence a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Fetch,
    Summarize,
    Store,
}

impl Stage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Fetch => "fetch",
            Stage::Summarize => "summarize",
            Stage::Store => "store",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure taxonomy. A duplicate title is not a failure; it is counted by
/// [`SourceOutcome::SkippedDuplicate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Transport error or non-2xx status while retrieving a page.
    Fetch,
    /// Page retrieved but the expected fields were not found.
    Parse,
    /// The generator refused the content.
    SafetyBlocked,
    /// The conditional insert failed.
    Store,
    /// A request or the whole per-source sequence ran out of time.
    Timeout,
    /// The generator answered with something unusable.
    Provider,
    /// There was nothing to send to the generator.
    NoInput,
}

impl FailureKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::Fetch => "fetch",
            FailureKind::Parse => "parse",
            FailureKind::SafetyBlocked => "safety_blocked",
            FailureKind::Store => "store",
            FailureKind::Timeout => "timeout",
            FailureKind::Provider => "provider",
            FailureKind::NoInput => "no_input",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFailure {
    /// Source slug.
    pub source: String,
    pub stage: Stage,
    pub kind: FailureKind,
    pub message: String,
}

/// What happened to one source in one cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceOutcome {
    Inserted {
        source: String,
        title: String,
        id: i64,
    },
    SkippedDuplicate {
        source: String,
        title: String,
    },
    /// Fetched and summarized; the write was skipped on request.
    DryRun {
        source: String,
        title: String,
    },
    Failed(SourceFailure),
}

impl SourceOutcome {
    #[must_use]
    pub fn source(&self) -> &str {
        match self {
            SourceOutcome::Inserted { source, .. }
            | SourceOutcome::SkippedDuplicate { source, .. }
            | SourceOutcome::DryRun { source, .. } => source,
            SourceOutcome::Failed(failure) => &failure.source,
        }
    }

    /// Status label, as stored in `pipeline_run_sources.outcome`.
    #[must_use]
    pub fn status(&self) -> &'static str {
        match self {
            SourceOutcome::Inserted { .. } => "inserted",
            SourceOutcome::SkippedDuplicate { .. } => "skipped_duplicate",
            SourceOutcome::DryRun { .. } => "dry_run",
            SourceOutcome::Failed(_) => "failed",
        }
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        match self {
            SourceOutcome::Inserted { title, .. }
            | SourceOutcome::SkippedDuplicate { title, .. }
            | SourceOutcome::DryRun { title, .. } => Some(title),
            SourceOutcome::Failed(_) => None,
        }
    }
}

/// Summary of one ingestion cycle. Outcomes are ordered by source slug.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub inserted: usize,
    pub skipped_duplicate: usize,
    pub dry_run: usize,
    pub failed: usize,
    pub outcomes: Vec<SourceOutcome>,
}

impl CycleReport {
    #[must_use]
    pub fn from_outcomes(mut outcomes: Vec<SourceOutcome>) -> Self {
        outcomes.sort_by(|a, b| a.source().cmp(b.source()));

        let mut report = CycleReport::default();
        for outcome in &outcomes {
            match outcome {
                SourceOutcome::Inserted { .. } => report.inserted += 1,
                SourceOutcome::SkippedDuplicate { .. } => report.skipped_duplicate += 1,
                SourceOutcome::DryRun { .. } => report.dry_run += 1,
                SourceOutcome::Failed(_) => report.failed += 1,
            }
        }
        report.outcomes = outcomes;
        report
    }

    pub fn failures(&self) -> impl Iterator<Item = &SourceFailure> {
        self.outcomes.iter().filter_map(|o| match o {
            SourceOutcome::Failed(failure) => Some(failure),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed(source: &str) -> SourceOutcome {
        SourceOutcome::Failed(SourceFailure {
            source: source.to_string(),
            stage: Stage::Fetch,
            kind: FailureKind::Fetch,
            message: "boom".to_string(),
        })
    }

    #[test]
    fn counters_are_distinct() {
        let report = CycleReport::from_outcomes(vec![
            SourceOutcome::SkippedDuplicate {
                source: "b".into(),
                title: "T".into(),
            },
            failed("c"),
            SourceOutcome::Inserted {
                source: "a".into(),
                title: "U".into(),
                id: 1,
            },
        ]);
        assert_eq!(report.inserted, 1);
        assert_eq!(report.skipped_duplicate, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.dry_run, 0);

        let order: Vec<&str> = report.outcomes.iter().map(SourceOutcome::source).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
        assert_eq!(report.failures().count(), 1);
    }

    #[test]
    fn failed_outcome_serializes_flat() {
        let json = serde_json::to_value(failed("rappler-agriculture")).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["source"], "rappler-agriculture");
        assert_eq!(json["stage"], "fetch");
        assert_eq!(json["kind"], "fetch");
    }

    #[test]
    fn failure_kind_labels_match_serde() {
        let kind = FailureKind::SafetyBlocked;
        assert_eq!(serde_json::to_value(kind).unwrap(), kind.as_str());
    }
}
