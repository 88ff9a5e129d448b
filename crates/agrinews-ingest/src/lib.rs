//! Ingestion Orchestrator and aggregation jobs.
//!
//! [`run_ingestion_cycle`] drives every enabled source through
//! scrape → summarize → conditional insert and always returns a
//! [`CycleReport`]. [`produce_weekly_suggestion`] and
//! [`produce_demand_forecast`] derive one artifact each from stored data.
//! The `runs` module records each finished run in `pipeline_runs`, and
//! [`Pipeline`] wires the production clients from an `AppConfig`.

pub mod cycle;
pub mod error;
pub mod jobs;
pub mod pipeline;
pub mod report;
pub mod runs;
pub mod seams;

pub use cycle::{run_ingestion_cycle, select_sources, CycleOptions};
pub use error::IngestError;
pub use jobs::{parse_forecast, produce_demand_forecast, produce_weekly_suggestion};
pub use pipeline::Pipeline;
pub use report::{CycleReport, FailureKind, SourceFailure, SourceOutcome, Stage};
pub use runs::{IngestRun, Trigger};
pub use seams::{ArticleSource, ArticleWriter, InsightStore};
