use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use agrinews_core::{normalize_title, ArticleDraft, LinkPick, SourcesFile};
use agrinews_db::DbError;
use agrinews_summarizer::Generation;
use async_trait::async_trait;

use super::*;

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

#[derive(Clone)]
enum Page {
    Article { title: String, body: String },
    Status(u16),
    Unparseable,
    Hang,
}

/// Serves one canned page per source name and tracks concurrency.
#[derive(Default)]
struct FakeSource {
    pages: HashMap<String, Page>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeSource {
    fn with(mut self, name: &str, page: Page) -> Self {
        self.pages.insert(name.to_string(), page);
        self
    }

    fn article(self, name: &str, title: &str, body: &str) -> Self {
        self.with(
            name,
            Page::Article {
                title: title.to_string(),
                body: body.to_string(),
            },
        )
    }
}

#[async_trait]
impl ArticleSource for FakeSource {
    async fn next_article(&self, source: &SourceConfig) -> Result<ArticleDraft, ScraperError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(10)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let url = source.listing_url.clone();
        match self.pages.get(&source.name).cloned() {
            Some(Page::Article { title, body }) => Ok(ArticleDraft {
                source_url: format!("{url}story"),
                title,
                body_text: body,
                image_url: None,
            }),
            Some(Page::Status(status)) => Err(ScraperError::UnexpectedStatus { status, url }),
            Some(Page::Unparseable) | None => Err(ScraperError::Parse {
                url,
                reason: "no link at position 0 matching 'a.read-more'".to_string(),
            }),
            Some(Page::Hang) => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Err(ScraperError::Parse {
                    url,
                    reason: "unreachable".to_string(),
                })
            }
        }
    }
}

/// Summarizes by echoing the first body line; refuses bodies mentioning
/// "graphic violence".
#[derive(Default)]
struct FakeGenerator {
    calls: AtomicUsize,
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(&self, prompt: &str) -> Result<Generation, SummarizerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if prompt.contains("graphic violence") {
            return Ok(Generation::Blocked {
                reason: "SAFETY".to_string(),
            });
        }
        let body = prompt.rsplit("\n\n").next().unwrap_or_default();
        Ok(Generation::Text(format!("```\nInsight: {body}\n```")))
    }
}

/// In-memory `news` table with the same trimmed-title uniqueness.
#[derive(Default)]
struct MemoryWriter {
    rows: Mutex<HashMap<String, (i64, ArticleRecord)>>,
    fail_titles: HashSet<String>,
}

impl MemoryWriter {
    fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    fn get(&self, title: &str) -> Option<ArticleRecord> {
        self.rows.lock().unwrap().get(title).map(|(_, r)| r.clone())
    }
}

#[async_trait]
impl ArticleWriter for MemoryWriter {
    async fn insert_if_absent(&self, record: &ArticleRecord) -> Result<InsertOutcome, DbError> {
        let title = normalize_title(&record.title);
        if self.fail_titles.contains(&title) {
            return Err(DbError::NotFound);
        }
        let mut rows = self.rows.lock().unwrap();
        if rows.contains_key(&title) {
            return Ok(InsertOutcome::SkippedDuplicate);
        }
        let id = i64::try_from(rows.len()).unwrap() + 1;
        let mut stored = record.clone();
        stored.title.clone_from(&title);
        rows.insert(title, (id, stored));
        Ok(InsertOutcome::Inserted(id))
    }
}

fn source(name: &str) -> SourceConfig {
    SourceConfig {
        name: name.to_string(),
        listing_url: format!("https://{}.example/news/", name.to_lowercase().replace(' ', "-")),
        link: LinkPick::Nth {
            selector: "a.read-more".to_string(),
            index: 0,
        },
        title_selector: "h1".to_string(),
        body_selector: "article p".to_string(),
        image_selector: None,
        enabled: true,
    }
}

fn options() -> CycleOptions {
    CycleOptions {
        max_concurrent: 4,
        source_timeout: Duration::from_secs(5),
        dry_run: false,
    }
}

fn failure<'a>(report: &'a CycleReport, slug: &str) -> &'a SourceFailure {
    report
        .failures()
        .find(|f| f.source == slug)
        .unwrap_or_else(|| panic!("no failure recorded for {slug}: {report:?}"))
}

// ---------------------------------------------------------------------------
// Cycle behavior
// ---------------------------------------------------------------------------

#[tokio::test]
async fn every_source_inserted_on_clean_run() {
    let sources = vec![source("Alpha"), source("Beta")];
    let adapter = FakeSource::default()
        .article("Alpha", "Rice prices rise", "Rice went up.")
        .article("Beta", "Onion imports halted", "Onions held.");
    let writer = MemoryWriter::default();

    let report =
        run_ingestion_cycle(&sources, &adapter, &FakeGenerator::default(), &writer, &options())
            .await;

    assert_eq!(report.inserted, 2);
    assert_eq!(report.failed, 0);
    let stored = writer.get("Rice prices rise").unwrap();
    assert_eq!(stored.description, "Insight: Rice went up.");
    assert_eq!(stored.url, "https://alpha.example/news/story");
}

#[tokio::test]
async fn rerun_with_unchanged_sources_is_idempotent() {
    let sources = vec![source("Alpha"), source("Beta")];
    let adapter = FakeSource::default()
        .article("Alpha", "Rice prices rise", "Rice went up.")
        .article("Beta", "Onion imports halted", "Onions held.");
    let generator = FakeGenerator::default();
    let writer = MemoryWriter::default();

    let first = run_ingestion_cycle(&sources, &adapter, &generator, &writer, &options()).await;
    let second = run_ingestion_cycle(&sources, &adapter, &generator, &writer, &options()).await;

    assert_eq!(first.inserted, 2);
    assert_eq!(second.inserted, 0);
    assert_eq!(second.skipped_duplicate, 2);
    assert_eq!(second.failed, 0);
    assert_eq!(writer.len(), 2);
}

#[tokio::test]
async fn one_failing_source_does_not_affect_others() {
    let sources = vec![source("Alpha"), source("Beta"), source("Gamma")];
    let adapter = FakeSource::default()
        .with("Alpha", Page::Status(503))
        .with("Beta", Page::Unparseable)
        .article("Gamma", "Corn harvest up", "Corn yields improved.");
    let writer = MemoryWriter::default();

    let report =
        run_ingestion_cycle(&sources, &adapter, &FakeGenerator::default(), &writer, &options())
            .await;

    assert_eq!(report.inserted, 1);
    assert_eq!(report.failed, 2);

    let alpha = failure(&report, "alpha");
    assert_eq!(alpha.kind, FailureKind::Fetch);
    assert_eq!(alpha.stage, Stage::Fetch);
    assert!(alpha.message.contains("503"));

    let beta = failure(&report, "beta");
    assert_eq!(beta.kind, FailureKind::Parse);
    assert!(writer.get("Corn harvest up").is_some());
}

#[tokio::test]
async fn safety_block_is_attributed_to_its_source_only() {
    let sources = vec![source("Alpha"), source("Beta")];
    let adapter = FakeSource::default()
        .article("Alpha", "Field report", "Footage shows graphic violence.")
        .article("Beta", "Onion imports halted", "Onions held.");
    let writer = MemoryWriter::default();

    let report =
        run_ingestion_cycle(&sources, &adapter, &FakeGenerator::default(), &writer, &options())
            .await;

    assert_eq!(report.inserted, 1);
    assert_eq!(report.failed, 1);
    let alpha = failure(&report, "alpha");
    assert_eq!(alpha.kind, FailureKind::SafetyBlocked);
    assert_eq!(alpha.stage, Stage::Summarize);
    assert!(writer.get("Field report").is_none());
}

#[tokio::test]
async fn whitespace_title_variants_store_one_record() {
    let sources = vec![source("Alpha"), source("Beta")];
    let adapter = FakeSource::default()
        .article("Alpha", "  Rice prices rise \n", "First take.")
        .article("Beta", "Rice prices rise", "Second take.");
    let writer = MemoryWriter::default();

    let report =
        run_ingestion_cycle(&sources, &adapter, &FakeGenerator::default(), &writer, &options())
            .await;

    assert_eq!(report.inserted, 1);
    assert_eq!(report.skipped_duplicate, 1);
    assert_eq!(writer.len(), 1);
    assert!(writer.get("Rice prices rise").is_some());
    for outcome in &report.outcomes {
        assert_eq!(outcome.title(), Some("Rice prices rise"));
    }
}

#[tokio::test]
async fn slow_source_times_out_without_blocking_others() {
    let sources = vec![source("Alpha"), source("Beta")];
    let adapter = FakeSource::default()
        .with("Alpha", Page::Hang)
        .article("Beta", "Onion imports halted", "Onions held.");
    let writer = MemoryWriter::default();
    let opts = CycleOptions {
        source_timeout: Duration::from_millis(200),
        ..options()
    };

    let report =
        run_ingestion_cycle(&sources, &adapter, &FakeGenerator::default(), &writer, &opts).await;

    assert_eq!(report.inserted, 1);
    let alpha = failure(&report, "alpha");
    assert_eq!(alpha.kind, FailureKind::Timeout);
    assert_eq!(alpha.stage, Stage::Fetch);
}

#[tokio::test]
async fn store_failure_is_recorded_at_store_stage() {
    let sources = vec![source("Alpha")];
    let adapter = FakeSource::default().article("Alpha", "Rice prices rise", "Rice went up.");
    let writer = MemoryWriter {
        fail_titles: HashSet::from(["Rice prices rise".to_string()]),
        ..MemoryWriter::default()
    };

    let report =
        run_ingestion_cycle(&sources, &adapter, &FakeGenerator::default(), &writer, &options())
            .await;

    let alpha = failure(&report, "alpha");
    assert_eq!(alpha.kind, FailureKind::Store);
    assert_eq!(alpha.stage, Stage::Store);
}

#[tokio::test]
async fn dry_run_summarizes_but_writes_nothing() {
    let sources = vec![source("Alpha")];
    let adapter = FakeSource::default().article("Alpha", "Rice prices rise", "Rice went up.");
    let generator = FakeGenerator::default();
    let writer = MemoryWriter::default();
    let opts = CycleOptions {
        dry_run: true,
        ..options()
    };

    let report = run_ingestion_cycle(&sources, &adapter, &generator, &writer, &opts).await;

    assert_eq!(report.dry_run, 1);
    assert_eq!(report.inserted, 0);
    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    assert_eq!(writer.len(), 0);
}

#[tokio::test]
async fn disabled_sources_are_not_fetched() {
    let mut off = source("Beta");
    off.enabled = false;
    let sources = vec![source("Alpha"), off];
    let adapter = FakeSource::default()
        .article("Alpha", "Rice prices rise", "Rice went up.")
        .article("Beta", "Onion imports halted", "Onions held.");

    let report = run_ingestion_cycle(
        &sources,
        &adapter,
        &FakeGenerator::default(),
        &MemoryWriter::default(),
        &options(),
    )
    .await;

    assert_eq!(adapter.calls.load(Ordering::SeqCst), 1);
    assert_eq!(report.outcomes.len(), 1);
}

#[tokio::test]
async fn concurrency_stays_within_bound() {
    let names = ["A", "B", "C", "D", "E", "F"];
    let sources: Vec<SourceConfig> = names.iter().map(|n| source(n)).collect();
    let adapter = names.iter().fold(FakeSource::default(), |acc, n| {
        acc.article(n, &format!("Story {n}"), "Body.")
    });
    let opts = CycleOptions {
        max_concurrent: 2,
        ..options()
    };

    let report = run_ingestion_cycle(
        &sources,
        &adapter,
        &FakeGenerator::default(),
        &MemoryWriter::default(),
        &opts,
    )
    .await;

    assert_eq!(report.inserted, names.len());
    assert!(adapter.max_in_flight.load(Ordering::SeqCst) <= 2);
}

#[tokio::test]
async fn empty_source_list_yields_empty_report() {
    let report = run_ingestion_cycle(
        &[],
        &FakeSource::default(),
        &FakeGenerator::default(),
        &MemoryWriter::default(),
        &options(),
    )
    .await;
    assert_eq!(report, CycleReport::default());
}

// ---------------------------------------------------------------------------
// select_sources
// ---------------------------------------------------------------------------

fn sources_file() -> SourcesFile {
    let mut off = source("Beta");
    off.enabled = false;
    SourcesFile {
        sources: vec![source("Alpha"), off, source("Gamma")],
    }
}

#[test]
fn select_sources_without_filter_returns_enabled() {
    let picked = select_sources(&sources_file(), None).unwrap();
    let names: Vec<&str> = picked.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "Gamma"]);
}

#[test]
fn select_sources_by_slug() {
    let picked = select_sources(&sources_file(), Some("gamma")).unwrap();
    assert_eq!(picked.len(), 1);
    assert_eq!(picked[0].name, "Gamma");
}

#[test]
fn select_sources_rejects_unknown_and_disabled() {
    assert!(matches!(
        select_sources(&sources_file(), Some("delta")),
        Err(IngestError::UnknownSource(ref s)) if s == "delta"
    ));
    assert!(matches!(
        select_sources(&sources_file(), Some("beta")),
        Err(IngestError::SourceDisabled(_))
    ));
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[test]
fn summarizer_errors_map_to_failure_kinds() {
    assert_eq!(
        summarize_failure_kind(&SummarizerError::Provider("bad".into())),
        FailureKind::Provider
    );
    assert_eq!(
        summarize_failure_kind(&SummarizerError::EmptyResponse),
        FailureKind::Provider
    );
    assert_eq!(
        summarize_failure_kind(&SummarizerError::EmptyInput),
        FailureKind::NoInput
    );
    assert_eq!(
        summarize_failure_kind(&SummarizerError::SafetyBlocked {
            reason: "SAFETY".into()
        }),
        FailureKind::SafetyBlocked
    );
}

#[test]
fn scraper_errors_map_to_failure_kinds() {
    let status = ScraperError::UnexpectedStatus {
        status: 500,
        url: "https://x".into(),
    };
    assert_eq!(scrape_failure_kind(&status), FailureKind::Fetch);

    let selector = ScraperError::InvalidSelector {
        selector: "a[".into(),
        reason: "bad".into(),
    };
    assert_eq!(scrape_failure_kind(&selector), FailureKind::Parse);
}
