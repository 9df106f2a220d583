/// Batch orchestration: keyword records in, rendered pages out.
///
/// Records are independent. Each one goes through content generation, meta
/// building and rendering; a record whose generation call fails is left out
/// of the result and listed in [`BatchOutcome::failures`]. Output order
/// always matches input order, whatever the concurrency.
use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::content::{generate_content, ContentGenerator};
use crate::meta::build_meta_tags;
use crate::model::{KeywordRecord, Location, PageResult};
use crate::render::{render_page, PageInput};
use crate::session::BatchJob;

/// Completed attempts out of the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }

    pub fn percent(&self) -> u32 {
        (self.fraction() * 100.0).round() as u32
    }
}

/// Receives one update after every attempted record, success or not.
pub trait ProgressSink: Send + Sync {
    fn record_done(&self, progress: Progress, keyword: &str, ok: bool);
}

/// Logs progress through `tracing`.
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn record_done(&self, progress: Progress, keyword: &str, ok: bool) {
        info!(
            keyword,
            ok,
            completed = progress.completed,
            total = progress.total,
            percent = progress.percent(),
            "page generation progress"
        );
    }
}

/// Sends every update to each inner sink, in order.
pub struct FanOut(pub Vec<Box<dyn ProgressSink>>);

impl ProgressSink for FanOut {
    fn record_done(&self, progress: Progress, keyword: &str, ok: bool) {
        for sink in &self.0 {
            sink.record_done(progress, keyword, ok);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFailure {
    pub index: usize,
    pub keyword: String,
    pub error: String,
}

#[derive(Debug)]
pub struct BatchOutcome {
    pub attempted: usize,
    pub pages: Vec<PageResult>,
    pub fallback_count: usize,
    pub failures: Vec<RecordFailure>,
}

/// Effective location of a record: its own fields, with empty ones filled
/// from `defaults` only when `use_defaults` is set.
pub fn resolve_location(record: &KeywordRecord, defaults: &Location, use_defaults: bool) -> Location {
    if use_defaults {
        record.location.or_defaults(defaults)
    } else {
        record.location.clone()
    }
}

pub struct BatchRunner<G> {
    generator: G,
    concurrency: usize,
}

enum RecordOutcome {
    Page { page: PageResult, fallback: bool },
    Failed(RecordFailure),
}

impl<G: ContentGenerator> BatchRunner<G> {
    /// Sequential runner, one record at a time.
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            concurrency: 1,
        }
    }

    /// At most `concurrency` records in flight; values below 1 mean 1.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub async fn run(&self, job: &BatchJob, progress: &dyn ProgressSink) -> BatchOutcome {
        let total = job.records.len();
        info!(total, concurrency = self.concurrency, "starting page generation");

        let mut outcome = BatchOutcome {
            attempted: 0,
            pages: Vec::with_capacity(total),
            fallback_count: 0,
            failures: Vec::new(),
        };

        let mut results = stream::iter(job.records.iter().cloned().enumerate())
            .map(|(index, record)| self.process(index, record, job))
            .buffered(self.concurrency);

        while let Some(result) = results.next().await {
            outcome.attempted += 1;
            let status = Progress {
                completed: outcome.attempted,
                total,
            };
            match result {
                RecordOutcome::Page { page, fallback } => {
                    progress.record_done(status, &page.keyword, true);
                    if fallback {
                        outcome.fallback_count += 1;
                    }
                    outcome.pages.push(page);
                }
                RecordOutcome::Failed(failure) => {
                    progress.record_done(status, &failure.keyword, false);
                    outcome.failures.push(failure);
                }
            }
        }

        info!(
            attempted = outcome.attempted,
            generated = outcome.pages.len(),
            failed = outcome.failures.len(),
            fallback = outcome.fallback_count,
            "page generation finished"
        );
        outcome
    }

    async fn process(&self, index: usize, record: KeywordRecord, job: &BatchJob) -> RecordOutcome {
        let location = resolve_location(
            &record,
            &job.settings.default_location,
            job.settings.use_default_location,
        );

        let copy = match generate_content(&self.generator, &record.keyword, &location).await {
            Ok(copy) => copy,
            Err(e) => {
                warn!(index, keyword = %record.keyword, error = %e, "content generation failed, skipping keyword");
                return RecordOutcome::Failed(RecordFailure {
                    index,
                    keyword: record.keyword,
                    error: e.to_string(),
                });
            }
        };

        let fallback = copy.is_fallback();
        let content = copy.into_content();
        let meta = build_meta_tags(&record.keyword, &location.city, &location.country, &content.intro);
        let html = render_page(
            &PageInput {
                keyword: &record.keyword,
                city: &location.city,
                country: &location.country,
                content: &content,
                meta: &meta,
            },
            &job.palette,
            job.settings.render,
        );

        RecordOutcome::Page {
            page: PageResult {
                keyword: record.keyword,
                city: location.city,
                country: location.country,
                html,
                content,
                meta,
            },
            fallback,
        }
    }
}
