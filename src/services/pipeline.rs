//! One scrape-and-deliver pass over all configured sources.
//!
//! A run moves through `Fetching → Extracting → Filtering → Dispatching` and
//! back to `Idle`. Source failures only remove that source from the run.
//! Dedup store failures abort the run before anything else is sent.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use teloxide::types::Recipient;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::bot::delivery::Delivery;
use crate::bot::parse_recipient;
use crate::config::Config;
use crate::database::dedup::DedupStore;
use crate::error::{PipelineError, SourceError};
use crate::scrapers::fetcher::PageSource;
use crate::scrapers::{Article, SourceConfig, SourceKind};
use crate::utils::logging::{
    log_dispatch, log_run_aborted, log_run_finished, log_run_start, log_source_extracted,
    log_source_failure,
};
use crate::utils::text::strip_tracking;

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunPhase {
    Idle,
    Fetching,
    Extracting,
    Filtering,
    Dispatching,
}

/// Settings the orchestrator needs, taken from [`Config`] at startup.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub sources: Vec<SourceConfig>,
    pub audience: Recipient,
    pub max_text_length: usize,
    pub max_posts_per_run: Option<usize>,
    pub send_delay: Duration,
    pub html_dir: Option<PathBuf>,
}

impl PipelineConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            sources: config.sources.clone(),
            audience: parse_recipient(&config.channel_id),
            max_text_length: config.max_text_length,
            max_posts_per_run: config.max_posts_per_check,
            send_delay: config.send_delay,
            html_dir: config.html_dir.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SourceStatus {
    Extracted { articles: usize, skipped: usize },
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceReport {
    pub source: SourceKind,
    pub url: String,
    #[serde(flatten)]
    pub status: SourceStatus,
}

/// What a finished run did.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub sources: Vec<SourceReport>,
    /// Articles extracted across all sources.
    pub extracted: usize,
    /// Listing items dropped for missing fields.
    pub skipped: usize,
    /// Articles not in the dedup store.
    pub new: usize,
    pub dispatched: Vec<String>,
    pub failed: Vec<String>,
    /// New articles left for the next run by the per-run cap.
    pub held_back: usize,
}

impl RunReport {
    pub fn failed_sources(&self) -> usize {
        self.sources
            .iter()
            .filter(|s| matches!(s.status, SourceStatus::Failed { .. }))
            .count()
    }
}

pub struct Pipeline {
    config: PipelineConfig,
    fetcher: Arc<dyn PageSource>,
    store: Arc<dyn DedupStore>,
    delivery: Arc<dyn Delivery>,
    phase: watch::Sender<RunPhase>,
}

impl Pipeline {
    pub fn new(
        config: PipelineConfig,
        fetcher: Arc<dyn PageSource>,
        store: Arc<dyn DedupStore>,
        delivery: Arc<dyn Delivery>,
    ) -> Self {
        let (phase, _) = watch::channel(RunPhase::Idle);
        Self {
            config,
            fetcher,
            store,
            delivery,
            phase,
        }
    }

    pub fn phase(&self) -> RunPhase {
        *self.phase.borrow()
    }

    /// Receiver notified on every phase change.
    pub fn subscribe_phase(&self) -> watch::Receiver<RunPhase> {
        self.phase.subscribe()
    }

    pub fn store(&self) -> &Arc<dyn DedupStore> {
        &self.store
    }

    pub async fn run(&self) -> Result<RunReport, PipelineError> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        log_run_start(&run_id.to_string(), self.config.sources.len());

        let result = self.run_phases(run_id, started_at).await;
        self.enter(RunPhase::Idle);

        match &result {
            Ok(report) => log_run_finished(
                &run_id.to_string(),
                report.extracted,
                report.new,
                report.dispatched.len(),
                report.failed.len(),
            ),
            Err(e) => log_run_aborted(&run_id.to_string(), &e.to_string()),
        }
        result
    }

    async fn run_phases(&self, run_id: Uuid, started_at: DateTime<Utc>) -> Result<RunReport, PipelineError> {
        self.enter(RunPhase::Fetching);
        let fetcher = &self.fetcher;
        let pages = join_all(self.config.sources.iter().map(|source| async move {
            (source, fetcher.fetch(&source.url).await)
        }))
        .await;

        self.enter(RunPhase::Extracting);
        let mut sources = Vec::with_capacity(pages.len());
        let mut candidates = Vec::new();
        let mut skipped = 0;
        for (index, (source, page)) in pages.into_iter().enumerate() {
            let outcome = match page {
                Ok(html) => {
                    self.save_snapshot(index, source, &html).await;
                    source
                        .kind
                        .extract(&html, &source.url, self.config.max_text_length)
                        .map_err(SourceError::from)
                }
                Err(e) => Err(SourceError::from(e)),
            };
            let status = match outcome {
                Ok(extraction) => {
                    log_source_extracted(
                        source.kind.tag(),
                        &source.url,
                        extraction.articles.len(),
                        extraction.skipped,
                    );
                    skipped += extraction.skipped;
                    let status = SourceStatus::Extracted {
                        articles: extraction.articles.len(),
                        skipped: extraction.skipped,
                    };
                    candidates.extend(extraction.articles);
                    status
                }
                Err(e) => {
                    log_source_failure(source.kind.tag(), &source.url, &e.to_string());
                    SourceStatus::Failed { error: e.to_string() }
                }
            };
            sources.push(SourceReport {
                source: source.kind,
                url: source.url.clone(),
                status,
            });
        }
        let extracted = candidates.len();

        self.enter(RunPhase::Filtering);
        let mut fresh = self.filter_new(candidates).await?;
        // Oldest first so the channel reads chronologically; undated items lead.
        fresh.sort_by_key(|a| a.published_at);
        let new = fresh.len();
        let held_back = match self.config.max_posts_per_run {
            Some(cap) if fresh.len() > cap => {
                fresh.truncate(cap);
                new - cap
            }
            _ => 0,
        };
        if held_back > 0 {
            info!("{} new article(s) held back until the next run", held_back);
        }
        let mut ready = Vec::with_capacity(fresh.len());
        for article in fresh {
            ready.push(self.complete(article).await);
        }

        self.enter(RunPhase::Dispatching);
        let mut dispatched = Vec::new();
        let mut failed = Vec::new();
        let mut attempted = false;
        for article in &ready {
            // Another run may have delivered it since filtering.
            if self.store.has_seen(&article.id).await? {
                debug!("{} was delivered meanwhile, skipping", article.id);
                continue;
            }
            // Spaces every send attempt, failed ones included.
            if attempted && !self.config.send_delay.is_zero() {
                tokio::time::sleep(self.config.send_delay).await;
            }
            attempted = true;
            match self.delivery.deliver(&self.config.audience, article).await {
                Ok(()) => {
                    log_dispatch(&article.id, &article.title, None);
                    self.store.mark_seen(&article.id, Utc::now()).await?;
                    dispatched.push(article.id.clone());
                }
                Err(e) => {
                    log_dispatch(&article.id, &article.title, Some(&e.to_string()));
                    failed.push(article.id.clone());
                }
            }
        }

        Ok(RunReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            sources,
            extracted,
            skipped,
            new,
            dispatched,
            failed,
            held_back,
        })
    }

    /// Drops articles already delivered and repeats within this run.
    async fn filter_new(&self, candidates: Vec<Article>) -> Result<Vec<Article>, PipelineError> {
        let mut in_run = HashSet::new();
        let mut fresh = Vec::new();
        for article in candidates {
            if !in_run.insert(article.id.clone()) {
                continue;
            }
            if self.store.has_seen(&article.id).await? {
                debug!("{} already delivered, filtered out", article.id);
                continue;
            }
            fresh.push(article);
        }
        Ok(fresh)
    }

    /// Adds article-page data for sources whose listings are incomplete.
    async fn complete(&self, article: Article) -> Article {
        if !article.source.needs_detail() {
            return article;
        }
        let url = strip_tracking(&article.url).to_string();
        let html = match self.fetcher.fetch(&url).await {
            Ok(html) => html,
            Err(e) => {
                warn!("Could not fetch article page for {}: {}", article.id, e);
                return article;
            }
        };
        match article.source.extract_detail(&html, self.config.max_text_length) {
            Ok(detail) => {
                if detail.body.is_none() {
                    warn!("No body found on article page for {}", article.id);
                }
                article.with_detail(detail)
            }
            Err(e) => {
                warn!("Could not extract article page for {}: {}", article.id, e);
                article
            }
        }
    }

    /// Writes `<position>-<source>.html`, one file per configured source.
    async fn save_snapshot(&self, index: usize, source: &SourceConfig, html: &str) {
        let Some(dir) = &self.config.html_dir else {
            return;
        };
        if let Err(e) = tokio::fs::create_dir_all(dir).await {
            warn!("Could not create HTML directory {}: {}", dir.display(), e);
            return;
        }
        let path = dir.join(format!("{:02}-{}.html", index, source.kind.tag()));
        match tokio::fs::write(&path, html).await {
            Ok(()) => debug!("Saved {} listing to {}", source.kind, path.display()),
            Err(e) => warn!("Could not save HTML to {}: {}", path.display(), e),
        }
    }

    fn enter(&self, phase: RunPhase) {
        self.phase.send_replace(phase);
        debug!("PHASE: {:?}", phase);
    }
}
