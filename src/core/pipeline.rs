use crate::config::toml_config::DigestConfig;
use crate::core::collector::FeedCollector;
use crate::core::publisher::{PagePublisher, ARCHIVE_INDEX_FILE};
use crate::core::renderer::PageRenderer;
use crate::core::summarizer::ChatSummarizer;
use crate::domain::model::{
    AggregatedReport, Briefing, DegradeReason, FeedSource, PublishedPage,
};
use crate::domain::ports::{Clock, Pipeline, Storage, SystemClock};
use crate::utils::error::Result;
use chrono::{DateTime, FixedOffset};

pub struct DigestPipeline<S: Storage, K: Clock = SystemClock> {
    sources: Vec<FeedSource>,
    collector: FeedCollector,
    summarizer: ChatSummarizer,
    renderer: PageRenderer,
    publisher: PagePublisher<S>,
    clock: K,
}

impl<S: Storage> DigestPipeline<S, SystemClock> {
    pub fn new(config: &DigestConfig, storage: S, api_key: Option<String>) -> Result<Self> {
        Self::with_clock(config, storage, api_key, SystemClock)
    }
}

impl<S: Storage, K: Clock> DigestPipeline<S, K> {
    pub fn with_clock(
        config: &DigestConfig,
        storage: S,
        api_key: Option<String>,
        clock: K,
    ) -> Result<Self> {
        Ok(Self {
            sources: config.sources.clone(),
            collector: FeedCollector::new(&config.collect)?,
            summarizer: ChatSummarizer::new(&config.summarize, api_key)?,
            renderer: PageRenderer::new(config.render.clone()),
            publisher: PagePublisher::new(storage, config.publish.clone()),
            clock,
        })
    }

    async fn publish_archive(
        &self,
        briefing: &Briefing,
        now: &DateTime<FixedOffset>,
        link_index: bool,
    ) -> Result<Option<String>> {
        let archive_path = if self.publisher.archive_enabled() {
            // 歸檔頁與索引位於同一目錄
            let archive_href = link_index.then_some(ARCHIVE_INDEX_FILE);
            let archive_html = self.renderer.render(&briefing.markdown, now, archive_href);
            self.publisher
                .write_archive(now.date_naive(), &archive_html)
                .await?
        } else {
            None
        };

        if self.publisher.archive_index_enabled() {
            let dates: Vec<String> = self
                .publisher
                .archived_dates()
                .await?
                .iter()
                .map(|d| d.format("%Y-%m-%d").to_string())
                .collect();
            let index_html = self
                .renderer
                .render_archive_index(&dates, &self.publisher.current_href_from_archive());
            self.publisher.write_archive_index(&index_html).await?;
            tracing::debug!("Archive index lists {} pages", dates.len());
        }

        Ok(archive_path)
    }
}

#[async_trait::async_trait]
impl<S: Storage, K: Clock> Pipeline for DigestPipeline<S, K> {
    async fn collect(&self) -> Result<AggregatedReport> {
        Ok(self.collector.collect(&self.sources).await)
    }

    async fn summarize(&self, report: &AggregatedReport) -> Result<String> {
        let now = self.renderer.local_time(self.clock.now());
        self.summarizer.summarize(&report.text, &now).await
    }

    async fn publish(&self, briefing: &Briefing) -> Result<PublishedPage> {
        let now = self.renderer.local_time(self.clock.now());
        let index_href = self.publisher.archive_index_href();

        let html = self
            .renderer
            .render(&briefing.markdown, &now, index_href.as_deref());
        let current_path = self.publisher.write_current(&html).await?;

        // 目前頁面已寫出，歸檔失敗只記錄警告
        let archive_path = match self.publish_archive(briefing, &now, index_href.is_some()).await {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!("⚠️ Archive update failed, current page kept: {}", e);
                tracing::debug!("💡 {}", e.recovery_suggestion());
                None
            }
        };

        Ok(PublishedPage {
            current_path,
            archive_path,
        })
    }

    fn placeholder_text(&self, reason: &DegradeReason) -> &str {
        self.renderer.placeholder_text(reason)
    }
}
