use crate::config::toml_config::CollectSettings;
use crate::domain::model::{AggregatedReport, FeedEntry, FeedSource, SourceOutcome, SourceStatus};
use crate::utils::error::{DigestError, Result};
use regex::Regex;
use reqwest::Client;
use std::fmt::Write;
use std::sync::LazyLock;
use std::time::Duration;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern is valid"));
static SPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// 依序抓取每個信源；單一信源失敗不會中斷整批
pub struct FeedCollector {
    client: Client,
    default_limit: usize,
    summary_chars: usize,
    timeout_seconds: u64,
}

impl FeedCollector {
    pub fn new(settings: &CollectSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            default_limit: settings.max_entries_per_source,
            summary_chars: settings.summary_chars,
            timeout_seconds: settings.timeout_seconds,
        })
    }

    pub async fn collect(&self, sources: &[FeedSource]) -> AggregatedReport {
        let mut report = AggregatedReport::default();

        for source in sources {
            tracing::info!("📡 Fetching {} ...", source.label);

            let status = match self.fetch_source(source).await {
                Ok(entries) if entries.is_empty() => {
                    tracing::warn!("⚠️ {} returned no entries, skipping", source.label);
                    SourceStatus::Empty
                }
                Ok(entries) => {
                    report.text.push_str(&format_source_block(&source.label, &entries));
                    tracing::info!("✅ {} collected {} entries", source.label, entries.len());
                    SourceStatus::Collected(entries.len())
                }
                Err(e) => {
                    tracing::warn!("❌ {} failed: {}", source.label, e);
                    tracing::debug!("💡 {}", e.recovery_suggestion());
                    SourceStatus::Failed(e.to_string())
                }
            };

            report.sources.push(SourceOutcome {
                label: source.label.clone(),
                status,
            });
        }

        tracing::info!(
            "Collected {} entries from {} sources ({} failed)",
            report.entry_count(),
            sources.len(),
            report.failed_sources()
        );
        report
    }

    pub async fn fetch_source(&self, source: &FeedSource) -> Result<Vec<FeedEntry>> {
        tracing::debug!("GET {}", source.url);
        let response = self
            .client
            .get(&source.url)
            .send()
            .await
            .map_err(|e| DigestError::from_request(&source.url, self.timeout_seconds, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DigestError::HttpStatusError {
                url: source.url.clone(),
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DigestError::from_request(&source.url, self.timeout_seconds, e))?;
        let feed = feed_rs::parser::parse(&bytes[..])?;

        let limit = source.max_entries.unwrap_or(self.default_limit);
        Ok(feed
            .entries
            .into_iter()
            .take(limit)
            .map(|entry| self.to_entry(entry))
            .collect())
    }

    fn to_entry(&self, entry: feed_rs::model::Entry) -> FeedEntry {
        let title = entry
            .title
            .map(|t| collapse_whitespace(&t.content))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "(untitled)".to_string());

        let link = entry
            .links
            .iter()
            .find(|l| l.rel.as_deref() != Some("self"))
            .or_else(|| entry.links.first())
            .map(|l| l.href.clone())
            .unwrap_or_default();

        let raw_summary = entry
            .summary
            .map(|s| s.content)
            .or_else(|| entry.content.and_then(|c| c.body))
            .unwrap_or_default();
        let summary = truncate_chars(&clean_summary(&raw_summary), self.summary_chars);

        FeedEntry {
            title,
            summary,
            link,
            published: entry.published.or(entry.updated),
        }
    }
}

pub fn format_source_block(label: &str, entries: &[FeedEntry]) -> String {
    let mut block = format!("\n【信源：{}】\n", label);
    for entry in entries {
        let _ = write!(block, "- {} ({})", entry.title, entry.link);
        if let Some(published) = entry.published {
            let _ = write!(block, " [{}]", published.format("%Y-%m-%d"));
        }
        block.push('\n');
        if !entry.summary.is_empty() {
            let _ = writeln!(block, "  {}", entry.summary);
        }
    }
    block
}

fn collapse_whitespace(text: &str) -> String {
    SPACE_RE.replace_all(text, " ").trim().to_string()
}

/// 移除 HTML 標籤與常見實體，並壓縮空白
pub fn clean_summary(raw: &str) -> String {
    let without_tags = TAG_RE.replace_all(raw, " ");
    let decoded = without_tags
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    collapse_whitespace(&decoded)
}

pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        return String::new();
    }
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_chars).collect();
    truncated.push('…');
    truncated
}
