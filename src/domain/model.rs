use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSource {
    pub label: String,
    pub url: String,
    /// 覆寫預設的每源條目上限 (較慢或較深度的信源通常取較少)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_entries: Option<usize>,
}

impl FeedSource {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
            max_entries: None,
        }
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = Some(max_entries);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    pub summary: String,
    pub link: String,
    pub published: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceStatus {
    Collected(usize),
    Empty,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceOutcome {
    pub label: String,
    pub status: SourceStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregatedReport {
    pub text: String,
    pub sources: Vec<SourceOutcome>,
}

impl AggregatedReport {
    pub fn is_empty(&self) -> bool {
        self.entry_count() == 0
    }

    pub fn entry_count(&self) -> usize {
        self.sources
            .iter()
            .map(|s| match s.status {
                SourceStatus::Collected(n) => n,
                _ => 0,
            })
            .sum()
    }

    pub fn failed_sources(&self) -> usize {
        self.sources
            .iter()
            .filter(|s| matches!(s.status, SourceStatus::Failed(_)))
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DegradeReason {
    NoFeedContent,
    MissingCredential,
    SummarizerFailed(String),
}

impl fmt::Display for DegradeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegradeReason::NoFeedContent => write!(f, "no feed produced any entries"),
            DegradeReason::MissingCredential => write!(f, "API credential is missing"),
            DegradeReason::SummarizerFailed(message) => {
                write!(f, "summarization failed: {}", message)
            }
        }
    }
}

/// 模型回傳的 Markdown，或附帶降級原因的佔位文字
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Briefing {
    pub markdown: String,
    pub degraded: Option<DegradeReason>,
}

impl Briefing {
    pub fn generated(markdown: impl Into<String>) -> Self {
        Self {
            markdown: markdown.into(),
            degraded: None,
        }
    }

    pub fn placeholder(text: impl Into<String>, reason: DegradeReason) -> Self {
        Self {
            markdown: text.into(),
            degraded: Some(reason),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedPage {
    pub current_path: String,
    pub archive_path: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Fetching,
    Summarizing,
    Rendering,
    Done,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Fetching => "fetching",
            RunState::Summarizing => "summarizing",
            RunState::Rendering => "rendering",
            RunState::Done => "done",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub page: PublishedPage,
    pub degraded: Option<DegradeReason>,
    pub entries_collected: usize,
    pub sources_failed: usize,
    /// 本次執行經過的狀態，依序排列
    pub states: Vec<RunState>,
}

impl RunOutcome {
    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }
}
