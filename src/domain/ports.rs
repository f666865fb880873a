use crate::domain::model::{AggregatedReport, Briefing, DegradeReason, PublishedPage};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    /// 列出目錄下的檔名 (不含子目錄)；目錄不存在時回傳空陣列
    fn list_files(
        &self,
        dir: &str,
    ) -> impl std::future::Future<Output = Result<Vec<String>>> + Send;
    /// 將相對路徑轉為對外顯示的完整路徑
    fn display_path(&self, path: &str) -> String;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// 四個階段：收集 → 摘要 → 渲染並發布
#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn collect(&self) -> Result<AggregatedReport>;
    async fn summarize(&self, report: &AggregatedReport) -> Result<String>;
    async fn publish(&self, briefing: &Briefing) -> Result<PublishedPage>;
    /// 上游失敗時放入頁面的文字
    fn placeholder_text(&self, reason: &DegradeReason) -> &str;
}
