use crate::config::toml_config::PublishSettings;
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use chrono::NaiveDate;

pub const ARCHIVE_INDEX_FILE: &str = "index.html";

/// 寫入「目前」頁面與每日歸檔；同一天重跑只會覆寫當天的歸檔
pub struct PagePublisher<S: Storage> {
    storage: S,
    settings: PublishSettings,
}

impl<S: Storage> PagePublisher<S> {
    pub fn new(storage: S, settings: PublishSettings) -> Self {
        Self { storage, settings }
    }

    pub fn archive_enabled(&self) -> bool {
        self.settings.archive_dir.is_some()
    }

    pub fn archive_index_enabled(&self) -> bool {
        self.archive_enabled() && self.settings.archive_index
    }

    /// 目前頁面指向歸檔索引的相對連結
    pub fn archive_index_href(&self) -> Option<String> {
        if !self.archive_index_enabled() {
            return None;
        }
        self.settings
            .archive_dir
            .as_ref()
            .map(|dir| format!("{}/{}", dir, ARCHIVE_INDEX_FILE))
    }

    /// 歸檔索引指回目前頁面的相對連結
    pub fn current_href_from_archive(&self) -> String {
        format!("../{}", self.settings.current_file)
    }

    pub async fn write_current(&self, html: &str) -> Result<String> {
        tracing::debug!("Writing {} ({} bytes)", self.settings.current_file, html.len());
        self.storage
            .write_file(&self.settings.current_file, html.as_bytes())
            .await?;
        Ok(self.storage.display_path(&self.settings.current_file))
    }

    pub async fn write_archive(&self, date: NaiveDate, html: &str) -> Result<Option<String>> {
        let Some(dir) = &self.settings.archive_dir else {
            return Ok(None);
        };

        let path = format!("{}/{}.html", dir, date.format("%Y-%m-%d"));
        tracing::debug!("Writing archive copy {}", path);
        self.storage.write_file(&path, html.as_bytes()).await?;
        Ok(Some(self.storage.display_path(&path)))
    }

    /// 已歸檔的日期，新到舊排序；忽略非日期命名的檔案
    pub async fn archived_dates(&self) -> Result<Vec<NaiveDate>> {
        let Some(dir) = &self.settings.archive_dir else {
            return Ok(Vec::new());
        };

        let mut dates: Vec<NaiveDate> = self
            .storage
            .list_files(dir)
            .await?
            .iter()
            .filter_map(|name| name.strip_suffix(".html"))
            .filter_map(|stem| NaiveDate::parse_from_str(stem, "%Y-%m-%d").ok())
            .collect();
        dates.sort_unstable_by(|a, b| b.cmp(a));
        Ok(dates)
    }

    pub async fn write_archive_index(&self, html: &str) -> Result<()> {
        let Some(dir) = &self.settings.archive_dir else {
            return Ok(());
        };
        let path = format!("{}/{}", dir, ARCHIVE_INDEX_FILE);
        self.storage.write_file(&path, html.as_bytes()).await
    }
}
