use crate::core::prompt::DEFAULT_PROMPT_TEMPLATE;
use crate::domain::model::FeedSource;
use crate::utils::error::{DigestError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DigestConfig {
    pub sources: Vec<FeedSource>,
    pub collect: CollectSettings,
    pub summarize: SummarizeSettings,
    pub render: RenderSettings,
    pub publish: PublishSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectSettings {
    pub max_entries_per_source: usize,
    /// 摘要截斷長度 (字元數)，0 表示不輸出摘要
    pub summary_chars: usize,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizeSettings {
    pub api_base: String,
    pub model: String,
    pub api_key_env: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_seconds: u64,
    pub prompt_file: Option<String>,
    /// 由 prompt_file 載入，或使用內建模板
    #[serde(skip)]
    pub prompt_template: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub lang: String,
    pub page_title: String,
    pub heading: String,
    pub date_format: String,
    pub time_format: String,
    pub utc_offset_hours: i32,
    pub markdown_script_url: String,
    pub stylesheet_url: Option<String>,
    pub audio_url: Option<String>,
    /// 沒有任何信源內容時的頁面文字
    pub placeholder_text: String,
    /// 有內容但模型未產出摘要 (缺少金鑰或呼叫失敗) 時的頁面文字
    pub summary_failed_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishSettings {
    pub output_dir: String,
    pub current_file: String,
    /// None 表示不保留每日歸檔
    pub archive_dir: Option<String>,
    pub archive_index: bool,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            collect: CollectSettings::default(),
            summarize: SummarizeSettings::default(),
            render: RenderSettings::default(),
            publish: PublishSettings::default(),
        }
    }
}

impl Default for CollectSettings {
    fn default() -> Self {
        Self {
            max_entries_per_source: 4,
            summary_chars: 120,
            timeout_seconds: 15,
            user_agent: format!("news-digest/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for SummarizeSettings {
    fn default() -> Self {
        Self {
            api_base: "https://api.deepseek.com".to_string(),
            model: "deepseek-chat".to_string(),
            api_key_env: "LLM_API_KEY".to_string(),
            temperature: 0.7,
            max_tokens: 2000,
            timeout_seconds: 120,
            prompt_file: None,
            prompt_template: None,
        }
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            lang: "zh-CN".to_string(),
            page_title: "每日全览".to_string(),
            heading: "🗞️ 每日深度早报".to_string(),
            date_format: "%Y年%m月%d日".to_string(),
            time_format: "%H:%M".to_string(),
            utc_offset_hours: 8,
            markdown_script_url: "https://cdn.jsdelivr.net/npm/marked/marked.min.js".to_string(),
            stylesheet_url: None,
            audio_url: None,
            placeholder_text: "今日新闻抓取或生成失败，请检查运行日志。".to_string(),
            summary_failed_text: "AI 生成内容失败。".to_string(),
        }
    }
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self {
            output_dir: "./public".to_string(),
            current_file: "index.html".to_string(),
            archive_dir: Some("archive".to_string()),
            archive_index: true,
        }
    }
}

impl SummarizeSettings {
    pub fn prompt_template(&self) -> &str {
        self.prompt_template
            .as_deref()
            .unwrap_or(DEFAULT_PROMPT_TEMPLATE)
    }

    /// 從環境變數讀取 API 金鑰；空字串視為未設定
    pub fn api_key_from_env(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

fn default_sources() -> Vec<FeedSource> {
    vec![
        FeedSource::new("财经-联合早报(商业)", "https://www.zaobao.com.sg/rss/finance"),
        FeedSource::new(
            "财经-华尔街日报(中文)",
            "https://feeds.a.dj.com/rss/RSSWorldNews.xml",
        ),
        FeedSource::new("科技-36氪(前沿)", "https://36kr.com/feed"),
        FeedSource::new("科技-MIT科技评论", "https://www.technologyreview.com/feed/"),
        FeedSource::new("科技-V2EX(热议)", "https://www.v2ex.com/index.xml"),
        FeedSource::new(
            "综合-联合早报(国际)",
            "https://www.zaobao.com.sg/rss/realtime/world",
        ),
        FeedSource::new(
            "综合-半岛电视台(中文)",
            "https://chinese.aljazeera.net/xml/rss/all.xml",
        ),
        FeedSource::new(
            "娱乐-Yahoo Entertainment",
            "https://www.yahoo.com/entertainment/rss",
        ),
        FeedSource::new("生活-少数派", "https://sspai.com/feed"),
    ]
}

impl DigestConfig {
    /// 從 TOML 檔案載入配置，並讀入 prompt_file (相對於配置檔所在目錄)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(DigestError::IoError)?;
        let mut config = Self::from_toml_str(&content)?;

        if let Some(prompt_file) = config.summarize.prompt_file.clone() {
            let base = path.parent().unwrap_or_else(|| Path::new("."));
            config.load_prompt_file(base.join(prompt_file))?;
        }

        Ok(config)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| DigestError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    pub fn load_prompt_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let template = std::fs::read_to_string(path).map_err(|e| DigestError::ConfigError {
            message: format!("Cannot read prompt file {}: {}", path.display(), e),
        })?;
        self.summarize.prompt_template = Some(template);
        Ok(())
    }

    /// 替換環境變數 (例如 ${FEED_HOST})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").map_err(|e| {
            DigestError::ConfigError {
                message: format!("Invalid substitution pattern: {}", e),
            }
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        if self.sources.is_empty() {
            return Err(DigestError::MissingConfigError {
                field: "sources".to_string(),
            });
        }

        for source in &self.sources {
            validation::validate_non_empty_string("sources.label", &source.label)?;
            validation::validate_url("sources.url", &source.url)?;
            if let Some(max) = source.max_entries {
                validation::validate_positive_number("sources.max_entries", max, 1)?;
            }
        }
        validation::validate_unique(
            "sources.label",
            self.sources.iter().map(|s| s.label.as_str()),
        )?;

        validation::validate_positive_number(
            "collect.max_entries_per_source",
            self.collect.max_entries_per_source,
            1,
        )?;
        validation::validate_range("collect.timeout_seconds", self.collect.timeout_seconds, 1, 600)?;

        validation::validate_url("summarize.api_base", &self.summarize.api_base)?;
        validation::validate_non_empty_string("summarize.model", &self.summarize.model)?;
        validation::validate_non_empty_string("summarize.api_key_env", &self.summarize.api_key_env)?;
        validation::validate_finite("summarize.temperature", f64::from(self.summarize.temperature))?;
        validation::validate_range("summarize.temperature", self.summarize.temperature, 0.0, 2.0)?;
        validation::validate_range("summarize.max_tokens", self.summarize.max_tokens, 1, 65_536)?;
        validation::validate_range(
            "summarize.timeout_seconds",
            self.summarize.timeout_seconds,
            1,
            3600,
        )?;

        validation::validate_range("render.utc_offset_hours", self.render.utc_offset_hours, -12, 14)?;
        validation::validate_non_empty_string("render.placeholder_text", &self.render.placeholder_text)?;
        validation::validate_non_empty_string(
            "render.summary_failed_text",
            &self.render.summary_failed_text,
        )?;
        validation::validate_strftime("render.date_format", &self.render.date_format)?;
        validation::validate_strftime("render.time_format", &self.render.time_format)?;
        validation::validate_url("render.markdown_script_url", &self.render.markdown_script_url)?;
        if let Some(url) = &self.render.stylesheet_url {
            validation::validate_url("render.stylesheet_url", url)?;
        }
        if let Some(url) = &self.render.audio_url {
            validation::validate_url("render.audio_url", url)?;
        }

        validation::validate_path("publish.output_dir", &self.publish.output_dir)?;
        validation::validate_file_name("publish.current_file", &self.publish.current_file)?;
        if let Some(dir) = &self.publish.archive_dir {
            validation::validate_file_name("publish.archive_dir", dir)?;
        }

        Ok(())
    }
}

impl Validate for DigestConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
