use crate::config::toml_config::DigestConfig;
use crate::utils::error::Result;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "news-digest")]
#[command(about = "Fetch RSS feeds, summarize them with a chat model and publish an HTML briefing")]
pub struct CliArgs {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override publish.output_dir
    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// Skip the dated archive copy
    #[arg(long)]
    pub no_archive: bool,

    /// Show the resolved configuration without fetching or writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    /// Sample process CPU and memory at each stage
    #[arg(long)]
    pub monitor: bool,
}

impl CliArgs {
    /// 載入配置並套用命令列覆蓋設定 (尚未驗證)
    pub fn load_config(&self) -> Result<DigestConfig> {
        let mut config = match &self.config {
            Some(path) => DigestConfig::from_file(path)?,
            None => DigestConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut DigestConfig) {
        if let Some(output_dir) = &self.output_dir {
            tracing::info!("🔧 Output directory overridden to: {}", output_dir);
            config.publish.output_dir = output_dir.clone();
        }
        if self.no_archive {
            tracing::info!("🔧 Archive disabled from the command line");
            config.publish.archive_dir = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_are_applied() {
        let args = CliArgs::parse_from([
            "news-digest",
            "--output-dir",
            "/tmp/site",
            "--no-archive",
        ]);

        let config = args.load_config().unwrap();
        assert_eq!(config.publish.output_dir, "/tmp/site");
        assert!(config.publish.archive_dir.is_none());
    }

    #[test]
    fn test_defaults_without_flags() {
        let args = CliArgs::parse_from(["news-digest"]);
        assert!(args.config.is_none());
        assert!(!args.dry_run);

        let config = args.load_config().unwrap();
        assert_eq!(config.publish.archive_dir.as_deref(), Some("archive"));
    }
}
