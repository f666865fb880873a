use clap::Parser;
use news_digest::utils::{logger, validation::Validate};
use news_digest::{CliArgs, DigestConfig, DigestEngine, DigestPipeline, LocalStorage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.log_json {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting news-digest");
    if let Some(path) = &args.config {
        tracing::info!("📁 Loading configuration from: {}", path);
    }

    // 載入並驗證配置
    let config = match args.load_config().and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
    };

    let api_key = config.summarize.api_key_from_env();
    display_config_summary(&config, api_key.is_some(), args.dry_run);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing fetched or written");
        return Ok(());
    }

    if args.monitor {
        tracing::info!("🔍 Process monitoring enabled");
    }

    let storage = LocalStorage::new(config.publish.output_dir.clone());
    let pipeline = DigestPipeline::new(&config, storage, api_key)?;
    let engine = DigestEngine::new_with_monitoring(pipeline, args.monitor);

    match engine.run().await {
        Ok(outcome) => {
            match &outcome.degraded {
                Some(reason) => {
                    tracing::warn!("⚠️ Published placeholder page: {}", reason);
                    println!("⚠️ Published placeholder page ({})", reason);
                }
                None => {
                    tracing::info!(
                        "✅ Briefing published from {} entries ({} sources failed)",
                        outcome.entries_collected,
                        outcome.sources_failed
                    );
                    println!("✅ Briefing published");
                }
            }
            println!("📁 Current page: {}", outcome.page.current_path);
            if let Some(archive) = &outcome.page.archive_path {
                println!("📚 Archive copy: {}", archive);
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Nothing was published: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    }

    Ok(())
}

fn display_config_summary(config: &DigestConfig, has_credential: bool, dry_run: bool) {
    println!("📋 Configuration Summary:");
    println!("  Sources: {}", config.sources.len());
    for source in &config.sources {
        let limit = source
            .max_entries
            .unwrap_or(config.collect.max_entries_per_source);
        println!("    - {} (≤{}) {}", source.label, limit, source.url);
    }
    println!("  Fetch timeout: {}s", config.collect.timeout_seconds);
    println!(
        "  Model: {} @ {}",
        config.summarize.model, config.summarize.api_base
    );
    println!(
        "  Credential ({}): {}",
        config.summarize.api_key_env,
        if has_credential { "present" } else { "MISSING" }
    );
    println!("  Output: {}/{}", config.publish.output_dir, config.publish.current_file);
    match &config.publish.archive_dir {
        Some(dir) => println!("  Archive: {}/{}", config.publish.output_dir, dir),
        None => println!("  Archive: disabled"),
    }
    if dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }
    println!();
}
