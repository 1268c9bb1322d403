use clap::Parser;
use course_lens::app::text_units::is_html;
use course_lens::core::{CatalogSource, ConfigProvider};
use course_lens::utils::error::ErrorSeverity;
use course_lens::utils::{logger, validation::Validate};
use course_lens::{JsonCatalogLoader, LocalStorage, ScanEngine, ScanPipeline, TomlConfig};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "toml-scan")]
#[command(about = "Course code scan driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "course-lens.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override compound expansion setting from config
    #[arg(long)]
    expand_compounds: Option<bool>,

    /// Dry run - show what would be scanned without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 載入 TOML 配置 (日誌格式由配置決定)
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if config.json_logs() {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting TOML-based course scan");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 應用命令列覆蓋設定
    if let Some(expand) = args.expand_compounds {
        config.options.expand_compounds = expand;
        tracing::info!("🔧 Compound expansion overridden to: {}", expand);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    display_config_summary(&config, &args);

    let storage = LocalStorage::default();
    let catalog = match JsonCatalogLoader::new(storage.clone(), config.catalog_path())
        .load_catalog()
        .await
    {
        Ok(catalog) => Arc::new(catalog),
        Err(e) => {
            tracing::error!("❌ {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No documents will be scanned");
        perform_dry_run(&config, catalog.len());
        return Ok(());
    }

    // 決定監控設定
    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let pipeline = ScanPipeline::new(storage, config, catalog);
    let engine = ScanEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Scan completed successfully!");
            println!("✅ Scan completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Scan failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Scan: {}", config.scan.name);
    if let Some(description) = &config.scan.description {
        println!("  Description: {}", description);
    }
    println!("  Catalog: {}", config.catalog_path());
    println!("  Inputs: {} documents", config.inputs().len());
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", config.output_formats().join(", "));
    println!("  Concurrency: {}", config.concurrency());

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig, catalog_size: usize) {
    println!("🔍 Dry Run Analysis:");
    println!();

    println!("📚 Catalog:");
    println!("  Path: {}", config.catalog_path());
    println!("  Courses: {}", catalog_size);
    if catalog_size == 0 {
        println!("  ⚠️ Catalog is empty, nothing will be recognized");
    }

    println!();
    println!("📄 Documents:");
    for input in config.inputs() {
        let mode = if config.force_html() || is_html(input) {
            "html"
        } else {
            "text"
        };
        println!("  {} ({})", input, mode);
    }

    let options = config.scan_options();
    println!();
    println!("⚙️ Recognition:");
    println!("  Max range span: {}", options.max_range_span);
    println!(
        "  Compound expansion: {}",
        if options.expand_compounds {
            "enabled"
        } else {
            "disabled"
        }
    );

    let display = config.display_settings();
    println!();
    println!("🛠️ Report Fields:");
    for (enabled, label) in [
        (display.show_units, "units"),
        (display.show_terms, "terms"),
        (display.show_prerequisites, "prerequisites"),
        (display.show_description, "description"),
        (display.show_instructors, "instructors"),
    ] {
        if enabled {
            println!("  ✅ {}", label);
        }
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
}
