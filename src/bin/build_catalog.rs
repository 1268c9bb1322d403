use anyhow::{Context, Result};
use clap::Parser;
use course_lens::core::catalog_builder::build_catalog;
use course_lens::utils::logger;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "build-catalog")]
#[command(about = "Convert the plain text course catalog into catalog JSON")]
struct Args {
    /// Catalog text extracted from the printed catalog
    #[arg(short, long)]
    input: PathBuf,

    /// Where to write the catalog JSON
    #[arg(short, long, default_value = "data/catalog.json")]
    output: PathBuf,

    /// Also write the cleaned text next to the output
    #[arg(long)]
    keep_cleaned: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    tracing::info!("📖 Reading catalog text from {}", args.input.display());
    let raw = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;

    let build = build_catalog(&raw);
    tracing::info!(
        "Kept {} of {} lines, parsed {} courses",
        build.lines_kept,
        build.lines_read,
        build.courses.len()
    );

    if let Some(parent) = args.output.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    if args.keep_cleaned {
        let cleaned_path = args.output.with_extension("cleaned.txt");
        std::fs::write(&cleaned_path, build.cleaned_text())
            .with_context(|| format!("failed to write {}", cleaned_path.display()))?;
        tracing::info!("Cleaned text saved to {}", cleaned_path.display());
    }

    let json = serde_json::to_string_pretty(&build.courses).context("failed to encode catalog")?;
    std::fs::write(&args.output, json)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    println!("✅ Wrote {} courses to {}", build.courses.len(), args.output.display());
    Ok(())
}
