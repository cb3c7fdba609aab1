use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use tracing_subscriber::EnvFilter;

use tatort_rename::config::{ConfigBuilder, DEFAULT_LANGUAGE, TATORT_SHOW_ID};
use tatort_rename::rename_engine::{print_summary, RenameEngine};
use tatort_rename::resolver::ConsoleOperator;
use tatort_rename::source::CatalogSource;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Rename Tatort episode files using fuzzy matching against the episode catalog",
    after_help = "One of --catalog or --api-key is required."
)]
#[command(group(
    ArgGroup::new("source")
        .required(true)
        .multiple(true)
        .args(["catalog", "api_key"])
))]
struct Args {
    /// Directory containing the files to rename
    #[arg(default_value = ".")]
    directory: PathBuf,

    /// Read the episode catalog from a JSON snapshot instead of TVDB
    /// (this or --api-key is required)
    #[arg(long, value_name = "FILE")]
    catalog: Option<PathBuf>,

    /// TVDB v4 API key used to fetch the episode catalog (this or --catalog
    /// is required)
    #[arg(long, value_name = "KEY")]
    api_key: Option<String>,

    /// TVDB series ID
    #[arg(long, default_value_t = TATORT_SHOW_ID)]
    show_id: u64,

    /// Catalog language (TVDB three-letter code)
    #[arg(long, default_value = DEFAULT_LANGUAGE)]
    language: String,

    /// Only print the new names without renaming files
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Print debug logging to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose {
        "tatort_rename=debug"
    } else {
        "tatort_rename=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    println!("Tatort Rename Tool");
    println!("==================");

    let config = ConfigBuilder::new()
        .directory(&args.directory)
        .show_id(args.show_id)
        .language(args.language.clone())
        .dry_run(args.dry_run)
        .build()?;

    let source = CatalogSource::select(args.catalog, args.api_key, &config)?;
    let index = source
        .load_index()
        .await
        .context("Could not load the episode catalog")?;
    println!("Loaded {} episodes from the catalog.\n", index.len());

    let mut operator = ConsoleOperator::stdio();
    let mut engine = RenameEngine::new(config.clone(), &index);
    let summary = engine.run(&mut operator)?;

    print_summary(&summary, config.dry_run, &config.directory);
    Ok(())
}
