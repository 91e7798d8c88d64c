use clap::{Parser, Subcommand};
use docsmith::{config, output, pipeline, scan};
use std::path::PathBuf;

/// `0.3.0` on a release tag, `0.3.0-dev+<hash>` on any other commit.
fn version_string() -> &'static str {
    if env!("ON_RELEASE_TAG") == "true" {
        return env!("CARGO_PKG_VERSION");
    }
    let hash = env!("GIT_HASH");
    if hash.is_empty() {
        return concat!(env!("CARGO_PKG_VERSION"), "-dev");
    }
    // Leaked once at startup, called exactly once.
    Box::leak(format!("{}-dev+{hash}", env!("CARGO_PKG_VERSION")).into_boxed_str())
}

#[derive(Parser)]
#[command(name = "docsmith")]
#[command(about = "Build pipeline for static documentation sites")]
#[command(long_about = "\
Build pipeline for static documentation sites

Your filesystem is the data source. Markdown files become documents,
directories become sidebar categories, and one site.toml declares the rest.

Content structure:

  docs/
  ├── site.toml                    # Site config (optional, merged over defaults)
  ├── index.md                     # Root index → landing route
  ├── getting-started.md           # Document (front-matter sets title/slug/order)
  ├── guide/
  │   ├── index.md                 # Directory index → /guide
  │   └── install.md               # Nested document → /guide/install
  ├── img/logo.svg                 # Asset → copied route, no locale prefix
  └── i18n/
      └── fr/
          └── getting-started.md   # French translation of getting-started

A build scans the tree, resolves sidebars, composes per-locale views,
layers the theme, validates every internal link, and emits routes.json
plus report.json. Broken internal links fail the build unless
on_broken_links is set to \"warn\" or \"ignore\".

Run 'docsmith gen-config' to generate a documented site.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "docs", global = true)]
    source: PathBuf,

    /// Output directory for the route manifest and build report
    #[arg(long, default_value = "build", global = true)]
    output: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan the content directory and list documents and assets
    Scan,
    /// Run the full pipeline and write routes.json and report.json
    Build,
    /// Run the full pipeline without writing anything
    Check,
    /// Print a stock site.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Scan => {
            let nodes = scan::scan(&cli.source)?;
            output::print_scan_output(&nodes);
        }
        Command::Build => {
            println!("==> Building {}", cli.source.display());
            let built = run_pipeline(&cli.source)?;

            std::fs::create_dir_all(&cli.output)?;
            let routes_path = cli.output.join("routes.json");
            std::fs::write(&routes_path, built.routes.to_json()?)?;
            let report_path = cli.output.join("report.json");
            std::fs::write(&report_path, serde_json::to_string_pretty(&built.report)?)?;

            output::print_build_output(&built);
            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let built = run_pipeline(&cli.source)?;
            output::print_build_output(&built);
            println!("==> Site is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load config, size the worker pool, run the pipeline. Failures carry the
/// stage name so the exit diagnostic says where the build died.
fn run_pipeline(source: &std::path::Path) -> Result<pipeline::BuildOutput, Box<dyn std::error::Error>> {
    let site_config = config::load_config(source)?;
    init_thread_pool(&site_config.processing);
    pipeline::build_with_config(source, site_config)
        .map_err(|err| format!("{} failed: {err}", err.stage()).into())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores — user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
