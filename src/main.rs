use clap::{Parser, Subcommand};
use pagebake::config::{self, ConfigOverrides, PagebakeConfig};
use pagebake::{generate, output, watch};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pagebake")]
#[command(about = "Bake a folder of Markdown into a sanitized HTML page manifest")]
#[command(long_about = "\
Bake a folder of Markdown into a sanitized HTML page manifest

Your filesystem is the route table. Every .md file becomes a page, folders
become path segments, and everything else is copied as an asset.

Input structure:

  docs/
  ├── pagebake.toml            # Config (optional, never copied)
  ├── index.md                 # → /
  ├── guide/
  │   ├── README.md            # → /guide (index.md wins if both exist)
  │   ├── setup.md             # → /guide/setup
  │   └── img/logo.png         # → public/docs-assets/guide/img/logo.png
  └── .drafts/                 # Dot-prefixed: ignored

Title resolution (first available wins):
  frontmatter `title:` → first <h1> → first `# heading` → file name

Run 'pagebake gen-config' to generate a documented pagebake.toml.")]
#[command(version)]
struct Cli {
    /// Docs directory
    #[arg(long, default_value = "docs", global = true)]
    input: PathBuf,

    /// Manifest output file (overrides output.manifest)
    #[arg(long, global = true)]
    out_file: Option<PathBuf>,

    /// Asset copy destination (overrides assets.dir)
    #[arg(long, global = true)]
    assets_dir: Option<PathBuf>,

    /// URL prefix for copied assets (overrides assets.base)
    #[arg(long, global = true)]
    assets_base: Option<String>,

    /// Do not copy assets or rewrite asset URLs
    #[arg(long, global = true)]
    no_assets: bool,

    /// Log progress at info level (otherwise RUST_LOG, default warn)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile the docs folder, copy assets and write the manifest
    Generate,
    /// Compile the docs folder and list pages without writing anything
    Check,
    /// Generate, then regenerate whenever a Markdown file changes
    Watch,
    /// Print a stock pagebake.toml with all options documented
    GenConfig,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            out_file: self.out_file.clone(),
            assets_dir: self.assets_dir.clone(),
            assets_base: self.assets_base.clone(),
            no_assets: self.no_assets,
        }
    }

    fn load_config(&self) -> Result<PagebakeConfig, config::ConfigError> {
        config::load_config(&self.input)?.with_overrides(&self.overrides())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let input_display = cli.input.display().to_string();

    match cli.command {
        Command::Generate => {
            let config = cli.load_config()?;
            init_thread_pool(&config.processing);
            let summary = generate::generate(&cli.input, &config)?;
            output::print_generate_output(&summary, &input_display);
        }
        Command::Check => {
            let config = cli.load_config()?;
            init_thread_pool(&config.processing);
            let (manifest, _) = generate::build_manifest(&cli.input, &config)?;
            output::print_check_output(&manifest);
        }
        Command::Watch => {
            let config = cli.load_config()?;
            init_thread_pool(&config.processing);
            let summary = generate::generate(&cli.input, &config)?;
            output::print_generate_output(&summary, &input_display);
            output::print_watch_banner(&input_display);
            watch::watch(&cli.input, &config.scan, || {
                rebuild(&cli.input, &config)
            })?;
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// One watch-triggered rebuild. Failures are reported and the previous
/// manifest stays in place.
fn rebuild(input: &Path, config: &PagebakeConfig) {
    match generate::generate(input, config) {
        Ok(summary) => println!("{}", output::format_rebuild_output(&summary)),
        Err(e) => {
            tracing::warn!(error = %e, "rebuild failed");
            eprintln!("Rebuild failed: {}", e);
        }
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
