use clap::{Parser, Subcommand};
use insta_hugo::config::{self, Config};
use insta_hugo::convert::{self, ConvertOptions};
use insta_hugo::output;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "insta-hugo")]
#[command(about = "Convert an Instaloader download into Hugo posts")]
#[command(long_about = "\
Convert an Instaloader download into Hugo posts

Files that share a timestamp key form one post:

  src/
  ├── 2024-03-05_08-00-00_UTC.json.xz   # Sidecar (caption, shortcode, location)
  ├── 2024-03-05_08-00-00_UTC.txt       # Caption fallback
  ├── 2024-03-05_08-00-00_UTC_1.jpg     # Carousel media
  └── 2024-03-05_08-00-00_UTC_2.mp4

become:

  out/
  ├── content/posts/20240305-<title-slug>-<hash>.md
  └── static/media/2024-03-05_08-00-00_UTC_{1,2}.*

Logging goes to stderr; set RUST_LOG (e.g. RUST_LOG=info) for detail and
LOG_FORMAT=json for structured output.

Run 'insta-hugo gen-config' to generate a documented insta-hugo.toml.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write one Hugo post per media group
    Convert {
        /// Instaloader download directory
        #[arg(long)]
        src: PathBuf,
        /// Hugo site root
        #[arg(long)]
        out: PathBuf,
        /// Author written into every post
        #[arg(long)]
        author: Option<String>,
        /// Config file (default: insta-hugo.toml in the site root, if present)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Show what convert would write, without writing anything
    Check {
        /// Instaloader download directory
        #[arg(long)]
        src: PathBuf,
        /// Config file (default: insta-hugo.toml in the source directory, if present)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print a stock insta-hugo.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing()?;

    match cli.command {
        Command::Convert {
            src,
            out,
            author,
            config,
        } => {
            let config = resolve_config(config.as_deref(), &out)?;
            let options = ConvertOptions { author };
            let report = convert::convert(&src, &out, &options, &config)?;
            output::print_convert_output(&report);
        }
        Command::Check { src, config } => {
            let config = resolve_config(config.as_deref(), &src)?;
            let plan = convert::plan(&src, &config)?;
            output::print_check_output(&plan, &config.media);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// An explicit `--config` must exist; otherwise look for `insta-hugo.toml` in
/// `default_dir` and fall back to stock defaults.
fn resolve_config(
    explicit: Option<&Path>,
    default_dir: &Path,
) -> Result<Config, config::ConfigError> {
    match explicit {
        Some(path) => config::load_config_file(path),
        None => config::load_config(default_dir),
    }
}

fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| matches!(v.to_lowercase().as_str(), "json" | "structured"))
        .unwrap_or(false);

    // stdout carries the report
    if use_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()?;
    }

    Ok(())
}
