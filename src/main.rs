use anyhow::{Context, Result};
use clap::Parser as _;
use std::io::{self, BufReader, Read, Write};
use std::path::PathBuf;

use unifeed::config::Config;
use unifeed::{detect, Parser};

/// Default config path (~/.config/unifeed/config.toml), if HOME is set.
fn default_config_path() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("unifeed")
            .join("config.toml"),
    )
}

#[derive(clap::Parser, Debug)]
#[command(
    name = "unifeed",
    about = "Parse an RSS, Atom or JSON feed and print it as normalized JSON"
)]
struct Args {
    /// Feed document to read (stdin when omitted)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Config file (default: ~/.config/unifeed/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Keep at most N items (0 = unlimited)
    #[arg(long, value_name = "N")]
    max_items: Option<usize>,

    /// Reject malformed input instead of recovering
    #[arg(long)]
    strict: bool,

    /// Only print the detected feed type
    #[arg(long)]
    detect: bool,

    /// Sort items by publication date, oldest first
    #[arg(long)]
    sort: bool,

    /// Print JSON on a single line
    #[arg(long)]
    compact: bool,
}

fn open_input(file: Option<&PathBuf>) -> Result<Box<dyn Read>> {
    match file {
        Some(path) => {
            let metadata = std::fs::metadata(path)
                .with_context(|| format!("Failed to read '{}'", path.display()))?;
            if !metadata.is_file() {
                anyhow::bail!("'{}' is not a regular file", path.display());
            }
            let file = std::fs::File::open(path)
                .with_context(|| format!("Failed to open '{}'", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(io::stdin().lock())),
    }
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let config = match args.config.as_ref().cloned().or_else(default_config_path) {
        Some(path) => Config::load(&path)
            .with_context(|| format!("Failed to load config '{}'", path.display()))?,
        None => Config::default(),
    };
    let config = Config {
        strict: config.strict || args.strict,
        ..config
    };
    let mut options = config.parse_options();
    if let Some(max_items) = args.max_items {
        options.max_items = max_items;
    }

    let mut input = open_input(args.file.as_ref())?;
    let mut stdout = io::stdout().lock();

    if args.detect {
        let (feed_type, _) = detect(&mut input).context("Failed to read input")?;
        writeln!(stdout, "{feed_type}")?;
        return Ok(());
    }

    let mut feed = Parser::new()
        .parse_with_options(input, &options)
        .context("Failed to parse feed")?;
    if args.sort {
        feed.sort_items_by_published();
    }

    if args.compact {
        serde_json::to_writer(&mut stdout, &feed)?;
    } else {
        serde_json::to_writer_pretty(&mut stdout, &feed)?;
    }
    writeln!(stdout)?;
    Ok(())
}
