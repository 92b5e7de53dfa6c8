use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};

use podmirror::{
    ChannelDefaults, DEFAULT_OUTPUT_DIR, MirrorConfig, NoopReporter, ProgressEvent,
    ProgressReporter, ReqwestClient, SharedProgressReporter, mirror_feed,
};

// Emoji with fallback for terminals without Unicode support
static MIRROR: Emoji<'_, '_> = Emoji("🪞 ", "");
static SEARCH: Emoji<'_, '_> = Emoji("🔍 ", "[~] ");
static WRENCH: Emoji<'_, '_> = Emoji("🔧 ", "[*] ");
static RULER: Emoji<'_, '_> = Emoji("📏 ", "[+] ");
static WARNING: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");
static SUCCESS: Emoji<'_, '_> = Emoji("✅ ", "[+] ");

/// Mirror a podcast RSS feed to a static file
#[derive(Parser, Debug)]
#[command(name = "podmirror")]
#[command(about = "Mirror a podcast RSS feed, backfilling iTunes metadata and enclosure details")]
#[command(version)]
struct Args {
    /// Origin RSS feed URL
    #[arg(long, env = "ORIGIN_FEED_URL")]
    origin: String,

    /// Base address of the site the mirror is published on
    #[arg(long, env = "PUBLIC_SITE")]
    public_site: String,

    /// Directory the mirrored feed is written to
    #[arg(long, env = "OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Language inserted when the origin feed declares none
    #[arg(long, env = "FEED_LANGUAGE")]
    language: Option<String>,

    /// Quiet mode - suppress progress output
    #[arg(short, long, env = "MIRROR_QUIET")]
    quiet: bool,
}

/// Progress reporter using an indicatif spinner for terminal output
struct ConsoleReporter {
    spinner: ProgressBar,
}

impl ConsoleReporter {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {wide_msg}") {
            spinner.set_style(style);
        }
        spinner.enable_steady_tick(std::time::Duration::from_millis(100));
        Self { spinner }
    }
}

impl ProgressReporter for ConsoleReporter {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::FetchingFeed { url } => {
                self.spinner
                    .set_message(format!("{SEARCH}Fetching feed: {}", url.cyan()));
            }

            ProgressEvent::ParsingFeed { bytes } => {
                self.spinner
                    .set_message(format!("{SEARCH}Parsing {} bytes", bytes.to_string().cyan()));
            }

            ProgressEvent::ChannelPatched {
                title,
                item_count,
                inserted_defaults,
            } => {
                let filled = if inserted_defaults.is_empty() {
                    "none".dimmed().to_string()
                } else {
                    inserted_defaults.join(", ").yellow().to_string()
                };
                self.spinner.println(format!(
                    "{WRENCH}{} • {} items, defaults filled: {}",
                    title.bold().green(),
                    item_count.to_string().cyan(),
                    filled
                ));
            }

            ProgressEvent::ProbingLength { url } => {
                self.spinner
                    .set_message(format!("{RULER}Probing {}", url.dimmed()));
            }

            ProgressEvent::LengthFilled { url, length } => {
                self.spinner.println(format!(
                    "  {RULER}{} {}",
                    length.to_string().green(),
                    url.dimmed()
                ));
            }

            ProgressEvent::ProbeFailed { url } => {
                self.spinner.println(format!(
                    "  {WARNING}{} {}",
                    "no length for".yellow(),
                    url.dimmed()
                ));
            }

            ProgressEvent::FeedWritten {
                path,
                bytes,
                self_link,
            } => {
                self.spinner.finish_and_clear();
                println!(
                    "\n{SUCCESS}{} {} ({} bytes)\n   {} {}",
                    "Wrote".bold().green(),
                    path.display().to_string().cyan(),
                    bytes,
                    "self link:".dimmed(),
                    self_link
                );
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = MirrorConfig::new(&args.origin, &args.public_site, args.output_dir)
        .context("Invalid configuration")?;
    if let Some(language) = args.language {
        config = config.with_defaults(ChannelDefaults {
            language,
            ..ChannelDefaults::default()
        });
    }

    if !args.quiet {
        println!(
            "\n{}{} {}\n",
            MIRROR,
            "podmirror".bold().magenta(),
            "- Podcast Feed Mirror".dimmed()
        );
    }

    let client = ReqwestClient::new().context("Failed to build HTTP client")?;

    let reporter: SharedProgressReporter = if args.quiet {
        NoopReporter::shared()
    } else {
        Arc::new(ConsoleReporter::new())
    };

    let result = mirror_feed(&client, &config, reporter)
        .await
        .context("Failed to mirror feed")?;

    if !args.quiet {
        println!(
            "\n{} {} items, {} lengths filled, {} probes failed, {} MIME types fixed\n",
            "Mirror complete:".bold().green(),
            result.items.to_string().cyan(),
            result.lengths_filled.to_string().green(),
            if result.probes_failed > 0 {
                result.probes_failed.to_string().yellow()
            } else {
                result.probes_failed.to_string().green()
            },
            result.mime_types_updated.to_string().cyan()
        );
    }

    Ok(())
}
