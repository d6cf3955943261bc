//! Social Collector CLI
//!
//! Collects YouTube comments for a hashtag and runs the offline analyses
//! over the saved tables.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use social_collector::{
    error::Result,
    models::{CollectionRequest, Config},
    pipeline::{self, CollectOptions},
    services::YouTubeClient,
    storage::{LocalStorage, table::merge_files},
    utils::console,
};

/// Social Collector - YouTube hashtag comment collector
#[derive(Parser, Debug)]
#[command(
    name = "social-collector",
    version,
    about = "Collect and analyse YouTube comments for a hashtag"
)]
struct Cli {
    /// Optional TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Bounds shared by `collect` and `pipeline`.
#[derive(Args, Debug)]
struct CollectArgs {
    /// Hashtag to search for, with or without '#'
    hashtag: String,

    /// Maximum number of comments to collect
    #[arg(long)]
    max_comments: Option<usize>,

    /// Maximum number of videos to visit
    #[arg(long)]
    max_videos: Option<usize>,

    /// Collect replies to top-level comments
    #[arg(long, conflicts_with = "no_replies")]
    include_replies: bool,

    /// Skip replies to top-level comments
    #[arg(long)]
    no_replies: bool,

    /// Output directory (overrides OUTPUT_DIR)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// YouTube Data API key (overrides YOUTUBE_API_KEY)
    #[arg(long)]
    api_key: Option<String>,
}

impl CollectArgs {
    fn include_replies(&self) -> Option<bool> {
        if self.no_replies {
            Some(false)
        } else if self.include_replies {
            Some(true)
        } else {
            None
        }
    }

    fn apply(&self, config: &mut Config) {
        if let Some(key) = &self.api_key {
            config.youtube.api_key = key.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output.dir = dir.to_string_lossy().into_owned();
        }
    }

    fn request(&self, config: &Config) -> Result<CollectionRequest> {
        CollectionRequest::with_defaults(
            &self.hashtag,
            &config.collection,
            self.max_comments,
            self.max_videos,
            self.include_replies(),
        )
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Collect comments for a hashtag
    Collect {
        #[command(flatten)]
        args: CollectArgs,

        /// Output file, resolved inside the output directory (not the current
        /// directory) unless absolute; `.json` saves JSON instead of CSV
        #[arg(long)]
        output: Option<String>,

        /// Also save a JSON copy
        #[arg(long)]
        json: bool,
    },

    /// Score sentiment of all collected run files
    #[cfg(feature = "analysis")]
    Sentiment {
        /// Directory holding youtube_*.csv files (default: output dir)
        #[arg(long)]
        input_dir: Option<PathBuf>,

        /// Results file (default: {input_dir}/youtube_sentiment_results.csv)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Build the author-video network from scored comments
    #[cfg(feature = "analysis")]
    Network {
        /// Scored comments (default: {output_dir}/youtube_sentiment_results.csv)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Number of top commenters to report and export
        #[arg(long, default_value_t = 20)]
        top: usize,

        /// Write a Graphviz DOT file of the top commenters' subgraph
        #[arg(long)]
        dot: Option<PathBuf>,
    },

    /// Rank authors by network centrality and sentiment
    #[cfg(feature = "analysis")]
    Influence {
        /// Scored comments (default: {output_dir}/youtube_sentiment_results.csv)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Profile file (default: {output_dir}/author_influence_profile.csv)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Run full pipeline: Collect → Sentiment → Influence
    #[cfg(feature = "analysis")]
    Pipeline {
        #[command(flatten)]
        args: CollectArgs,
    },

    /// Merge several CSV files into one
    Merge {
        /// Input CSV files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Merged output file
        #[arg(long)]
        output: PathBuf,
    },

    /// Show the effective configuration and validate it
    Config,
}

/// Initialize logging based on verbosity flag and configured level.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let dotenv = dotenvy::dotenv();

    let (config, load_error) = match &cli.config {
        Some(path) => match Config::load(path) {
            Ok(config) => (config, None),
            Err(e) => (Config::default(), Some((path.clone(), e))),
        },
        None => (Config::default(), None),
    };
    let config = config.with_env();
    init_logging(cli.verbose, &config.logging.level);

    if let Ok(path) = dotenv {
        log::debug!("Loaded environment from {}", path.display());
    }
    if let Some((path, e)) = load_error {
        log::warn!(
            "Config load failed from {}: {}. Using defaults.",
            path.display(),
            e
        );
    }

    tokio::select! {
        result = run(cli.command, config) => match result {
            Ok(()) => {
                log::info!("Done!");
                ExitCode::SUCCESS
            }
            Err(e) => {
                log::error!("{}", e);
                ExitCode::FAILURE
            }
        },
        _ = tokio::signal::ctrl_c() => {
            log::warn!("Interrupted, exiting");
            ExitCode::SUCCESS
        }
    }
}

async fn run(command: Command, mut config: Config) -> Result<()> {
    match command {
        Command::Collect { args, output, json } => {
            args.apply(&mut config);
            let request = args.request(&config)?;
            collect(&config, &request, &CollectOptions { output, json }).await?;
        }

        #[cfg(feature = "analysis")]
        Command::Sentiment { input_dir, output } => {
            let input_dir = input_dir.unwrap_or_else(|| PathBuf::from(&config.output.dir));
            let output = output.unwrap_or_else(|| input_dir.join(pipeline::SENTIMENT_RESULTS_FILE));
            let scorer = social_collector::analysis::sentiment::VaderScorer::new();
            pipeline::run_sentiment(&input_dir, &output, &scorer)?;
        }

        #[cfg(feature = "analysis")]
        Command::Network { input, top, dot } => {
            let input = input.unwrap_or_else(|| scored_path(&config));
            pipeline::run_network(&input, top, dot.as_deref())?;
        }

        #[cfg(feature = "analysis")]
        Command::Influence { input, output } => {
            let input = input.unwrap_or_else(|| scored_path(&config));
            let output = output.unwrap_or_else(|| {
                PathBuf::from(&config.output.dir).join(pipeline::INFLUENCE_PROFILE_FILE)
            });
            pipeline::run_influence(&input, &output)?;
        }

        #[cfg(feature = "analysis")]
        Command::Pipeline { args } => {
            args.apply(&mut config);
            let request = args.request(&config)?;
            let dir = PathBuf::from(&config.output.dir);

            console::step(1, 3, "Collecting comments...");
            if collect(&config, &request, &CollectOptions::default())
                .await?
                .is_none()
            {
                log::warn!("Nothing collected, skipping analysis");
                return Ok(());
            }

            console::step(2, 3, "Scoring sentiment...");
            let scored = dir.join(pipeline::SENTIMENT_RESULTS_FILE);
            let scorer = social_collector::analysis::sentiment::VaderScorer::new();
            pipeline::run_sentiment(&dir, &scored, &scorer)?;

            console::step(3, 3, "Computing influence...");
            pipeline::run_influence(&scored, &dir.join(pipeline::INFLUENCE_PROFILE_FILE))?;

            log::info!("Pipeline complete!");
        }

        Command::Merge { files, output } => {
            console::header("Merging datasets");
            merge_files(&files, &output)?;
        }

        Command::Config => {
            console::summary(
                "Configuration",
                &[
                    (
                        "API key",
                        if config.youtube.api_key.trim().is_empty() {
                            "not set".to_string()
                        } else {
                            "set".to_string()
                        },
                    ),
                    ("API base URL", config.youtube.base_url.clone()),
                    (
                        "Request delay",
                        format!("{}ms", config.youtube.request_delay_ms),
                    ),
                    (
                        "Default max comments",
                        config.collection.default_max_results.to_string(),
                    ),
                    (
                        "Default max videos",
                        config.collection.default_max_videos.to_string(),
                    ),
                    (
                        "Include replies",
                        console::flag(config.collection.include_replies).to_string(),
                    ),
                    ("Output directory", config.output.dir.clone()),
                    ("Log level", config.logging.level.clone()),
                ],
            );

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");
        }
    }

    Ok(())
}

/// Validate credentials, then collect and save one run.
async fn collect(
    config: &Config,
    request: &CollectionRequest,
    options: &CollectOptions,
) -> Result<Option<social_collector::storage::WriteMetadata>> {
    config.validate()?;
    let client = YouTubeClient::new(&config.youtube)?;
    let storage = LocalStorage::new(&config.output.dir);
    storage.ensure_root().await?;
    pipeline::run_collect(&client, &storage, request, options).await
}

#[cfg(feature = "analysis")]
fn scored_path(config: &Config) -> PathBuf {
    PathBuf::from(&config.output.dir).join(pipeline::SENTIMENT_RESULTS_FILE)
}
