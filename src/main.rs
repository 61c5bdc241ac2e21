use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use dishtune::config::AppConfig;
use dishtune::features::Weights;
use dishtune::store::FeatureStore;
use dishtune::ui::{self, SelectionStyle};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dishtune", version, about = "Recommend music that matches a recipe")]
struct Cli {
    /// Recipe table (name, image, sentiment, saturation, brightness)
    #[arg(long, global = true)]
    recipes: Option<PathBuf>,

    /// Track table (name, sentiment, saturation, brightness, audio file)
    #[arg(long, global = true)]
    tracks: Option<PathBuf>,

    /// Directory audio files are resolved into
    #[arg(long, global = true)]
    music_dir: Option<PathBuf>,

    /// Directory recipe images are resolved into
    #[arg(long, global = true)]
    image_dir: Option<PathBuf>,

    /// Recipe selection style
    #[arg(long, value_enum, global = true)]
    style: Option<SelectionStyle>,

    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Slider overrides; unset axes fall back to the config file.
#[derive(Args)]
struct WeightArgs {
    /// Sentiment weight (0.0-2.0, step 0.1)
    #[arg(long, value_parser = parse_weight)]
    sentiment: Option<f64>,

    /// Saturation weight (0.0-2.0, step 0.1)
    #[arg(long, value_parser = parse_weight)]
    saturation: Option<f64>,

    /// Brightness weight (0.0-2.0, step 0.1)
    #[arg(long, value_parser = parse_weight)]
    brightness: Option<f64>,
}

impl WeightArgs {
    fn resolve(&self, config: &AppConfig) -> Result<Weights> {
        let base = &config.weights;
        // Config values bypass the flag parser, so hold them to the same slider rules
        let snap = |v: f64| ui::snap_weight(v).context("Invalid weight in config");
        Weights::new(
            self.sentiment.map_or_else(|| snap(base.sentiment), Ok)?,
            self.saturation.map_or_else(|| snap(base.saturation), Ok)?,
            self.brightness.map_or_else(|| snap(base.brightness), Ok)?,
        )
        .context("Invalid weights")
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the recipes available for selection
    Recipes,

    /// Recommend tracks for one recipe
    Recommend {
        /// Recipe name (exact match)
        recipe: String,

        #[command(flatten)]
        weights: WeightArgs,

        /// Number of results
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Pick recipes and tune weights interactively
    Interactive {
        #[command(flatten)]
        weights: WeightArgs,

        /// Number of results
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
}

fn parse_weight(s: &str) -> std::result::Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("'{}' is not a number", s))?;
    ui::snap_weight(value).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load config file (optional, defaults if missing), then apply CLI overrides
    let mut config = AppConfig::load();
    if let Some(p) = cli.recipes {
        config.recipes_path = p;
    }
    if let Some(p) = cli.tracks {
        config.tracks_path = p;
    }
    if let Some(p) = cli.music_dir {
        config.music_dir = p;
    }
    if let Some(p) = cli.image_dir {
        config.image_dir = p;
    }
    if let Some(s) = cli.style {
        config.style = s;
    }

    let store = FeatureStore::load(&config.recipes_path, &config.tracks_path)
        .context("Failed to load catalog")?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Recipes => {
            ui::render_selector(&mut out, store.recipes(), &config.image_dir, config.style, 0)?;
        }

        Commands::Recommend { recipe, weights, limit, json } => {
            let weights = weights.resolve(&config)?;
            let mut options = config.recommend_options();
            if let Some(n) = limit {
                options.top_k = n;
            }
            if options.top_k == 0 {
                anyhow::bail!("Number of results must be at least 1");
            }

            let recs = dishtune::recommend::recommend(&store, &recipe, &weights, &options)
                .context("Recommendation failed")?;

            if json {
                ui::render_json(&mut out, &recs)?;
            } else {
                ui::render_recommendations(&mut out, &recipe, &recs)?;
            }
        }

        Commands::Interactive { weights, limit } => {
            let weights = weights.resolve(&config)?;
            let mut options = config.recommend_options();
            if let Some(n) = limit {
                options.top_k = n;
            }
            if options.top_k == 0 {
                anyhow::bail!("Number of results must be at least 1");
            }

            let mut session = ui::session::Session::new(
                &store,
                options,
                config.image_dir.clone(),
                config.style,
                weights,
            );
            let stdin = std::io::stdin();
            session.run(stdin.lock(), &mut out)?;
        }
    }

    out.flush()?;
    Ok(())
}
