//! Command-line front-end for lead accumulation.

mod config;
mod render;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use gemini_client::GeminiClient;
use leadgen::{
    export, filter_leads, paginate, Accumulator, AccumulatorConfig, GeminiLeadSource,
    GeminiSourceConfig, PlanLimits, ProfileStore, SqliteProfileStore, ToolKind, ITEMS_PER_PAGE,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "leadgen")]
#[command(about = "Generate deduplicated lead lists with Gemini")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available tools
    Tools,

    /// Run an extraction and export the results
    Run(RunArgs),

    /// Show plan and usage for a user
    Profile {
        #[arg(long)]
        user: String,
    },

    /// Upgrade a user to the Pro plan
    Upgrade {
        #[arg(long)]
        user: String,
    },
}

#[derive(Args)]
struct RunArgs {
    /// User email the run is counted against
    #[arg(long)]
    user: String,

    /// Tool slug (see `leadgen tools`)
    #[arg(long)]
    tool: ToolKind,

    /// URL or search query
    #[arg(long)]
    query: String,

    /// CSV output path
    #[arg(long, default_value = export::DEFAULT_FILENAME)]
    out: PathBuf,

    /// Override the preset's batch cap
    #[arg(long)]
    max_batches: Option<usize>,

    #[arg(long, value_enum, default_value_t = Preset::Bulk)]
    preset: Preset,

    /// Only show leads containing this text
    #[arg(long)]
    filter: Option<String>,

    /// Table page to show
    #[arg(long, default_value_t = 1)]
    page: usize,
}

#[derive(Clone, Copy, ValueEnum)]
enum Preset {
    Single,
    Quick,
    Bulk,
    Open,
}

impl Preset {
    fn config(self) -> AccumulatorConfig {
        match self {
            Preset::Single => AccumulatorConfig::single_shot(),
            Preset::Quick => AccumulatorConfig::quick(),
            Preset::Bulk => AccumulatorConfig::bulk(),
            Preset::Open => AccumulatorConfig::open_ended(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,leadgen=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Tools => {
            print_tools();
            Ok(())
        }
        Commands::Run(args) => run(args).await,
        Commands::Profile { user } => show_profile(&user).await,
        Commands::Upgrade { user } => upgrade(&user).await,
    }
}

fn print_tools() {
    for kind in ToolKind::ALL {
        let config = kind.config();
        println!("{}  {}", kind.slug().cyan().bold(), kind.display_name());
        println!("    {}", config.description);
        println!("    {} {}", "e.g.".dimmed(), config.placeholder.dimmed());
    }
}

async fn open_store(config: &Config) -> Result<Arc<SqliteProfileStore>> {
    let store = SqliteProfileStore::new(&config.database_url)
        .await
        .with_context(|| format!("Failed to open profile database {}", config.database_url))?;
    info!(database_url = %config.database_url, "Profile store ready");
    Ok(Arc::new(store))
}

async fn run(args: RunArgs) -> Result<()> {
    let config = Config::from_env()?;
    let store = open_store(&config).await?;
    let limits = PlanLimits::default();

    let profile = store
        .load_profile_today(&args.user)
        .await
        .context("Failed to load profile")?;

    let client = GeminiClient::new(config.api_key()?);
    let source = GeminiLeadSource::new(
        client,
        GeminiSourceConfig::default().with_model(config.gemini_model.clone()),
    );

    let mut accumulator_config = config.accumulator_config(args.preset.config());
    if let Some(max) = args.max_batches {
        accumulator_config = accumulator_config.with_max_batches(max);
    }

    let accumulator = Accumulator::new(source, limits, store.clone(), accumulator_config);

    let mut progress = accumulator.subscribe();
    let progress_task = tokio::spawn(async move {
        let mut last = String::new();
        while progress.changed().await.is_ok() {
            let state = progress.borrow_and_update().clone();
            if state.status != last {
                eprintln!("{} {} ({} found)", "»".cyan(), state.status, state.found);
                last = state.status;
            }
        }
    });

    let cancel = accumulator.cancel_handle();
    let ctrl_c_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, cancelling run");
            eprintln!("{}", "Stopping after the current batch...".yellow());
            cancel.cancel();
        }
    });

    let result = accumulator.run(&profile, args.tool, &args.query).await;
    progress_task.abort();
    ctrl_c_task.abort();

    let report = result.map_err(|e| {
        let message = e.user_message();
        anyhow::Error::new(e).context(message)
    })?;

    if let Some(warning) = &report.usage_warning {
        warn!(user = %args.user, error = %warning, "Usage was not recorded");
    }
    if report.outcome.is_success() && report.usage_warning.is_none() {
        println!("{}", report.message().green());
    } else {
        println!("{}", report.message().yellow());
    }

    if !report.leads.is_empty() {
        let filtered = filter_leads(&report.leads, args.filter.as_deref().unwrap_or(""));
        let page = paginate(&filtered, args.page, ITEMS_PER_PAGE);
        println!();
        println!("{}", render::lead_table(&page, args.tool.config().columns));
        println!();

        export::export_csv(&args.out, &report.leads)
            .with_context(|| format!("Failed to export CSV to {}", args.out.display()))?;
        println!("Exported {} leads to {}", report.leads.len(), args.out.display());
    }

    let updated = store
        .load_profile_today(&args.user)
        .await
        .context("Failed to reload profile")?;
    println!("{}", render::profile_summary(&updated, &limits));

    Ok(())
}

async fn show_profile(user: &str) -> Result<()> {
    let config = Config::from_env()?;
    let store = open_store(&config).await?;

    let profile = store
        .load_profile_today(user)
        .await
        .context("Failed to load profile")?;
    println!("{}", render::profile_summary(&profile, &PlanLimits::default()));
    Ok(())
}

async fn upgrade(user: &str) -> Result<()> {
    let config = Config::from_env()?;
    let store = open_store(&config).await?;

    store
        .load_profile_today(user)
        .await
        .context("Failed to load profile")?;
    store
        .upgrade_to_pro(user)
        .await
        .context("Failed to upgrade profile")?;
    info!(user = %user, "Upgraded to Pro");

    let profile = store.load_profile_today(user).await?;
    println!("{}", "Upgraded to Pro.".green().bold());
    println!("{}", render::profile_summary(&profile, &PlanLimits::default()));
    Ok(())
}
