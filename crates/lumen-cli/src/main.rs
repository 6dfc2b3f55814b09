use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lumen_contracts::events::EventLog;
use lumen_contracts::normalize::{clean_review, normalizer_for, NormalizeMode};
use lumen_contracts::review::{
    is_allowed_image_name, RequestRejection, ReviewRequest, ReviewResponse,
};
use lumen_contracts::tier::{premium_features, SupporterStatus, TierPolicy, SUPPORT_URL};
use lumen_engine::config::EngineSettings;
use lumen_engine::supporters::SupporterLookup;
use lumen_engine::{build_engine, build_supporter_lookup};
use serde_json::{json, Value};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "lumen", version, about = "Design review CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Review a PNG or JPEG design.
    Review(ReviewArgs),
    /// Show supporter status and quota for an email.
    Status(StatusArgs),
    /// List premium features.
    Features,
    /// Run the cleanup normalizer over a saved model response.
    Clean(CleanArgs),
    /// Run the structured normalizer over a saved model response.
    Extract(ExtractArgs),
}

#[derive(Debug, Parser)]
struct ReviewArgs {
    #[arg(long)]
    image: PathBuf,
    #[arg(long, default_value = "")]
    context: String,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    mode: Option<NormalizeMode>,
    #[arg(long)]
    model: Option<String>,
    #[arg(long)]
    events: Option<PathBuf>,
    #[arg(long)]
    dryrun: bool,
}

#[derive(Debug, Parser)]
struct StatusArgs {
    #[arg(long)]
    email: String,
}

#[derive(Debug, Parser)]
struct CleanArgs {
    #[arg(long)]
    input: PathBuf,
}

#[derive(Debug, Parser)]
struct ExtractArgs {
    #[arg(long)]
    input: PathBuf,
    #[arg(long)]
    premium: bool,
}

fn main() {
    init_tracing();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("lumen error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let output = match cli.command {
        Command::Review(args) => {
            let settings = apply_review_overrides(EngineSettings::from_env()?, &args);
            serde_json::to_value(run_review(&settings, &args)?)?
        }
        Command::Status(args) => {
            let settings = EngineSettings::from_env()?;
            let lookup = build_supporter_lookup(&settings)?;
            status_payload(&lookup.lookup(&args.email))
        }
        Command::Features => features_payload(),
        Command::Clean(args) => json!({
            "review_content": clean_review(&read_text(&args.input)?),
        }),
        Command::Extract(args) => serde_json::to_value(
            normalizer_for(NormalizeMode::Structured)
                .normalize(&read_text(&args.input)?, args.premium),
        )?,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(0)
}

fn apply_review_overrides(mut settings: EngineSettings, args: &ReviewArgs) -> EngineSettings {
    if let Some(mode) = args.mode {
        settings.normalize_mode = mode;
    }
    if let Some(model) = args.model.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
        settings.review_model = model.to_string();
    }
    settings.dryrun |= args.dryrun;
    settings
}

fn run_review(settings: &EngineSettings, args: &ReviewArgs) -> Result<ReviewResponse> {
    let image = read_image(&args.image)?;
    let is_supporter = match args.email.as_deref() {
        Some(email) => build_supporter_lookup(settings)?.lookup(email).is_supporter,
        None => false,
    };
    let request = ReviewRequest::new(image, &args.context, is_supporter)?;

    let mut engine = build_engine(settings)?;
    if let Some(path) = args.events.as_ref() {
        engine = engine.with_event_log(EventLog::new(path, Uuid::new_v4().to_string()));
    }
    info!(
        model = engine.model_name(),
        mode = %engine.config().mode,
        is_supporter,
        "starting review"
    );
    Ok(engine.review(&request))
}

fn read_image(path: &Path) -> Result<Vec<u8>> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    if !is_allowed_image_name(file_name) {
        return Err(RequestRejection::UnsupportedFileType)
            .with_context(|| format!("cannot review {}", path.display()));
    }
    fs::read(path).with_context(|| format!("failed to read image {}", path.display()))
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn status_payload(status: &SupporterStatus) -> Value {
    json!({
        "status": "success",
        "supporter_status": status,
        "rate_info": TierPolicy::for_supporter(status.is_supporter).rate_info(),
    })
}

fn features_payload() -> Value {
    json!({
        "features": premium_features(),
        "support_url": SUPPORT_URL,
    })
}
