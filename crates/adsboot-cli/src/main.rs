mod chat;
mod interrupt;
mod media;
mod render;

use std::path::PathBuf;
use std::time::Duration;

use adsboot_gateway::constants::paths;
use adsboot_gateway::{
    AdGateway, AudienceBrief, CallOptions, ChatSurface, CopyBrief, GatewayConfig, GatewayError,
};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;

use interrupt::Interrupt;

#[derive(Debug, Parser)]
#[command(
    name = "adsboot",
    version,
    about = "Generate ad audiences, copy, creative reviews and strategy chat"
)]
struct Cli {
    /// Directory holding config.json (defaults to the platform config dir)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,
    /// Per-request deadline in seconds, overriding the configured default
    #[arg(long, global = true)]
    timeout: Option<u64>,
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate three audience segments
    Audience(AudienceArgs),
    /// Generate three ad copy variations
    Copy(CopyArgs),
    /// Score an image or video creative
    Creative(CreativeArgs),
    /// Chat with the strategist
    Chat(ChatArgs),
    /// List quick prompts and tone presets
    Prompts,
    /// Show the effective configuration
    Config(ConfigArgs),
}

#[derive(Debug, Parser)]
struct AudienceArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    description: String,
    #[arg(long, default_value = "Adults 18-45")]
    demographic: String,
}

#[derive(Debug, Parser)]
struct CopyArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    selling_points: String,
    /// Any tone; see `adsboot prompts` for presets
    #[arg(long)]
    tone: Option<String>,
}

#[derive(Debug, Parser)]
struct CreativeArgs {
    path: PathBuf,
    /// What the creative is for
    #[arg(long)]
    context: Option<String>,
}

#[derive(Debug, Parser)]
struct ChatArgs {
    #[arg(long, value_enum, default_value_t = SurfaceArg::Assistant)]
    surface: SurfaceArg,
    /// Results the conversation should know about
    #[arg(long)]
    context: Option<String>,
}

#[derive(Debug, Parser)]
struct ConfigArgs {
    /// Write a default config.json if none exists
    #[arg(long)]
    init: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SurfaceArg {
    Assistant,
    Audience,
    Copy,
    Creative,
}

impl From<SurfaceArg> for ChatSurface {
    fn from(arg: SurfaceArg) -> Self {
        match arg {
            SurfaceArg::Assistant => ChatSurface::Assistant,
            SurfaceArg::Audience => ChatSurface::Audience,
            SurfaceArg::Copy => ChatSurface::Copy,
            SurfaceArg::Creative => ChatSurface::Creative,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();
    let config_dir = cli.config_dir.clone().or_else(GatewayConfig::default_dir);
    let config = load_config(config_dir.as_ref()).await?;

    let mut options = CallOptions::new();
    if let Some(secs) = cli.timeout.filter(|secs| *secs > 0) {
        options = options.with_timeout(Duration::from_secs(secs));
    }

    match cli.command {
        Command::Prompts => {
            render::quick_prompts();
            render::tones();
            Ok(())
        }
        Command::Config(args) => show_config(config, config_dir, args).await,
        Command::Chat(args) => {
            let gateway = AdGateway::gemini(config);
            chat::run(&gateway, args.surface.into(), args.context, &options).await
        }
        Command::Audience(args) => {
            let brief = AudienceBrief::new(args.name, args.description, args.demographic);
            if !brief.is_complete() {
                bail!("Product name and description are required");
            }
            let gateway = AdGateway::gemini(config);
            let interrupt = Interrupt::arm();
            let segments = gateway
                .request_audience_segments(&brief, &options.with_cancel(interrupt.token()))
                .await
                .map_err(explain)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&segments)?);
            } else {
                render::segments(&segments);
            }
            Ok(())
        }
        Command::Copy(args) => {
            let mut brief = CopyBrief::new(args.name, args.selling_points);
            if let Some(tone) = args.tone {
                brief = brief.with_tone(tone);
            }
            if !brief.is_complete() {
                bail!("Product name and selling points are required");
            }
            let gateway = AdGateway::gemini(config);
            let interrupt = Interrupt::arm();
            let variants = gateway
                .request_ad_copy_variants(&brief, &options.with_cancel(interrupt.token()))
                .await
                .map_err(explain)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&variants)?);
            } else {
                render::copy_variants(&variants);
            }
            Ok(())
        }
        Command::Creative(args) => {
            let attachment = media::load_attachment(&args.path).await?;
            let gateway = AdGateway::gemini(config);
            let interrupt = Interrupt::arm();
            let analysis = gateway
                .request_creative_analysis(
                    &attachment,
                    args.context.as_deref(),
                    &options.with_cancel(interrupt.token()),
                )
                .await
                .map_err(explain)?;
            match attachment.kind() {
                Some(kind) if !cli.json => render::creative(kind, &analysis),
                _ => println!("{}", serde_json::to_string_pretty(&analysis)?),
            }
            Ok(())
        }
    }
}

async fn load_config(dir: Option<&PathBuf>) -> Result<GatewayConfig> {
    let mut config = match dir {
        Some(dir) => GatewayConfig::load(dir)
            .await
            .with_context(|| format!("Failed to load config from {}", dir.display()))?,
        None => GatewayConfig::default(),
    };
    config.apply_env();
    if !config.has_api_key() {
        log::warn!("No API key configured; set GEMINI_API_KEY or add api_key to config.json");
    }
    log::debug!("Effective config: {:?}", config);
    Ok(config)
}

async fn show_config(config: GatewayConfig, dir: Option<PathBuf>, args: ConfigArgs) -> Result<()> {
    if args.init {
        let Some(dir) = dir else {
            bail!("No config directory available; pass --config-dir");
        };
        let path = dir.join(paths::CONFIG_FILE);
        if path.exists() {
            bail!("{} already exists", path.display());
        }
        // Keys picked up from the environment stay out of the file
        let template = GatewayConfig {
            api_key: None,
            ..config.clone()
        };
        template.save(&dir).await?;
    }

    let api_key = if config.has_api_key() { "[REDACTED]" } else { "" };
    let view = json!({
        "api_base": &config.api_base,
        "api_key": api_key,
        "model": &config.model,
        "request_timeout_secs": config.request_timeout_secs,
        "max_attachment_bytes": config.max_attachment_bytes,
        "tuning": &config.tuning,
    });
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

fn explain(err: GatewayError) -> anyhow::Error {
    let hint = render::hint_for(&err);
    anyhow::Error::new(err).context(hint)
}
