use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use coversync::{
    Capabilities, Compositor, CoverFonts, CoverRenderer, CoverRequest, DefaultImageFetcher,
    FileImageFetcher, HttpImageFetcher, PreparedCoverAssets, Scheduler, SyncConfig, SyncEngine,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "coversync", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one banner from a request JSON.
    Render(RenderArgs),
    /// Keep a file-backed banner in sync until Ctrl-C.
    Watch(WatchArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Cover request JSON.
    #[arg(long)]
    request: PathBuf,

    /// Output image path.
    #[arg(long)]
    out: PathBuf,

    /// Optional config JSON (layout, font, output format).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct WatchArgs {
    /// Config JSON with a `local` section.
    #[arg(long)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args).await,
        Command::Watch(args) => cmd_watch(args).await,
    }
}

fn load_fonts(config: &SyncConfig) -> anyhow::Result<CoverFonts> {
    let fonts = match &config.font_path {
        Some(path) => CoverFonts::from_path(path)?,
        None => CoverFonts::discover_system()?,
    };
    Ok(fonts)
}

fn image_fetcher(config: &SyncConfig, fallback_root: &Path) -> DefaultImageFetcher {
    let root = config
        .local
        .as_ref()
        .and_then(|l| l.image_root.clone())
        .unwrap_or_else(|| fallback_root.to_path_buf());
    DefaultImageFetcher::new(HttpImageFetcher::default(), FileImageFetcher::rooted(root))
}

async fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => SyncConfig::from_json_file(path)?,
        None => SyncConfig::default(),
    };
    let text = std::fs::read_to_string(&args.request)
        .with_context(|| format!("read request '{}'", args.request.display()))?;
    let request: CoverRequest = serde_json::from_str(&text)
        .with_context(|| format!("parse request '{}'", args.request.display()))?;

    let request_dir = args.request.parent().unwrap_or_else(|| Path::new("."));
    let fetcher = image_fetcher(&config, request_dir);
    let assets = PreparedCoverAssets::prepare(&request, &fetcher).await;

    let compositor = Compositor::new(config.layout.clone(), load_fonts(&config)?, config.output);
    let cover = tokio::task::spawn_blocking(move || compositor.render(&request, &assets))
        .await
        .context("render task")??;

    let out = if args.out.extension().is_none() {
        args.out.with_extension(cover.format.extension())
    } else {
        args.out
    };
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&out, &cover.bytes)
        .with_context(|| format!("write banner '{}'", out.display()))?;

    eprintln!("wrote {}", out.display());
    Ok(())
}

async fn cmd_watch(args: WatchArgs) -> anyhow::Result<()> {
    let config = SyncConfig::from_json_file(&args.config)?;
    let local = config
        .local
        .as_ref()
        .context("watch needs a `local` section in the config")?;
    let config_dir = args.config.parent().unwrap_or_else(|| Path::new("."));

    let (status, publisher, directory) = coversync::local::from_config(local);
    let caps = Capabilities {
        status: Arc::new(status),
        directory: Arc::new(directory),
        fetcher: Arc::new(image_fetcher(&config, config_dir)),
        renderer: Arc::new(Compositor::new(
            config.layout.clone(),
            load_fonts(&config)?,
            config.output,
        )),
        publisher: Arc::new(publisher),
    };
    let engine = Arc::new(SyncEngine::new(config.engine_settings(), caps));
    let mut scheduler = Scheduler::new(
        engine,
        config.rotation(),
        config.poll_interval(),
        config.backoff_base(),
    );

    scheduler
        .run(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %err, "ctrl-c handler unavailable");
                std::future::pending::<()>().await;
            }
        })
        .await;
    Ok(())
}
