mod cli;
mod demo;
mod exit;

use std::path::PathBuf;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use webpump_bridge::{ContentSource, PollBridge, SessionOutcome};
use webpump_common::WebpumpError;
use webpump_config::{LogLevel, WebpumpConfig};
use webpump_webview::{standalone, Standalone, WebViewEngine};

use crate::cli::{Args, Command, CompileArgs, RunArgs};
use crate::demo::DemoHandler;
use crate::exit::ExitSignal;

/// Exit status after Ctrl-C, following the shell's 128 + SIGINT convention.
const INTERRUPTED: u8 = 130;

fn init_logging(level: LogLevel) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                level
                    .directive()
                    .parse()
                    .unwrap_or_else(|_| "webpump=info".parse().unwrap()),
            ),
        )
        .init();
}

/// How this process was started.
enum Invocation {
    /// A compiled standalone: serve the embedded site and ignore the
    /// command line.
    Standalone(Standalone),
    Cli(Args),
}

fn main() -> ExitCode {
    let (invocation, bundle_error) = match Standalone::from_current_exe() {
        Ok(Some(bundle)) => (Invocation::Standalone(bundle), None),
        Ok(None) => (Invocation::Cli(cli::parse()), None),
        Err(e) => (Invocation::Cli(cli::parse()), Some(e)),
    };
    let common = match &invocation {
        Invocation::Cli(args) => Some(args.common()),
        Invocation::Standalone(_) => None,
    };

    // Logging needs the configured level, so the config is read first and
    // any load error is reported once the subscriber is up.
    let config = webpump_config::load_config(common.and_then(|c| c.config.as_deref()));
    let level = common
        .and_then(|c| c.log_level)
        .or_else(|| config.as_ref().ok().map(|c| c.logging.level))
        .unwrap_or_default();
    init_logging(level);

    tracing::info!("webpump v{} starting", env!("CARGO_PKG_VERSION"));
    if let Some(e) = bundle_error {
        tracing::warn!("ignoring unreadable embedded bundle: {e}");
    }

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("failed to load config: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = match invocation {
        Invocation::Standalone(bundle) => run_standalone(bundle, config),
        Invocation::Cli(args) => match args.command {
            Command::Run(run) => run_window(run, config),
            Command::PrintConfig(_) => {
                println!("{}", webpump_config::config_to_json(&config));
                Ok(0)
            }
            Command::Compile(compile) => compile_standalone(&compile),
        },
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run_window(args: RunArgs, mut config: WebpumpConfig) -> Result<u8, WebpumpError> {
    webpump_config::apply_interval_override(&mut config, args.interval_ms)?;
    let source = ContentSource::parse(&args.source);
    let engine = WebViewEngine::new(config.window);
    block_on_session(engine, source, config.bridge.interval_ms)
}

fn run_standalone(bundle: Standalone, config: WebpumpConfig) -> Result<u8, WebpumpError> {
    tracing::info!(
        entry = bundle.entry(),
        files = bundle.assets.len(),
        built_by = %bundle.metadata.version,
        "running embedded site"
    );
    let source = ContentSource::Path(PathBuf::from(bundle.entry()));
    let engine = WebViewEngine::with_assets(config.window, bundle.assets);
    block_on_session(engine, source, config.bridge.interval_ms)
}

fn compile_standalone(args: &CompileArgs) -> Result<u8, WebpumpError> {
    let written = standalone::compile(&args.source, &args.output_path())?;
    println!("{}", written.display());
    Ok(0)
}

/// Open the window and pump it on a current-thread runtime until it closes.
///
/// The runtime stays on the main thread, which macOS requires for the event
/// loop.
fn block_on_session(
    engine: WebViewEngine,
    source: ContentSource,
    interval_ms: i64,
) -> Result<u8, WebpumpError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(pump_until_closed(engine, source, interval_ms))
}

async fn pump_until_closed(
    engine: WebViewEngine,
    source: ContentSource,
    interval_ms: i64,
) -> Result<u8, WebpumpError> {
    let mut bridge = PollBridge::open(engine, &source)?;

    let exit = ExitSignal::new();
    let session = bridge.run(DemoHandler::new(exit.clone()), interval_ms)?;
    exit.attach(session.handle());

    let interrupt = session.handle();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, stopping");
            interrupt.cancel();
        }
    });

    let outcome = session.await;
    ctrl_c.abort();
    let outcome = outcome?;

    tracing::info!(
        ticks = outcome.ticks,
        events = outcome.events_dispatched,
        end = ?outcome.end,
        "session ended"
    );
    Ok(exit_code(&outcome, exit.requested()))
}

/// Process status for a session that ended without error.
fn exit_code(outcome: &SessionOutcome, requested: Option<u8>) -> u8 {
    match requested {
        Some(code) => code,
        None if outcome.is_cancelled() => INTERRUPTED,
        None => 0,
    }
}
