mod cli;

use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use tracing::info;

use fragment_host::analytics::LogSink;
use fragment_host::config::HostConfig;
use fragment_host::dom::PageSpec;
use fragment_host::host::PageHost;
use fragment_host::logging::init_tracing;
use fragment_host::platform::HeadlessPlatform;
use fragment_host::scheduler::{SharedScheduler, TokioScheduler, VirtualScheduler};
use fragment_host::util::{parse_timestamp, BreakpointTable};

use cli::{Cli, Command, RunArgs};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => HostConfig::load_from(path)?,
        None => HostConfig::load()?,
    };
    init_tracing(&config.logging.filter);

    match cli.command {
        Command::Run(args) => run(&config, &args),
        Command::Breakpoint { width, preset } => {
            let table = match preset {
                Some(preset) => BreakpointTable::preset(preset),
                None => config.breakpoints.table()?,
            };
            println!("{}", table.resolve(width));
            Ok(())
        }
        Command::RelativeTime {
            timestamp,
            now,
            style,
        } => {
            let reference = parse_timestamp(&timestamp)?;
            let now = parse_now(now.as_deref())?;
            println!("{}", style.format(reference, now));
            Ok(())
        }
    }
}

fn parse_now(raw: Option<&str>) -> Result<DateTime<Utc>> {
    match raw {
        Some(raw) => parse_timestamp(raw).context("invalid --now"),
        None => Ok(Utc::now()),
    }
}

fn run(config: &HostConfig, args: &RunArgs) -> Result<()> {
    let page = PageSpec::load(&args.page)?;
    if args.realtime {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .context("failed to start tokio runtime")?;
        return runtime.block_on(async {
            let scheduler = Rc::new(TokioScheduler::new(tokio::runtime::Handle::current()));
            let host = start_host(config, &page, &args.page, scheduler.clone())?;
            let ran = scheduler.run_for(Duration::from_millis(args.advance_ms)).await;
            info!(ran, live = host.live_count(), "real-time run finished");
            Ok::<(), anyhow::Error>(())
        });
    }

    let scheduler = Rc::new(VirtualScheduler::new(parse_now(args.now.as_deref())?));
    let host = start_host(config, &page, &args.page, scheduler.clone())?;
    let ran = scheduler.advance(Duration::from_millis(args.advance_ms));
    info!(ran, live = host.live_count(), "virtual run finished");
    Ok(())
}

fn start_host(
    config: &HostConfig,
    page: &PageSpec,
    path: &Path,
    scheduler: SharedScheduler,
) -> Result<PageHost> {
    let host = PageHost::new(
        config,
        page.to_document().into_shared(),
        scheduler,
        Rc::new(HeadlessPlatform::new()),
        Rc::new(LogSink),
    )
    .with_context(|| format!("failed to host page {}", path.display()))?;

    host.bus().subscribe(|notification| println!("{}", notification.to_json()));
    let started = host.start();
    info!(started, page = %path.display(), "page started");
    Ok(host)
}
