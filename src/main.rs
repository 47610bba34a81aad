use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};

use sysdash::config::{Overrides, Settings};
use sysdash::source::{MetricsSource, ScriptedSource, SysinfoSource};
use sysdash::tracker::Tracker;
use sysdash::ui::{self, Theme};
use sysdash::{events, export, logging, App};

#[derive(Parser, Debug)]
#[command(name = "sysdash")]
#[command(about = "Terminal dashboard for CPU, memory, network and disk activity")]
struct Args {
    /// TOML settings file (overridden by SYSDASH_* variables and flags)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Sampling interval (e.g., "1s", "500ms")
    #[arg(short, long)]
    interval: Option<String>,

    /// Samples kept per chart
    #[arg(long)]
    history: Option<usize>,

    /// Use synthetic data instead of the host
    #[arg(long)]
    demo: bool,

    /// Sample for a few intervals, export state to a JSON file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let overrides = Overrides {
        interval: args.interval.clone(),
        history_capacity: args.history,
        log_file: args.log_file.clone(),
        log_level: args.log_level.clone(),
    };
    let settings =
        Settings::load(args.config.as_deref(), &overrides).context("Invalid configuration")?;

    // Held until exit so buffered log lines are flushed.
    let _log = match settings.log_file {
        Some(ref path) => Some(logging::init(path, settings.log_level)?),
        None => None,
    };

    // Platform support is checked here, once, before anything starts.
    let (sampling_source, query_source) = create_sources(args.demo)?;
    info!(source = query_source.description(), "Starting");

    let rt = tokio::runtime::Runtime::new()?;
    let _guard = rt.enter();

    let tracker = Tracker::new(sampling_source, settings.tracker_config());

    // Handle export mode (non-interactive)
    if let Some(export_path) = args.export {
        return rt.block_on(export_headless(tracker, query_source, &export_path, &settings));
    }

    run_tui(&rt, tracker, query_source, &settings)
}

/// One source for the tracker, one for the presenter's direct queries.
fn create_sources(demo: bool) -> Result<(Box<dyn MetricsSource>, Box<dyn MetricsSource>)> {
    if demo {
        return Ok((Box::new(ScriptedSource::demo()), Box::new(ScriptedSource::demo())));
    }

    let sampling = SysinfoSource::new().context("Cannot monitor this platform")?;
    let queries = SysinfoSource::new().context("Cannot monitor this platform")?;
    Ok((Box::new(sampling), Box::new(queries)))
}

/// Sample for a short warm-up, then write the export file.
async fn export_headless(
    mut tracker: Tracker,
    mut source: Box<dyn MetricsSource>,
    export_path: &Path,
    settings: &Settings,
) -> Result<()> {
    // Three samples: two of them carry rates.
    let warmup = settings.interval * 2 + settings.interval / 2;

    tracker.start();
    tokio::time::sleep(warmup).await;
    if !tracker.shutdown(settings.stop_timeout).await {
        warn!("Exporting while the sampling task is still winding down");
    }

    let static_info = match source.static_info() {
        Ok(info) => Some(info),
        Err(e) => {
            warn!(error = %e, "Exporting without static info");
            None
        }
    };

    export::write_export(
        export_path,
        &tracker.latest(),
        static_info.as_ref(),
        source.description(),
    )?;

    println!("Exported dashboard state to: {}", export_path.display());
    Ok(())
}

/// Run the TUI until the user quits
fn run_tui(
    rt: &tokio::runtime::Runtime,
    tracker: Tracker,
    source: Box<dyn MetricsSource>,
    settings: &Settings,
) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    // Create app, load the one-shot data and start sampling
    let mut app = App::new(tracker, source, settings);
    app.theme = Theme::auto_detect();
    app.refresh_all();
    app.resume();

    // Run the main loop
    let result = run_app(&mut terminal, &mut app, settings.interval);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if !rt.block_on(app.shutdown(settings.stop_timeout)) {
        eprintln!("Sampling did not stop within {:?}; exiting anyway", settings.stop_timeout);
    }

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    refresh_interval: Duration,
) -> Result<()> {
    let mut last_refresh = Instant::now();

    while app.running {
        app.poll_metrics();

        terminal.draw(|frame| ui::draw(frame, app))?;

        // Poll for events with a short timeout
        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => {
                    events::handle_mouse_event(app, mouse, ui::CONTENT_START_ROW);
                }
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }

        // Refresh the directly queried data periodically
        if last_refresh.elapsed() >= refresh_interval {
            app.tick();
            last_refresh = Instant::now();
        }
    }

    Ok(())
}
