use std::{io, path::PathBuf, time::Duration};

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info};

use indicator_atlas::{
    config::{Config, DEFAULT_CONFIG_PATH},
    fetch::{IndicatorSource, OfflineSource, WorldBankClient},
    logging,
    state::AppState,
    ui,
};

/// Terminal dashboard for ASEAN World Bank indicators.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// TOML configuration file; defaults apply when it is missing.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Directory holding `asean.geojson`.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Never touch the network; every fetch fails with an offline error.
    #[arg(long)]
    offline: bool,
}

type Term = Terminal<CrosstermBackend<io::Stdout>>;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::load(&args.config).with_context(|| format!("loading {}", args.config.display()))?;
    if let Some(dir) = args.data_dir {
        config.paths.data_dir = dir;
    }
    logging::init(&config.paths.log_file)
        .with_context(|| format!("opening log file {}", config.paths.log_file.display()))?;
    info!(config = %args.config.display(), offline = args.offline, "starting");

    let source: Box<dyn IndicatorSource> = if args.offline {
        Box::new(OfflineSource)
    } else {
        Box::new(WorldBankClient::new(&config.api).context("building HTTP client")?)
    };

    let mut state = AppState::new(config, source);
    state.start();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = run(&mut terminal, &mut state);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        error!(error = %e, "dashboard stopped");
    }
    result
}

fn run(terminal: &mut Term, state: &mut AppState) -> anyhow::Result<()> {
    loop {
        state.poll_replies();
        terminal.draw(|f| ui::draw(f, state))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(KeyEvent { code, kind: KeyEventKind::Press, .. }) = event::read()? {
                if state.handle_input(code) {
                    return Ok(());
                }
            }
        }
    }
}
