use crossterm::event::{DisableFocusChange, EnableFocusChange};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::App;
use crate::logging;

mod event_loop;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, rejected) = settings::load_settings();

    let log_file = settings.log_file();
    if let Err(e) = logging::init(&settings.logging, &log_file) {
        eprintln!("cadenza: cannot open log file {}: {e}", log_file.display());
    }
    if let Some(reason) = rejected {
        warn!(%reason, "using default settings");
    }

    let mut session = startup::build_session(&settings)?;
    session.load_top();
    let mut app = App::new();

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let mut state = event_loop::EventLoopState::new();
        event_loop::run(&mut terminal, &settings, &mut app, &mut session, &mut state)
    })();

    if let Err(e) = &run_result {
        warn!(error = %e, "event loop failed");
    }
    session.shutdown();
    info!("stopped");

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableFocusChange, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
