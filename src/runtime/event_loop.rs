use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::debug;

use crate::app::{App, Submitted};
use crate::config;
use crate::handoff::LifecycleTracker;
use crate::session::SessionController;
use crate::ui;

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    /// Terminal focus as last reported by the terminal.
    pub focused: bool,
    /// Turns focus and the `b` toggle into lifecycle transitions.
    pub lifecycle: LifecycleTracker,
}

impl EventLoopState {
    pub fn new() -> Self {
        Self {
            focused: true,
            lifecycle: LifecycleTracker::new(),
        }
    }

    /// Visible means focused and not pretending to be in the background.
    fn update_visibility(&mut self, app: &App, session: &mut SessionController) {
        let visible = self.focused && !app.simulated_background;
        if let Some(event) = self.lifecycle.observe(visible) {
            debug!(?event, "lifecycle");
            session.on_lifecycle(event);
        }
    }
}

/// Main terminal event loop: handles input, UI drawing and session updates.
/// Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    session: &mut SessionController,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        session.pump();

        let snapshot = session.registry().snapshot();
        app.sync(&snapshot);

        let current = session.current_track().get();
        let notice = session.notice().get();
        let screen = ui::Screen {
            list: &snapshot,
            current: current.as_ref(),
            state_label: session.playback_state().get().label(),
            playing: session.is_playing(),
            progress_ms: session.progress().get(),
            duration_ms: session.duration().get(),
            loading: session.loading().get(),
            handed_off: session.is_handed_off(),
            notice: notice.as_ref(),
        };
        terminal.draw(|f| ui::draw(f, app, &screen, &settings.ui))?;

        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        match event::read()? {
            Event::FocusGained => {
                state.focused = true;
                state.update_visibility(app, session);
            }
            Event::FocusLost => {
                state.focused = false;
                state.update_visibility(app, session);
            }
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if handle_key_event(key, app, session, state) {
                    return Ok(());
                }
            }
            _ => {}
        }
    }
}

/// Returns `true` when the user asked to quit.
fn handle_key_event(
    key: KeyEvent,
    app: &mut App,
    session: &mut SessionController,
    state: &mut EventLoopState,
) -> bool {
    if app.is_typing() {
        match key.code {
            KeyCode::Esc => app.cancel_input(),
            KeyCode::Backspace => app.pop_char(),
            KeyCode::Enter => match app.submit() {
                Some(Submitted::Search(query)) => session.search(&query),
                Some(Submitted::Filter(query)) => session.filter_downloaded(&query),
                None => {}
            },
            KeyCode::Char(c) => app.push_char(c),
            _ => {}
        }
        return false;
    }

    let snapshot = session.registry().snapshot();
    let len = snapshot.tracks.len();
    session.clear_notice();

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('t') => {
            app.reset_cursor();
            session.load_top();
        }
        KeyCode::Char('/') => app.enter_search(),
        KeyCode::Char('f') => app.enter_filter(),
        KeyCode::Char('d') => {
            app.reset_cursor();
            session.show_downloads();
        }
        KeyCode::Char('j') | KeyCode::Down => app.next(len),
        KeyCode::Char('k') | KeyCode::Up => app.prev(len),
        KeyCode::Enter => {
            if let Some(track) = app.selected_track(&snapshot) {
                app.follow();
                session.load_track(&track.id, true);
            }
        }
        KeyCode::Char('p') | KeyCode::Char(' ') => session.toggle_play_pause(),
        KeyCode::Char('l') => {
            app.follow();
            session.next_track();
        }
        KeyCode::Char('h') => {
            app.follow();
            session.previous_track();
        }
        KeyCode::Char('L') => session.skip_forward(),
        KeyCode::Char('H') => session.skip_backward(),
        KeyCode::Char('s') => {
            if let Some(track) = app.selected_track(&snapshot) {
                session.download(track);
            }
        }
        KeyCode::Char('b') => {
            app.toggle_background();
            state.update_visibility(app, session);
        }
        _ => {}
    }

    false
}
