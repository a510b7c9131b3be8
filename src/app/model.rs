//! Application model types: `App` and `InputMode`.

use crate::catalog::Track;
use crate::playlist::PlaylistSnapshot;

/// What keystrokes are currently feeding.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    /// Typing a catalog search query.
    Search,
    /// Typing a filter over downloaded tracks.
    Filter,
}

/// A query the user confirmed with enter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Submitted {
    Search(String),
    Filter(String),
}

/// The main application model.
#[derive(Debug, Default)]
pub struct App {
    pub selected: usize,
    pub mode: InputMode,
    pub query: String,
    /// Set while `b` pretends the app left the foreground.
    pub simulated_background: bool,
    /// Cursor follows the current track until the user moves it.
    pub follow_current: bool,
}

impl App {
    pub fn new() -> Self {
        Self {
            follow_current: true,
            ..Self::default()
        }
    }

    pub fn is_typing(&self) -> bool {
        self.mode != InputMode::Normal
    }

    pub fn enter_search(&mut self) {
        self.mode = InputMode::Search;
        self.query.clear();
    }

    pub fn enter_filter(&mut self) {
        self.mode = InputMode::Filter;
        self.query.clear();
    }

    pub fn push_char(&mut self, c: char) {
        if self.is_typing() && !c.is_control() {
            self.query.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        self.query.pop();
    }

    /// Leave input mode without submitting.
    pub fn cancel_input(&mut self) {
        self.mode = InputMode::Normal;
        self.query.clear();
    }

    /// Leave input mode and hand back what was typed.
    ///
    /// A blank search is dropped; a blank filter means "all downloads".
    pub fn submit(&mut self) -> Option<Submitted> {
        let mode = std::mem::take(&mut self.mode);
        let query = std::mem::take(&mut self.query);
        let trimmed = query.trim().to_string();
        self.reset_cursor();
        match mode {
            InputMode::Normal => None,
            InputMode::Search if trimmed.is_empty() => None,
            InputMode::Search => Some(Submitted::Search(trimmed)),
            InputMode::Filter => Some(Submitted::Filter(trimmed)),
        }
    }

    /// Flip the simulated background flag and return the new visibility.
    pub fn toggle_background(&mut self) -> bool {
        self.simulated_background = !self.simulated_background;
        !self.simulated_background
    }

    /// Move the cursor to the top of a freshly shown list.
    pub fn reset_cursor(&mut self) {
        self.selected = 0;
        self.follow_current = true;
    }

    /// Move selection to the next row, wrapping around.
    pub fn next(&mut self, len: usize) {
        self.follow_current = false;
        if len == 0 {
            self.selected = 0;
        } else {
            self.selected = (self.selected + 1) % len;
        }
    }

    /// Move selection to the previous row, wrapping around.
    pub fn prev(&mut self, len: usize) {
        self.follow_current = false;
        if len == 0 {
            self.selected = 0;
        } else if self.selected == 0 || self.selected >= len {
            self.selected = len - 1;
        } else {
            self.selected -= 1;
        }
    }

    /// Keep the cursor inside the list and, when following, on the current track.
    pub fn sync(&mut self, snapshot: &PlaylistSnapshot) {
        if self.follow_current {
            if let Some(pos) = snapshot.current_position() {
                self.selected = pos;
            }
        }
        if self.selected >= snapshot.tracks.len() {
            self.selected = snapshot.tracks.len().saturating_sub(1);
        }
    }

    pub fn selected_track<'a>(&self, snapshot: &'a PlaylistSnapshot) -> Option<&'a Track> {
        snapshot.tracks.get(self.selected)
    }

    /// The user picked a row to open; follow it from now on.
    pub fn follow(&mut self) {
        self.follow_current = true;
    }
}
