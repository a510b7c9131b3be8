//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding, Paragraph, Wrap},
};

use crate::app::{App, InputMode};
use crate::catalog::{Track, format_duration, format_release_date};
use crate::config::{TimeField, UiSettings};
use crate::playlist::PlaylistSnapshot;
use crate::session::{Notice, NoticeKind};

const CONTROLS: &[(&str, &str)] = &[
    ("j/k", "up/down"),
    ("enter", "open"),
    ("space/p", "play/pause"),
    ("h/l", "prev/next"),
    ("H/L", "skip -/+10s"),
    ("t", "top"),
    ("/", "search"),
    ("d", "downloads"),
    ("f", "filter downloads"),
    ("s", "save"),
    ("b", "background"),
    ("q", "quit"),
];

/// Everything the screen shows, gathered once per frame.
pub struct Screen<'a> {
    pub list: &'a PlaylistSnapshot,
    pub current: Option<&'a Track>,
    pub state_label: &'static str,
    pub playing: bool,
    pub progress_ms: u64,
    pub duration_ms: u64,
    pub loading: bool,
    pub handed_off: bool,
    pub notice: Option<&'a Notice>,
}

fn controls_text() -> String {
    CONTROLS
        .iter()
        .map(|(k, v)| format!("[{k}] {v}"))
        .collect::<Vec<String>>()
        .join(" | ")
}

fn ms_to_secs(ms: u64) -> u32 {
    u32::try_from(ms / 1000).unwrap_or(u32::MAX)
}

/// Build the now-playing time text (elapsed/total/remaining) per `UiSettings`.
pub fn now_playing_time_text(elapsed_ms: u64, total_ms: u64, ui: &UiSettings) -> Option<String> {
    let parts: Vec<String> = ui
        .now_playing_time_fields
        .iter()
        .map(|f| match f {
            TimeField::Elapsed => format_duration(ms_to_secs(elapsed_ms)),
            TimeField::Total => format_duration(ms_to_secs(total_ms)),
            TimeField::Remaining => {
                format!("-{}", format_duration(ms_to_secs(total_ms.saturating_sub(elapsed_ms))))
            }
        })
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(&ui.now_playing_time_separator))
    }
}

/// Small picture shown next to a notice.
fn illustration_art(key: &str) -> &'static str {
    match key {
        "no_results" => "  ( ? )\n  /   \\",
        "no_connectivity" => "  ((x))\n   /|\\",
        "server_error" => "  [!!!]\n  |___|",
        _ => "  ( ~ )\n  /   \\",
    }
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn status_text(screen: &Screen, ui: &UiSettings) -> String {
    let mut parts: Vec<String> = Vec::new();

    parts.push(format!(" LIST: {}", screen.list.tag.label()));

    match screen.current {
        Some(track) => {
            let song = track.display();
            match now_playing_time_text(screen.progress_ms, screen.duration_ms, ui) {
                Some(time) => parts.push(format!("Song: {song} [{time}]")),
                None => parts.push(format!("Song: {song}")),
            }
            let state = if screen.handed_off {
                if screen.playing { "Playing" } else { "Paused" }
            } else {
                screen.state_label
            };
            parts.push(state.to_string());
        }
        None => parts.push("Stopped".to_string()),
    }

    if screen.handed_off {
        parts.push("BACKGROUND".to_string());
    }
    if screen.loading {
        parts.push("Loading...".to_string());
    }

    parts.join(" • ")
}

fn track_detail(track: &Track) -> String {
    format!(
        "Title: {}\nArtist: {}\nAlbum: {}\nReleased: {}\nLength: {}",
        track.title,
        track.artist.name,
        track.album.title,
        format_release_date(track.album.release_date.as_deref()),
        format_duration(track.duration),
    )
}

/// Render the entire UI into the provided `frame`.
pub fn draw(frame: &mut Frame, app: &App, screen: &Screen, ui_settings: &UiSettings) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(3),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" cadenza ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let status_par = Paragraph::new(status_text(screen, ui_settings))
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, chunks[1]);

    draw_list(frame, app, screen, chunks[2]);

    // Input line doubles as the notice line.
    let (prompt, style) = match app.mode {
        InputMode::Search => (format!("search: {}_", app.query), Style::default()),
        InputMode::Filter => (format!("filter downloads: {}_", app.query), Style::default()),
        InputMode::Normal => match screen.notice {
            Some(n) if n.kind == NoticeKind::Error => {
                (n.message.clone(), Style::default().fg(Color::Red))
            }
            Some(n) => (n.message.clone(), Style::default()),
            None => (String::new(), Style::default()),
        },
    };
    let input = Paragraph::new(prompt)
        .style(style)
        .block(Block::default().borders(Borders::ALL).title(" message "));
    frame.render_widget(input, chunks[3]);

    if let Some(key) = screen.notice.and_then(|n| n.illustration) {
        if screen.list.tracks.is_empty() {
            let area = centered_rect_sized(24, 6, chunks[2]);
            frame.render_widget(Clear, area);
            frame.render_widget(
                Paragraph::new(illustration_art(key))
                    .alignment(Alignment::Center)
                    .block(Block::default().borders(Borders::ALL)),
                area,
            );
        }
    }

    let footer = Paragraph::new(controls_text())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[4]);
}

fn draw_list(frame: &mut Frame, app: &App, screen: &Screen, area: Rect) {
    let tracks = &screen.list.tracks;
    let current = screen.list.current_track_id.as_deref();

    // Center the selected item when possible; only build items for the visible window.
    let total = tracks.len();
    let list_height = area.height.saturating_sub(2) as usize;
    let sel_pos = app.selected.min(total.saturating_sub(1));
    let (start, end) = if total <= list_height || list_height == 0 {
        (0, total)
    } else {
        let half = list_height / 2;
        let mut start = sel_pos.saturating_sub(half);
        if start + list_height > total {
            start = total - list_height;
        }
        (start, start + list_height)
    };

    let items: Vec<ListItem> = tracks[start..end]
        .iter()
        .map(|t| {
            let marker = if Some(t.id.as_str()) == current { "♪ " } else { "  " };
            ListItem::new(format!(
                "{marker}{} ({})",
                t.display(),
                format_duration(t.duration)
            ))
        })
        .collect();

    let title = format!(" {} ({}) ", screen.list.tag.label(), total);
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if total > 0 {
        state.select(Some(sel_pos - start));
    }
    frame.render_stateful_widget(list, area, &mut state);

    // Details of the selected row in the right third when there is room.
    if area.width >= 90 {
        if let Some(track) = tracks.get(sel_pos) {
            let detail_area = Rect {
                x: area.x + area.width * 2 / 3,
                y: area.y + 1,
                width: area.width / 3 - 1,
                height: area.height.saturating_sub(2).min(7),
            };
            frame.render_widget(Clear, detail_area);
            frame.render_widget(
                Paragraph::new(track_detail(track))
                    .block(Block::default().borders(Borders::LEFT))
                    .wrap(Wrap { trim: true }),
                detail_area,
            );
        }
    }
}
