//! UI rendering helpers for the terminal user interface.
//!
//! Everything here reads the player's display snapshot and the event loop's
//! panel state; nothing in this module changes playback.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols::Marker,
    widgets::{
        Block, Borders, Clear, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap,
        canvas::{Canvas, Line, Points},
    },
};
use std::{collections::BTreeMap, sync::LazyLock};

use crate::player::{DisplayState, TransportState};

pub mod wave;

pub use wave::Wave;

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = BTreeMap::new();
    map.insert("space/p", "play/pause");
    map.insert("h/l", "prev/next track");
    map.insert("0-9", "seek to tenth");
    // +/- is filled dynamically from config.
    map.insert("t", "playlist");
    map.insert("v", "volume");
    map.insert("q", "quit");
    map
});

/// Render the controls help text, incorporating the volume step.
fn controls_text(volume_step: f32) -> String {
    let order = ["space/p", "h/l", "0-9", "+/-", "t", "v", "q"];
    order
        .iter()
        .filter_map(|k| {
            if *k == "+/-" {
                Some(format!("[+/-] volume {:.0}%", volume_step * 100.0))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Everything a frame needs, gathered by the event loop.
pub struct View<'a> {
    pub display: &'a DisplayState,
    pub transport: TransportState,
    pub titles: Vec<&'a str>,
    pub active: usize,
    /// Whole seconds until a scheduled start, while one is pending.
    pub countdown: Option<i64>,
    /// A join in progress is settling before its seek.
    pub joining: bool,
    pub notice: Option<&'a str>,
    pub playlist_open: bool,
    pub cursor: usize,
    pub volume_open: bool,
    pub volume_step: f32,
}

/// Split the screen into header, status, waveform, progress and footer.
fn layout(area: Rect) -> [Rect; 5] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(4),
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2], chunks[3], chunks[4]]
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

fn padded(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding {
            left: 1,
            right: 0,
            top: 0,
            bottom: 0,
        })
}

/// The status line: transport, countdown and the latest notice.
fn status_text(view: &View) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(secs) = view.countdown {
        parts.push(format!("{secs} seconds until audio"));
    } else if view.joining {
        parts.push("Joining in progress...".to_string());
    } else {
        let state = match view.transport {
            TransportState::Idle => "Stopped",
            TransportState::Loading => "Loading...",
            TransportState::Playing => "Playing",
            TransportState::Paused => "Paused",
            TransportState::Stopped => "Stopped",
        };
        parts.push(state.to_string());
    }

    if let Some(notice) = view.notice {
        parts.push(notice.to_string());
    }

    parts.join(" • ")
}

/// Render the entire UI into the provided `frame`.
pub fn draw(frame: &mut Frame, view: &View, wave: &mut Wave) {
    let [header_area, status_area, wave_area, progress_area, footer_area] = layout(frame.area());

    let title = if view.display.title.is_empty() {
        "-"
    } else {
        view.display.title.as_str()
    };
    let header = Paragraph::new(title).alignment(Alignment::Center).bold().block(
        Block::default()
            .borders(Borders::ALL)
            .title(" showtime ")
            .title_alignment(Alignment::Center),
    );
    frame.render_widget(header, header_area);

    let status = Paragraph::new(status_text(view))
        .block(padded(" status "))
        .wrap(Wrap { trim: true });
    frame.render_widget(status, status_area);

    // Waveform
    let inner = Block::default().borders(Borders::ALL).inner(wave_area);
    wave.resize(inner.width, inner.height);
    let points = wave.points();
    let visible = view.display.wave_visible || wave.level() > 0.0;
    let canvas = Canvas::default()
        .block(Block::default().borders(Borders::ALL))
        .marker(Marker::Braille)
        .x_bounds([0.0, 1.0])
        .y_bounds([-1.0, 1.0])
        .paint(move |ctx| {
            if visible && !points.is_empty() {
                ctx.draw(&Points {
                    coords: &points,
                    color: Color::Cyan,
                });
            } else {
                ctx.draw(&Line::new(0.0, 0.0, 1.0, 0.0, Color::DarkGray));
            }
        });
    frame.render_widget(canvas, wave_area);

    let progress = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio(view.display.progress.clamp(0.0, 1.0))
        .label(format!("{} / {}", view.display.timer, view.display.duration));
    frame.render_widget(progress, progress_area);

    if view.playlist_open {
        draw_playlist(frame, view, wave_area);
    }
    if view.volume_open {
        draw_volume(frame, view, wave_area);
    }

    let footer = Paragraph::new(controls_text(view.volume_step))
        .block(padded(" controls "))
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, footer_area);
}

/// Playlist overlay; the active track is marked and the cursor highlighted.
fn draw_playlist(frame: &mut Frame, view: &View, area: Rect) {
    let height = u16::try_from(view.titles.len())
        .unwrap_or(u16::MAX)
        .saturating_add(2);
    let popup_area = centered_rect_sized(60, height, area);
    frame.render_widget(Clear, popup_area);

    let items: Vec<ListItem> = view
        .titles
        .iter()
        .enumerate()
        .map(|(i, title)| {
            let marker = if i == view.active { "♪ " } else { "  " };
            ListItem::new(format!("{marker}{title}"))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" playlist (t closes) "))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if !view.titles.is_empty() {
        state.select(Some(view.cursor.min(view.titles.len() - 1)));
    }
    frame.render_stateful_widget(list, popup_area, &mut state);
}

fn draw_volume(frame: &mut Frame, view: &View, area: Rect) {
    let popup_area = centered_rect_sized(40, 5, area);
    frame.render_widget(Clear, popup_area);

    let level = f64::from(view.display.volume).clamp(0.0, 1.0);
    let gauge = Gauge::default()
        .block(padded(" volume (v closes) "))
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(level)
        .label(format!("{:.0}%", level * 100.0));
    frame.render_widget(gauge, popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn controls_text_lists_keys_in_order() {
        let text = controls_text(0.1);
        assert!(text.starts_with("[space/p] play/pause | [h/l] prev/next track"));
        assert!(text.contains("[+/-] volume 10%"));
        assert!(text.ends_with("[q] quit"));
    }

    #[test]
    fn centered_rect_stays_inside_area() {
        let area = Rect::new(0, 0, 30, 10);
        let r = centered_rect_sized(60, 20, area);
        assert_eq!(r.width, 28);
        assert_eq!(r.height, 8);
        assert_eq!((r.x, r.y), (1, 1));
    }

    fn view(display: &DisplayState) -> View<'_> {
        View {
            display,
            transport: TransportState::Idle,
            titles: vec!["a", "b"],
            active: 0,
            countdown: None,
            joining: false,
            notice: None,
            playlist_open: false,
            cursor: 0,
            volume_open: false,
            volume_step: 0.1,
        }
    }

    #[test]
    fn countdown_takes_priority_in_status() {
        let display = DisplayState::default();
        let mut v = view(&display);
        assert_eq!(status_text(&v), "Stopped");
        v.transport = TransportState::Playing;
        assert_eq!(status_text(&v), "Playing");

        v.countdown = Some(42);
        v.notice = Some("track failed to load");
        assert_eq!(
            status_text(&v),
            "42 seconds until audio • track failed to load"
        );
    }
}
