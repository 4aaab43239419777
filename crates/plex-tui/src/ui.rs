//! View: renders a [`Session`] snapshot. No state changes besides keeping
//! list selections scrolled into view.

use std::collections::HashSet;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use plex_proto::protocol::FavoriteKind;

use crate::browse::{BrowseEntity, EntityBrowser};
use crate::core::{Mode, Session};
use crate::edit::{EditField, EditForm};
use crate::theme::*;
use crate::widgets::progress_bar::draw_progress;

pub fn draw(frame: &mut Frame, session: &mut Session) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(6),
            Constraint::Length(5),
        ])
        .split(frame.area());

    draw_header(frame, rows[0], session);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(rows[1]);
    draw_main(frame, body[0], session);
    draw_help(frame, body[1], session.mode);

    draw_now_playing(frame, rows[2], session);
    draw_footer(frame, rows[3], session);
}

fn mode_title(mode: Mode) -> &'static str {
    match mode {
        Mode::Playback => "Favorites",
        Mode::EditItem => "Edit Favorite",
        Mode::BrowseArtists => "Artists",
        Mode::BrowseAlbums => "Albums",
        Mode::BrowsePlaylists => "Playlists",
        Mode::BrowseServers => "Servers",
        Mode::BrowsePlayers => "Players",
    }
}

fn draw_header(frame: &mut Frame, area: Rect, session: &Session) {
    let line = Line::from(vec![
        Span::styled(" Plexamp TUI ", style_header()),
        Span::styled("· ", style_muted()),
        Span::styled(mode_title(session.mode), style_value()),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_main(frame: &mut Frame, area: Rect, session: &mut Session) {
    let title = mode_title(session.mode);
    let keys = &session.favorite_keys;
    match session.mode {
        Mode::Playback => draw_list(frame, area, title, &mut session.favorites, |_| false),
        Mode::EditItem => {
            if let Some(form) = &session.edit {
                draw_edit(frame, area, form);
            }
        }
        Mode::BrowseArtists => {
            draw_list(frame, area, title, &mut session.artists, |a| starred(keys, a))
        }
        Mode::BrowseAlbums => {
            draw_list(frame, area, title, &mut session.albums, |a| starred(keys, a))
        }
        Mode::BrowsePlaylists => {
            draw_list(frame, area, title, &mut session.playlists, |p| starred(keys, p))
        }
        Mode::BrowseServers => draw_list(frame, area, title, &mut session.servers, |_| false),
        Mode::BrowsePlayers => draw_list(frame, area, title, &mut session.players, |_| false),
    }
}

fn starred<T: BrowseEntity>(keys: &HashSet<(FavoriteKind, String)>, item: &T) -> bool {
    item.as_favorite()
        .is_some_and(|f| keys.contains(&(f.kind, f.key)))
}

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(style_focused_border())
        .title(Span::styled(format!(" {title} "), style_header()))
}

fn draw_list<T: BrowseEntity>(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    browser: &mut EntityBrowser<T>,
    is_starred: impl Fn(&T) -> bool,
) {
    let counter = format!("{title} ({}/{})", browser.list.len(), browser.list.total_len());
    let block = panel(&counter);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let show_filter = browser.filter.is_active() || !browser.filter.text().is_empty();
    let (filter_area, list_area) = if show_filter && inner.height > 1 {
        (
            Some(Rect { height: 1, ..inner }),
            Rect {
                y: inner.y + 1,
                height: inner.height - 1,
                ..inner
            },
        )
    } else {
        (None, inner)
    };
    if let Some(fa) = filter_area {
        browser.filter.draw(frame, fa);
    }

    let height = list_area.height as usize;
    if browser.list.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled("  nothing here", style_muted())),
            list_area,
        );
        return;
    }
    browser.list.ensure_visible(height);
    let selected_row = browser.list.selected_in_view(height);

    let lines: Vec<Line> = browser
        .list
        .visible_items(height)
        .into_iter()
        .enumerate()
        .map(|(row, (_, item))| {
            let selected = row == selected_row;
            let base = if selected { style_selected() } else { style_default() };
            let mut spans = vec![
                Span::styled(if selected { "▶ " } else { "  " }, base),
            ];
            if is_starred(item) {
                spans.push(Span::styled("★ ", Style::default().fg(C_STARS)));
            }
            spans.push(Span::styled(item.title().to_string(), base));
            if let Some(detail) = item.detail() {
                spans.push(Span::styled(format!("  {detail}"), style_secondary()));
            }
            Line::from(spans)
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), list_area);
}

fn draw_edit(frame: &mut Frame, area: Rect, form: &EditForm) {
    let title = if form.is_new() { "Add Favorite" } else { "Edit Favorite" };
    let block = panel(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let label = |field: EditField, text: &'static str| {
        if form.focus() == field {
            Span::styled(format!("▶ {text:<6}"), style_header())
        } else {
            Span::styled(format!("  {text:<6}"), style_secondary())
        }
    };
    let kind = match form.kind() {
        Some(k) => Span::styled(format!("◀ {} ▶", k.label()), style_value()),
        None => Span::styled("◀ select ▶", style_muted()),
    };
    let lines = vec![
        Line::from(vec![
            label(EditField::Name, "Name"),
            Span::styled(form.name().to_string(), style_default()),
        ]),
        Line::from(vec![label(EditField::Kind, "Type"), kind]),
        Line::from(vec![
            label(EditField::Key, "Key"),
            Span::styled(form.key().to_string(), style_default()),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "Tab/Shift+Tab field · ←/→ type · Enter save · Esc cancel",
            style_muted(),
        )),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}

fn help_lines(mode: Mode) -> Vec<(&'static str, &'static str)> {
    let mut keys = match mode {
        Mode::Playback => vec![
            ("Enter", "play favorite"),
            ("r", "artist radio"),
            ("a / e", "add / edit"),
            ("d", "delete"),
            ("/", "filter"),
            ("q", "quit"),
        ],
        Mode::EditItem => return vec![("Enter", "save"), ("Esc", "cancel")],
        Mode::BrowseArtists => vec![
            ("Enter", "play"),
            ("r", "radio"),
            ("f", "favorite"),
            ("R", "refresh"),
            ("/", "filter"),
            ("Esc", "back"),
        ],
        Mode::BrowseAlbums | Mode::BrowsePlaylists => vec![
            ("Enter", "play"),
            ("f", "favorite"),
            ("R", "refresh"),
            ("/", "filter"),
            ("Esc", "back"),
        ],
        Mode::BrowseServers | Mode::BrowsePlayers => vec![
            ("Enter", "select"),
            ("R", "refresh"),
            ("/", "filter"),
            ("Esc", "back"),
        ],
    };
    keys.extend([
        ("1 2 3", "artists albums playlists"),
        ("6 7", "servers players"),
        ("space", "play / pause"),
        ("n / b", "next / previous"),
        ("+ / -", "volume"),
        ("> / <", "seek 10s"),
        ("h", "shuffle"),
        ("Tab", "next library"),
    ]);
    keys
}

fn draw_help(frame: &mut Frame, area: Rect, mode: Mode) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(style_unfocused_border())
        .title(Span::styled(" Keys ", style_secondary()));
    let lines: Vec<Line> = help_lines(mode)
        .into_iter()
        .map(|(key, what)| {
            Line::from(vec![
                Span::styled(format!("{key:>7} "), style_key_hint()),
                Span::styled(what, style_secondary()),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_now_playing(frame: &mut Frame, area: Rect, session: &Session) {
    let block = panel("Now Playing");
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 {
        return;
    }

    let p = &session.playback;
    let state = if p.track_label.is_empty() {
        Span::styled("■ Stopped", style_muted())
    } else if p.is_playing {
        Span::styled("▶ Playing", Style::default().fg(C_PLAYING))
    } else {
        Span::styled("⏸ Paused", Style::default().fg(C_PAUSED))
    };
    let track = if p.track_label.is_empty() {
        Span::styled("nothing playing", style_muted())
    } else {
        Span::styled(p.track_label.clone(), style_default())
    };
    let lines = vec![
        Line::from(vec![state, Span::raw("  "), track]),
        Line::from(vec![
            Span::styled("Volume ", style_header()),
            Span::styled(format!("{}%", p.volume), style_value()),
        ]),
    ];
    frame.render_widget(
        Paragraph::new(lines),
        Rect {
            height: inner.height.min(2),
            ..inner
        },
    );
    if inner.height > 2 {
        let bar = Rect {
            y: inner.y + 2,
            height: 1,
            ..inner
        };
        draw_progress(frame, bar, session.current_position(), p.duration_ms);
    }
}

fn draw_footer(frame: &mut Frame, area: Rect, session: &Session) {
    let block = Block::default()
        .borders(Borders::TOP)
        .border_type(BorderType::Rounded)
        .border_style(style_focused_border());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let s = &session.settings;
    let mut libraries = vec![
        Span::styled("Library ", style_header()),
        Span::styled("(Tab)", style_key_hint()),
        Span::raw(": "),
    ];
    for (i, lib) in s.plex_libraries.iter().enumerate() {
        if i > 0 {
            libraries.push(Span::raw(" | "));
        }
        let style = if lib.key == s.plex_library_id {
            style_value()
        } else {
            style_secondary()
        };
        libraries.push(Span::styled(lib.title.clone(), style));
    }

    let left = vec![
        Line::from(vec![
            Span::styled("Shuffle ", style_header()),
            Span::styled("(h)", style_key_hint()),
            Span::raw(": "),
            if session.shuffle {
                Span::styled("ON", style_on())
            } else {
                Span::styled("OFF", style_off())
            },
        ]),
        Line::from(libraries),
        Line::from(vec![
            Span::styled("Server ", style_header()),
            Span::styled("(6)", style_key_hint()),
            Span::raw(": "),
            Span::styled(s.plex_server_name.clone(), style_value()),
            Span::raw(" | "),
            Span::styled("Player ", style_header()),
            Span::styled("(7)", style_key_hint()),
            Span::raw(": "),
            Span::styled(s.selected_player_name.clone(), style_value()),
        ]),
        status_line(session),
    ];

    let right = vec![
        Line::from(vec![
            Span::styled("Authenticated: ", style_header()),
            if session.authenticated {
                Span::styled("✓", style_on())
            } else {
                Span::styled("✗", style_off())
            },
        ]),
        Line::from(vec![
            Span::styled("Last Command: ", style_header()),
            Span::styled(session.last_command.clone(), style_value()),
        ]),
    ];

    let width = inner.width as usize;
    let lines: Vec<Line> = left
        .into_iter()
        .enumerate()
        .map(|(i, l)| match right.get(i) {
            Some(r) => join_aligned(l, r.clone(), width),
            None => l,
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn status_line(session: &Session) -> Line<'static> {
    let mut spans = Vec::new();
    if session.using_default_config {
        spans.push(Span::styled(
            "Using default config, press 6 and 7 to pick a server and player  ",
            Style::default().fg(C_PAUSED),
        ));
    }
    if !session.status.is_empty() {
        let style = if session.status.contains("rror") || session.status.contains("required") {
            Style::default().fg(C_ERROR)
        } else {
            style_secondary()
        };
        spans.push(Span::styled(session.status.clone(), style));
    }
    Line::from(spans)
}

/// `left` padded so `right` ends at the right edge.
fn join_aligned(left: Line<'static>, right: Line<'static>, width: usize) -> Line<'static> {
    let used: usize = left
        .spans
        .iter()
        .chain(right.spans.iter())
        .map(|s| UnicodeWidthStr::width(s.content.as_ref()))
        .sum();
    let mut spans = left.spans;
    spans.push(Span::raw(" ".repeat(width.saturating_sub(used).max(1))));
    spans.extend(right.spans);
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aligned_line_fills_width() {
        let line = join_aligned(Line::from("abc"), Line::from("✓ ok"), 20);
        let width: usize = line
            .spans
            .iter()
            .map(|s| UnicodeWidthStr::width(s.content.as_ref()))
            .sum();
        assert_eq!(width, 20);
    }

    #[test]
    fn every_mode_lists_global_keys() {
        for mode in [Mode::Playback, Mode::BrowseArtists, Mode::BrowsePlayers] {
            assert!(help_lines(mode).iter().any(|(k, _)| *k == "Tab"));
        }
        assert!(!help_lines(Mode::EditItem).iter().any(|(k, _)| *k == "Tab"));
    }
}
