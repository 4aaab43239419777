//! Smooth Unicode progress bar widget.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use plex_proto::protocol::format_time;

use crate::theme::{C_MUTED, C_PLAYING, C_SECONDARY};

/// Fraction of `duration_ms` covered by `position_ms`, 0.0 when the
/// duration is unknown.
pub fn ratio(position_ms: u64, duration_ms: u64) -> f64 {
    if duration_ms == 0 {
        return 0.0;
    }
    (position_ms as f64 / duration_ms as f64).clamp(0.0, 1.0)
}

/// Render `position / duration` as a bar with `m:ss` labels on both sides.
pub fn draw_progress(frame: &mut Frame, area: Rect, position_ms: u64, duration_ms: u64) {
    if area.width < 4 || area.height == 0 {
        return;
    }

    let left_label = format_time(position_ms);
    let right_label = format_time(duration_ms);
    let label_w = (left_label.len() + right_label.len() + 2) as u16;
    let bar_w = area.width.saturating_sub(label_w).max(4) as usize;

    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(format!("{left_label} "), Style::default().fg(C_SECONDARY)),
            Span::styled(
                bar(ratio(position_ms, duration_ms), bar_w),
                Style::default().fg(C_PLAYING),
            ),
            Span::styled(format!(" {right_label}"), Style::default().fg(C_MUTED)),
        ])),
        area,
    );
}

/// 8 eighths per cell.
fn bar(progress: f64, width: usize) -> String {
    const BLOCKS: [char; 9] = [' ', '▏', '▎', '▍', '▌', '▋', '▊', '▉', '█'];

    let eighths = (progress.clamp(0.0, 1.0) * width as f64 * 8.0) as usize;
    let full_blocks = eighths / 8;
    let partial = eighths % 8;

    let mut out = String::with_capacity(width * 3);
    for _ in 0..full_blocks.min(width) {
        out.push('█');
    }
    if full_blocks < width {
        out.push(BLOCKS[partial]);
        for _ in (full_blocks + 1)..width {
            out.push(' ');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_handles_unknown_duration() {
        assert_eq!(ratio(5_000, 0), 0.0);
        assert_eq!(ratio(5_000, 10_000), 0.5);
        assert_eq!(ratio(20_000, 10_000), 1.0);
    }

    #[test]
    fn bar_has_fixed_width() {
        assert_eq!(bar(0.0, 10).chars().count(), 10);
        assert_eq!(bar(0.55, 10).chars().count(), 10);
        assert_eq!(bar(1.0, 10), "█".repeat(10));
    }
}
