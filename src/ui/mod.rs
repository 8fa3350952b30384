use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::app::state::{AppState, DeskState, View};
use crate::carousel::WindowSlot;
use crate::config::Palette;
use crate::content::Letter;
use crate::highlight::{filter_regex, highlight_spans};
use crate::viewer::display_date;

pub const EMPTY_DESK: &str = "No letters found matching this filter.";
const MAX_DOTS: usize = 24;

pub fn draw_app(frame: &mut Frame, state: &AppState, palette: &Palette) {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(2)])
        .split(frame.size());

    match state.view {
        View::Gate => draw_gate(frame, state, palette, vertical[0]),
        View::Desk => draw_desk(frame, state, palette, vertical[0]),
        View::Letter => draw_letter(frame, state, palette, vertical[0]),
    }

    let status = Paragraph::new(build_status_line(state, palette))
        .style(Style::default().fg(palette.muted));
    frame.render_widget(status, vertical[1]);
}

fn draw_gate(frame: &mut Frame, state: &AppState, palette: &Palette, area: Rect) {
    let panel = centered_rect(60, 50, area);
    let mut lines = vec![
        Line::from(Span::styled(
            "Some letters, kept for you.",
            Style::default().fg(palette.text),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Passphrase: ", Style::default().fg(palette.muted)),
            Span::styled(
                state.gate.input.clone(),
                Style::default().fg(palette.text).add_modifier(Modifier::BOLD),
            ),
            Span::styled("▏", Style::default().fg(palette.accent)),
        ]),
        Line::from(""),
    ];
    if let Some(error) = &state.gate.error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default()
                .fg(palette.error)
                .add_modifier(Modifier::BOLD | Modifier::ITALIC),
        )));
    }

    let paragraph = Paragraph::new(Text::from(lines))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(" ♥ letterdesk ")
                .title_alignment(Alignment::Center)
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(palette.accent)),
        );
    frame.render_widget(Clear, panel);
    frame.render_widget(paragraph, panel);
}

fn draw_desk(frame: &mut Frame, state: &AppState, palette: &Palette, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(area);

    frame.render_widget(filter_bar(&state.desk, palette), rows[0]);

    if state.desk.is_empty() {
        let empty = Paragraph::new(EMPTY_DESK)
            .alignment(Alignment::Center)
            .style(Style::default().fg(palette.muted).add_modifier(Modifier::ITALIC))
            .block(Block::default().borders(Borders::NONE));
        let middle = centered_rect(80, 30, rows[1]);
        frame.render_widget(empty, middle);
        return;
    }

    let regex = filter_regex(state.desk.filter());
    let slots = state.desk.window(state.window_range);
    let constraints: Vec<Constraint> = slots
        .iter()
        .map(|(slot, _)| {
            if slot.offset == 0 {
                Constraint::Fill(3)
            } else {
                Constraint::Fill(2)
            }
        })
        .collect();
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(rows[1]);

    for ((slot, letter), column) in slots.iter().zip(columns.iter()) {
        let read = state.is_read(&letter.id);
        draw_card(frame, *slot, letter, read, regex.as_ref(), palette, *column);
    }

    let position = state.desk.active_position().unwrap_or_default();
    let dots = progress_dots(position, state.desk.visible_len());
    let indicator = Paragraph::new(Line::from(Span::styled(
        dots,
        Style::default().fg(palette.accent),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(indicator, rows[2]);
}

fn filter_bar(desk: &DeskState, palette: &Palette) -> Paragraph<'static> {
    let mut spans = Vec::new();
    let chips = desk.filter().chips();
    if chips.is_empty() {
        spans.push(Span::styled("All letters", Style::default().fg(palette.text)));
    }
    for (idx, chip) in chips.into_iter().enumerate() {
        if idx > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(
            format!("[{chip}]"),
            Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
        ));
    }
    spans.push(Span::styled(
        format!("  {}/{} shown", desk.visible_len(), desk.letters().len()),
        Style::default().fg(palette.muted),
    ));
    if desk.search.active {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("/{}▏", desk.filter().query),
            Style::default().fg(palette.highlight),
        ));
    }
    Paragraph::new(Line::from(spans)).block(
        Block::default()
            .title(" Desk ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.muted)),
    )
}

fn draw_card(
    frame: &mut Frame,
    slot: WindowSlot,
    letter: &Letter,
    read: bool,
    regex: Option<&Regex>,
    palette: &Palette,
    area: Rect,
) {
    let active = slot.offset == 0;
    // Side cards sit lower and shorter, deeper ones more so.
    let depth = slot.offset.unsigned_abs() as u16;
    let inset = depth.min(area.height / 4);
    let card_area = Rect {
        x: area.x,
        y: area.y + inset,
        width: area.width,
        height: area.height.saturating_sub(inset * 2),
    };

    let highlight = Style::default()
        .fg(palette.highlight)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
    let title_style = if active {
        Style::default().fg(palette.text).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(palette.muted)
    };
    let inner_width = card_area.width.saturating_sub(2) as usize;

    let mut lines = vec![Line::from(highlight_spans(
        &truncate_to_width(&letter.title, inner_width),
        regex,
        highlight,
        title_style,
    ))];
    if !letter.date.is_empty() {
        lines.push(Line::from(Span::styled(
            display_date(&letter.date),
            Style::default().fg(palette.muted).add_modifier(Modifier::ITALIC),
        )));
    }
    if let Some(tags) = letter.tag_suffix() {
        lines.push(Line::from(Span::styled(
            truncate_to_width(&tags, inner_width),
            Style::default().fg(palette.accent),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(highlight_spans(
        letter.preview_or_title(),
        regex,
        highlight,
        Style::default().fg(palette.text),
    )));

    let marker = if read { " ✓ read " } else { " ✉ " };
    let border_style = if active {
        Style::default().fg(palette.accent).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(palette.card)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(if active {
            BorderType::Double
        } else {
            BorderType::Rounded
        })
        .border_style(border_style)
        .title_bottom(Line::from(marker).alignment(Alignment::Right));

    let card = Paragraph::new(Text::from(lines))
        .wrap(Wrap { trim: true })
        .block(block);
    frame.render_widget(Clear, card_area);
    frame.render_widget(card, card_area);
}

fn draw_letter(frame: &mut Frame, state: &AppState, palette: &Palette, area: Rect) {
    let Some(viewer) = state.viewer() else {
        let paragraph = Paragraph::new("Nothing is open.")
            .style(Style::default().fg(palette.muted));
        frame.render_widget(paragraph, area);
        return;
    };
    let layout = viewer.layout();
    let regex = filter_regex(state.desk.filter());
    let highlight = Style::default()
        .fg(palette.highlight)
        .add_modifier(Modifier::BOLD);

    let mut lines = Vec::new();
    let mut meta = vec![Span::styled(
        layout.date.clone(),
        Style::default().fg(palette.muted).add_modifier(Modifier::ITALIC),
    )];
    if let Some(tags) = &layout.tags {
        if !layout.date.is_empty() {
            meta.push(Span::raw("  "));
        }
        meta.push(Span::styled(tags.clone(), Style::default().fg(palette.accent)));
    }
    lines.push(Line::from(meta));
    if let Some(audio) = &layout.audio {
        lines.push(Line::from(vec![
            Span::styled("♪ Audio: ", Style::default().fg(palette.accent)),
            Span::styled(audio.label(), Style::default().fg(palette.muted)),
        ]));
    }
    if let Some(image) = &layout.image {
        lines.push(Line::from(vec![
            Span::styled("▣ Cover: ", Style::default().fg(palette.accent)),
            Span::styled(image.label(), Style::default().fg(palette.muted)),
        ]));
    }
    lines.push(Line::from(""));

    let body = viewer.visible_body();
    let body_style = Style::default().fg(palette.text);
    let mut body_lines: Vec<Line> = body
        .split('\n')
        .map(|line| Line::from(highlight_spans(line, regex.as_ref(), highlight, body_style)))
        .collect();
    if viewer.is_revealing() {
        if let Some(last) = body_lines.last_mut() {
            last.spans
                .push(Span::styled("▌", Style::default().fg(palette.accent)));
        }
    }
    lines.extend(body_lines);

    let paragraph = Paragraph::new(Text::from(lines))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(Span::styled(
                    format!(" {} ", layout.title),
                    Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(palette.accent)),
        );
    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

fn build_status_line(state: &AppState, palette: &Palette) -> Text<'static> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut spans = vec![
        Span::raw("View: "),
        Span::styled(state.view.to_string(), bold),
    ];
    if state.view != View::Gate {
        let position = match state.desk.active_position() {
            Some(position) => format!("{}/{}", position + 1, state.desk.visible_len()),
            None => "0/0".to_string(),
        };
        spans.push(Span::raw(" | Letter: "));
        spans.push(Span::styled(position, bold));
        spans.push(Span::raw(format!(" | Read: {}", state.read_count())));
    }
    if let Some(message) = &state.status_message {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            message.clone(),
            Style::default().fg(palette.highlight),
        ));
    }

    let hints = match state.view {
        View::Gate => "Enter unlock · Esc quit",
        View::Desk if state.desk.search.active => "type to search · Enter keep · Esc clear",
        View::Desk => {
            "←/→ move · 1-9 pick · Enter open · t theme · o occasion · c clear · / search · L lock · q quit"
        }
        View::Letter => "Esc back · r replay · Space skip · L lock",
    };
    Text::from(vec![Line::from(spans), Line::from(hints)])
}

/// `●` at the active position; a counter once there are too many dots.
pub fn progress_dots(active: usize, len: usize) -> String {
    if len == 0 {
        return String::new();
    }
    if len > MAX_DOTS {
        return format!("● {}/{}", active + 1, len);
    }
    (0..len)
        .map(|idx| if idx == active { "●" } else { "○" })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Cuts `text` to at most `width` columns, ending with `…` when cut.
pub fn truncate_to_width(text: &str, width: usize) -> String {
    if UnicodeWidthStr::width(text) <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for grapheme in text.graphemes(true) {
        let w = UnicodeWidthStr::width(grapheme);
        if used + w + 1 > width {
            break;
        }
        out.push_str(grapheme);
        used += w;
    }
    out.push('…');
    out
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, ThemeName};
    use crate::content::{parse_letter, ContentFormat};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::time::Instant;

    fn render(state: &AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let palette = ThemeName::Rose.palette();
        terminal
            .draw(|frame| draw_app(frame, state, &palette))
            .unwrap();
        let buffer = terminal.backend().buffer();
        let mut screen = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                screen.push_str(buffer.get(x, y).symbol());
            }
            screen.push('\n');
        }
        screen
    }

    fn state() -> AppState {
        let letters = vec![
            parse_letter(
                "rain",
                "---\ntitle: Rainy Sunday\ndate: 2024-03-03\ntheme: Rain\naudio: /audio/none.mp3\n---\nListening to the rain.",
                ContentFormat::Plain,
            )
            .unwrap(),
            parse_letter(
                "stars",
                "---\ntitle: Stargazing\ndate: 2024-01-09\ntheme: Stars\n---\nCounting them.",
                ContentFormat::Plain,
            )
            .unwrap(),
        ];
        let mut config = AppConfig::default();
        config.viewer.typewriter = false;
        let mut state = AppState::new(letters, &config);
        state.gate.input = "wowyourehot".into();
        assert!(state.submit_passphrase());
        state
    }

    #[test]
    fn gate_shows_error_after_a_miss() {
        let mut state = AppState::new(Vec::new(), &AppConfig::default());
        state.gate.input = "nope".into();
        state.submit_passphrase();
        let screen = render(&state);
        assert!(screen.contains("Passphrase:"));
        assert!(screen.contains("You forgot?!"));
        assert!(screen.contains("Enter unlock"));
    }

    #[test]
    fn desk_draws_cards_and_dots() {
        let state = state();
        let screen = render(&state);
        assert!(screen.contains("Rainy Sunday"));
        assert!(screen.contains("Stargazing"));
        assert!(screen.contains("● ○"));
        assert!(screen.contains("2/2 shown"));
        assert!(screen.contains("Letter: 1/2"));
    }

    #[test]
    fn empty_filter_shows_message() {
        let mut state = state();
        state.desk.set_theme_filter("Coffee");
        let screen = render(&state);
        assert!(screen.contains(EMPTY_DESK));
        assert!(screen.contains("[theme:Coffee]"));
        assert!(screen.contains("Letter: 0/0"));
    }

    #[test]
    fn letter_view_omits_missing_audio() {
        let mut state = state();
        assert!(state.open_selected(Instant::now()));
        let screen = render(&state);
        assert!(screen.contains("Rainy Sunday"));
        assert!(screen.contains("March 3, 2024"));
        assert!(screen.contains("Listening to the rain."));
        assert!(!screen.contains("Audio:"));
        assert!(screen.contains("Read: 1"));
    }

    #[test]
    fn dots_switch_to_counter_for_long_desks() {
        assert_eq!(progress_dots(1, 3), "○ ● ○");
        assert_eq!(progress_dots(29, 30), "● 30/30");
        assert_eq!(progress_dots(0, 0), "");
    }

    #[test]
    fn truncation_respects_display_width() {
        assert_eq!(truncate_to_width("short", 10), "short");
        assert_eq!(truncate_to_width("a longer title", 6), "a lon…");
        assert_eq!(truncate_to_width("💌💌💌", 5), "💌💌…");
    }
}
