use crate::api::Movie;
use crate::state::DisplayState;
use crate::tui::app::App;
use crate::tui::colors;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use std::time::Instant;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Rows taken by one card, including the spacer line
const CARD_HEIGHT: u16 = 4;

const SEARCH_PREFIX: &str = " \u{1F50D} ";

pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title
            Constraint::Length(3), // Search bar
            Constraint::Min(5),    // Results
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    draw_title(frame, chunks[0]);
    draw_search_bar(frame, app, chunks[1]);
    draw_results(frame, app, chunks[2]);
    draw_status_bar(frame, app, chunks[3]);

    if app.search.focused {
        let cursor_x = chunks[1].x
            + 1
            + SEARCH_PREFIX.width() as u16
            + app.search.cursor_column() as u16;
        let cursor_y = chunks[1].y + 1;
        frame.set_cursor_position(Position::new(
            cursor_x.min(chunks[1].right().saturating_sub(2)),
            cursor_y,
        ));
    }
}

fn draw_title(frame: &mut Frame, area: Rect) {
    let line = Line::from(vec![
        Span::raw(" Find the "),
        Span::styled(
            "movies",
            Style::default()
                .fg(colors::ACCENT)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" you enjoy without hassle"),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_search_bar(frame: &mut Frame, app: &App, area: Rect) {
    let border_style = if app.search.focused {
        Style::default().fg(colors::ACCENT)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(" Search ");

    let text = if app.search.query.is_empty() && !app.search.focused {
        Line::from(vec![
            Span::raw(SEARCH_PREFIX),
            Span::styled(
                "Search through thousands of movies",
                Style::default().fg(Color::DarkGray),
            ),
        ])
    } else {
        Line::from(format!("{}{}", SEARCH_PREFIX, app.search.query))
    };

    let paragraph = Paragraph::new(text)
        .block(block)
        .style(Style::default().fg(Color::White));

    frame.render_widget(paragraph, area);
}

fn draw_results(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" All Movies ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if !app.movies().is_empty() {
        draw_cards(frame, app, inner);
        return;
    }

    match app.session.display() {
        DisplayState::Loading => {
            let since = app.session.loading_since().unwrap_or(app.started_at);
            let text = format!("{} Loading...", spinner_frame(since));
            frame.render_widget(
                Paragraph::new(text)
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(colors::ACCENT)),
                centered_line(inner),
            );
        }
        DisplayState::Error(message) => {
            frame.render_widget(
                Paragraph::new(message.as_str())
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true })
                    .style(Style::default().fg(Color::Red)),
                centered_line(inner),
            );
        }
        DisplayState::Loaded(_) => {
            frame.render_widget(
                Paragraph::new("No movies found")
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(Color::DarkGray)),
                centered_line(inner),
            );
        }
    }
}

fn draw_cards(frame: &mut Frame, app: &mut App, area: Rect) {
    let total = app.movies().len();
    app.list.visible_cards = (area.height / CARD_HEIGHT).max(1) as usize;
    app.list.clamp(total);

    let start = app.list.scroll_offset;
    let end = (start + app.list.visible_cards).min(total);
    let width = area.width as usize;

    for (slot, idx) in (start..end).enumerate() {
        let movie = &app.movies()[idx];
        let is_selected = app.list.selected == Some(idx) && !app.search.focused;

        let y = area.y + slot as u16 * CARD_HEIGHT;
        let height = CARD_HEIGHT.saturating_sub(1).min(area.bottom().saturating_sub(y));
        if height == 0 {
            break;
        }

        let card_area = Rect::new(area.x, y, area.width, height);
        frame.render_widget(Paragraph::new(card_lines(movie, is_selected, width)), card_area);
    }
}

/// The three lines of a result card
fn card_lines(movie: &Movie, is_selected: bool, width: usize) -> Vec<Line<'static>> {
    let bg = if is_selected {
        colors::SELECTED_BG
    } else {
        Color::Reset
    };
    let marker = if is_selected { "\u{25B6} " } else { "  " };

    let title = truncate_to_width(movie.display_title(), width.saturating_sub(marker.width() + 1));
    let lang = movie.language_label();

    let title_line = Line::from(vec![
        Span::styled(marker, Style::default().fg(colors::ACCENT).bg(bg)),
        Span::styled(
            title,
            Style::default()
                .fg(Color::White)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ),
    ]);

    let meta_line = Line::from(vec![
        Span::raw("  "),
        Span::styled("\u{2605} ", Style::default().fg(Color::Yellow)),
        Span::styled(
            movie.rating_label(),
            Style::default().fg(colors::rating_color(movie.vote_average)),
        ),
        Span::styled(" \u{2022} ", Style::default().fg(Color::DarkGray)),
        Span::styled(lang.clone(), Style::default().fg(colors::language_color(&lang))),
        Span::styled(" \u{2022} ", Style::default().fg(Color::DarkGray)),
        Span::styled(movie.release_year(), Style::default().fg(Color::Gray)),
    ]);

    let poster = movie
        .poster_url()
        .unwrap_or_else(|| "no poster".to_string());
    let poster_line = Line::from(Span::styled(
        format!("  {}", truncate_to_width(&poster, width.saturating_sub(3))),
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC),
    ));

    vec![title_line, meta_line, poster_line]
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let left_text = if let Some(toast) = &app.toast {
        if toast.is_error {
            format!(" \u{26A0} {}", toast.message)
        } else {
            format!(" {}", toast.message)
        }
    } else {
        let query = app.session.query();
        let label = if query.is_empty() {
            "popular".to_string()
        } else {
            format!("'{}'", query)
        };
        match app.session.display() {
            DisplayState::Loading => format!(" Fetching {}...", label),
            DisplayState::Error(_) => format!(" {} failed", label),
            DisplayState::Loaded(movies) => {
                let count = match app.session.total_results() {
                    Some(total) if total as usize > movies.len() => {
                        format!("{} of {} movies", movies.len(), total)
                    }
                    _ => format!("{} movies", movies.len()),
                };
                let latency = app
                    .session
                    .last_elapsed()
                    .map(|d| format!(" | {}ms", d.as_millis()))
                    .unwrap_or_default();
                format!(" {} | {}{}", count, label, latency)
            }
        }
    };

    let right_text = if app.search.focused {
        " Enter:Search  Tab:Results  Esc:Clear/Quit "
    } else {
        " \u{2191}\u{2193}:Move  o:Open  y:Copy  /:Search  Esc:Back "
    };

    let available_width = area.width as usize;
    let left_len = left_text.width();
    let right_len = right_text.width();

    let status_str = if left_len + right_len < available_width {
        let padding = available_width - left_len - right_len;
        format!("{}{:padding$}{}", left_text, "", right_text, padding = padding)
    } else {
        truncate_to_width(&left_text, available_width)
    };

    let fg = if app.toast.as_ref().is_some_and(|t| t.is_error) {
        Color::LightRed
    } else {
        Color::White
    };
    let status = Paragraph::new(status_str).style(Style::default().fg(fg).bg(colors::STATUS_BG));

    frame.render_widget(status, area);
}

/// One line in the vertical middle of `area`
fn centered_line(area: Rect) -> Rect {
    let y = area.y + area.height.saturating_sub(1) / 2;
    Rect::new(area.x, y, area.width, area.bottom().saturating_sub(y).min(3))
}

fn spinner_frame(started_at: Instant) -> &'static str {
    const FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
    let elapsed = started_at.elapsed().as_millis() / 80;
    FRAMES[(elapsed as usize) % FRAMES.len()]
}

/// Cut `text` to at most `max` display columns, marking the cut with an ellipsis
fn truncate_to_width(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('\u{2026}');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn truncation_keeps_short_text() {
        assert_eq!(truncate_to_width("Heat", 10), "Heat");
        assert_eq!(truncate_to_width("Heat", 4), "Heat");
    }

    #[test]
    fn truncation_counts_display_columns() {
        assert_eq!(truncate_to_width("The Godfather", 6), "The G\u{2026}");
        assert_eq!(truncate_to_width("千と千尋の神隠し", 5), "千と\u{2026}");
        assert_eq!(truncate_to_width("anything", 0), "");
    }

    #[test]
    fn card_shows_title_rating_language_year() {
        let movie: Movie = serde_json::from_value(json!({
            "id": 1,
            "title": "Parasite",
            "vote_average": 8.5,
            "original_language": "ko",
            "release_date": "2019-05-30"
        }))
        .unwrap();

        let lines = card_lines(&movie, false, 80);
        let text: Vec<String> = lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();

        assert_eq!(text.len(), 3);
        assert!(text[0].contains("Parasite"));
        assert!(text[1].contains("8.5"));
        assert!(text[1].contains("KO"));
        assert!(text[1].contains("2019"));
        assert!(text[2].contains("no poster"));
    }
}
