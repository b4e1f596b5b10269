use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Gauge, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthChar;

use crate::config::Config;
use crate::game::{GamePhase, TICK_SECS};
use crate::snapshot::GameSnapshot;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

/// Stateless view over one frame's snapshot; owns no game state.
pub struct Screen<'a> {
    pub snapshot: &'a GameSnapshot,
    pub config: &'a Config,
}

impl Widget for Screen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.snapshot.phase {
            GamePhase::Intro => render_intro(self.config, area, buf),
            GamePhase::Playing => render_playing(self.snapshot, self.config, area, buf),
            GamePhase::GameOver => render_game_over(self.snapshot, area, buf),
        }
    }
}

fn render_intro(config: &Config, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_style = Style::default().add_modifier(Modifier::DIM);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let lines = vec![
        Line::from(Span::styled("古米マーケット", bold_style.fg(Color::Yellow))),
        Line::from(Span::styled("Old Rice Market", bold_style)),
        Line::default(),
        Line::from(Span::styled(
            format!("'{}' types 古   '{}' types 米", config.old_key, config.rice_key),
            Style::default(),
        )),
        Line::default(),
        Line::from(Span::styled(
            "type old rice to cover the shortage",
            dim_style,
        )),
        Line::from(Span::styled(
            format!(
                "{} mistakes end the run, and every mistake speeds up consumption",
                config.max_errors
            ),
            dim_style,
        )),
        Line::from(Span::styled(
            "the longer the stock survives, the higher the score",
            dim_style,
        )),
        Line::default(),
        Line::from(Span::styled("(enter) start / (esc) quit", italic_style)),
    ];

    centered(lines, area, buf);
}

fn render_playing(snapshot: &GameSnapshot, config: &Config, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_style = Style::default().add_modifier(Modifier::DIM);
    let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
    let red_style = Style::default().fg(Color::Red);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // status row
            Constraint::Length(1), // key guide
            Constraint::Length(1), // padding
            Constraint::Length(1), // target
            Constraint::Length(1), // input echo
            Constraint::Length(1), // lockout notice
            Constraint::Length(1), // padding
            Constraint::Length(1), // stock header
            Constraint::Min(1),    // stock rows
        ])
        .split(area);

    // status: elapsed left, penalties right
    let status_halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[0]);

    Paragraph::new(Line::from(vec![
        Span::styled(format!("time {:>6.1}s", snapshot.elapsed_secs), bold_style),
        Span::raw("   "),
        Span::styled(format!("sets {}", snapshot.completed_units), Style::default()),
    ]))
    .render(status_halves[0], buf);

    let boost = snapshot.penalty.speed_multiplier;
    let boost_style = if boost > 1.0 { red_style } else { Style::default() };
    let miss_style = if snapshot.penalty.error_count > 0 {
        red_style
    } else {
        Style::default()
    };
    Paragraph::new(Line::from(vec![
        Span::styled(format!("speed x{:.1}", boost), boost_style),
        Span::raw("   "),
        Span::styled(
            format!(
                "miss {}/{}",
                snapshot.penalty.error_count, snapshot.penalty.max_errors
            ),
            miss_style,
        ),
    ]))
    .alignment(Alignment::Right)
    .render(status_halves[1], buf);

    Paragraph::new(Span::styled(
        format!("{}:古  {}:米", config.old_key, config.rice_key),
        dim_style,
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    // target: current unit highlighted, the rest of the rolling buffer dim
    let visible = fit_to_width(&snapshot.target_text, chunks[3].width.saturating_sub(8));
    let (head, tail) = split_at_chars(&visible, snapshot.current_unit_len);
    Paragraph::new(Line::from(vec![
        Span::styled("target ", dim_style),
        Span::styled(head, Style::default().patch(bold_style).fg(Color::Blue)),
        Span::styled(tail, dim_style),
    ]))
    .render(chunks[3], buf);

    // input echo: everything typed so far is correct by construction
    let mut input_spans = vec![Span::styled("typed  ", dim_style)];
    for symbol in &snapshot.typed {
        input_spans.push(Span::styled(symbol.to_string(), green_bold_style));
    }
    if let Some(next) = snapshot.expected_symbol() {
        input_spans.push(Span::styled(
            next.to_string(),
            Style::default()
                .patch(dim_style)
                .add_modifier(Modifier::UNDERLINED),
        ));
    }
    Paragraph::new(Line::from(input_spans)).render(chunks[4], buf);

    if snapshot.penalty.locked {
        let secs_left = snapshot.penalty.ticks_remaining as f64 * TICK_SECS;
        Paragraph::new(Span::styled(
            format!("miss! input locked for {:.1}s", secs_left),
            red_style.add_modifier(Modifier::BOLD),
        ))
        .render(chunks[5], buf);
    }

    Paragraph::new(Span::styled(
        format!("stock ({} sets)", snapshot.inventory.len()),
        bold_style,
    ))
    .render(chunks[7], buf);

    render_stock_rows(snapshot, chunks[8], buf);
}

fn render_stock_rows(snapshot: &GameSnapshot, area: Rect, buf: &mut Buffer) {
    let dim_style = Style::default().add_modifier(Modifier::DIM);

    for (idx, stock) in snapshot.inventory.iter().enumerate() {
        if idx as u16 >= area.height {
            break;
        }
        let row = Rect::new(area.x, area.y + idx as u16, area.width, 1);

        if idx as u16 == area.height - 1 && snapshot.inventory.len() as u16 > area.height {
            Paragraph::new(Span::styled("…", dim_style)).render(row, buf);
            break;
        }

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(24), Constraint::Min(10)])
            .split(row);

        let label = if idx == 0 {
            Line::from(vec![
                Span::styled("▶ ", Style::default().fg(Color::Yellow)),
                Span::raw(format!("{}. {}", idx + 1, stock.text)),
            ])
        } else {
            Line::from(Span::styled(
                format!("  {}. {}", idx + 1, stock.text),
                dim_style,
            ))
        };
        Paragraph::new(label).render(columns[0], buf);

        let gauge_style = if idx == 0 {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Gauge::default()
            .gauge_style(gauge_style)
            .ratio(stock.ratio())
            .label(format!("{:.1}/{}", stock.remaining.max(0.0), stock.capacity))
            .render(columns[1], buf);
    }
}

fn render_game_over(snapshot: &GameSnapshot, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let reason = snapshot
        .reason
        .map(|r| r.to_string())
        .unwrap_or_default();

    let lines = vec![
        Line::from(Span::styled("game over", bold_style.fg(Color::Yellow))),
        Line::default(),
        Line::from(Span::styled(reason, Style::default().fg(Color::Red))),
        Line::from(Span::styled(
            format!("survived {:.1}s", snapshot.score_secs.unwrap_or_default()),
            bold_style,
        )),
        Line::default(),
        Line::from(Span::styled("(enter) restart / (esc) quit", italic_style)),
    ];

    centered(lines, area, buf);
}

fn centered(lines: Vec<Line>, area: Rect, buf: &mut Buffer) {
    let height = lines.len() as u16;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(area.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[1], buf);
}

/// Truncates to as many leading chars as fit the given cell budget; the
/// target glyphs are double-width, so cells rather than chars must be
/// counted.
fn fit_to_width(text: &str, max_cells: u16) -> String {
    let mut cells = 0usize;
    let mut out = String::new();
    for c in text.chars() {
        cells += c.width().unwrap_or(0);
        if cells > max_cells as usize {
            break;
        }
        out.push(c);
    }
    out
}

fn split_at_chars(text: &str, chars: usize) -> (String, String) {
    let head = text.chars().take(chars).collect();
    let tail = text.chars().skip(chars).collect();
    (head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{ControlInput, GameConfig, GameSession};
    use ratatui::{backend::TestBackend, Terminal};

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    fn draw(session: &GameSession) -> Terminal<TestBackend> {
        let config = Config::default();
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        let snapshot = session.snapshot();
        terminal
            .draw(|f| {
                f.render_widget(
                    Screen {
                        snapshot: &snapshot,
                        config: &config,
                    },
                    f.area(),
                )
            })
            .unwrap();
        terminal
    }

    fn seeded_session() -> GameSession {
        GameSession::new(GameConfig {
            seed: Some(99),
            ..GameConfig::default()
        })
    }

    #[test]
    fn intro_screen_renders() {
        let session = seeded_session();
        let terminal = draw(&session);
        let content = buffer_text(&terminal);
        assert!(content.contains("Old Rice Market"));
        assert!(content.contains("start"));
    }

    #[test]
    fn playing_screen_renders_target_and_stock() {
        let mut session = seeded_session();
        session.submit_control(ControlInput::Start);
        let terminal = draw(&session);
        let content = buffer_text(&terminal);
        assert!(content.contains("target"));
        assert!(content.contains("stock"));
        // wide glyphs get a trailing continuation cell, so check per char
        assert!(content.contains('古'));
        assert!(content.contains('米'));
    }

    #[test]
    fn game_over_screen_shows_reason_and_score() {
        let mut session = seeded_session();
        session.submit_control(ControlInput::Start);
        session.submit_control(ControlInput::Quit);
        let terminal = draw(&session);
        let content = buffer_text(&terminal);
        assert!(content.contains("game over"));
        assert!(content.contains("manual exit"));
        assert!(content.contains("survived"));
    }

    #[test]
    fn fit_to_width_counts_double_width_glyphs() {
        assert_eq!(fit_to_width("古米古米", 4), "古米");
        assert_eq!(fit_to_width("古米", 40), "古米");
        assert_eq!(fit_to_width("古米", 1), "");
    }

    #[test]
    fn split_at_chars_is_char_based() {
        let (head, tail) = split_at_chars("古古米米", 2);
        assert_eq!(head, "古古");
        assert_eq!(tail, "米米");
    }
}
