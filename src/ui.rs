pub mod field;
pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;
use wordfall::session::{GameSummary, SessionStatus};

use crate::App;

const HORIZONTAL_MARGIN: u16 = 2;

pub fn draw(app: &App, f: &mut Frame) {
    screen::current_screen(&app.state).render(app, f);
}

fn outcome_line(summary: &GameSummary) -> String {
    let headline = match summary.outcome {
        SessionStatus::Won => "You Won!",
        SessionStatus::Lost => "You Lost!",
        SessionStatus::Quit => "Game abandoned",
        SessionStatus::Running => "",
    };
    format!("{headline}  best score {}", summary.final_score)
}

pub struct MenuView<'a>(pub &'a App);

impl Widget for MenuView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let app = self.0;
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let mut lines = vec![
            Line::from(Span::styled(
                "wordfall",
                Style::default().patch(bold_style).fg(Color::Cyan),
            )),
            Line::from(""),
            Line::from(Span::styled(
                format!("High Score: {}", app.high_score),
                bold_style,
            )),
        ];

        if let Some(ref summary) = app.last_summary {
            lines.push(Line::from(""));
            lines.push(Line::from(outcome_line(summary)));
            if !summary.missed_words.is_empty() {
                lines.push(Line::from(Span::styled(
                    format!("missed: {}", summary.missed_joined()),
                    dim_style,
                )));
            }
        }

        if let Some(ref notice) = app.notice {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                notice.clone(),
                Style::default().fg(Color::Red),
            )));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "(n)ew game / (q)uit",
            italic_style,
        )));

        let height = lines.len() as u16;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
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
}

pub struct PlayView<'a>(pub &'a App);

impl Widget for PlayView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let app = self.0;
        let Some(ref session) = app.session else {
            return;
        };

        // styles
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let red_bold_style = Style::default().patch(bold_style).fg(Color::Red);
        let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
        let white_bold_style = Style::default().patch(bold_style).fg(Color::White);
        let dim_bold_style = Style::default()
            .patch(bold_style)
            .add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(area);

        let hud = session.hud();
        let header = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ])
            .split(chunks[0]);
        Paragraph::new(Span::styled(hud.score_line(), bold_style)).render(header[0], buf);
        Paragraph::new(hud.enemies_line())
            .alignment(Alignment::Center)
            .render(header[1], buf);
        Paragraph::new(Span::styled("Press Esc to Quit", italic_style))
            .alignment(Alignment::Right)
            .render(header[2], buf);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue));
        let inner = block.inner(chunks[1]);
        block.render(chunks[1], buf);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        for view in session.word_views() {
            let width = (view.typed.width() + view.untyped.width()) as u16;
            let (col, row) = field::to_cell(view.x, view.y, width, inner);
            let (col, _) = buf.set_stringn(
                col,
                row,
                &view.typed,
                inner.right().saturating_sub(col) as usize,
                red_bold_style,
            );
            let style = if view.focused {
                white_bold_style.add_modifier(Modifier::UNDERLINED)
            } else {
                white_bold_style
            };
            buf.set_stringn(
                col,
                row,
                &view.untyped,
                inner.right().saturating_sub(col) as usize,
                style,
            );
        }

        for popup in &app.popups {
            let label = popup.popup.label();
            let (col, row) =
                field::to_cell(popup.popup.x, popup.popup.y, label.width() as u16, inner);
            let style = if popup.popup.score > 0 {
                green_bold_style
            } else {
                red_bold_style
            };
            buf.set_stringn(
                col,
                row,
                &label,
                inner.right().saturating_sub(col) as usize,
                style,
            );
        }

        let footer = Line::from(vec![
            Span::styled(hud.level_line(), dim_bold_style),
            Span::raw("  "),
            Span::styled(hud.missed_line(), dim_bold_style),
            Span::raw("  "),
            Span::styled(format!("> {}", session.input()), bold_style),
        ]);
        Paragraph::new(footer).render(chunks[2], buf);
    }
}
