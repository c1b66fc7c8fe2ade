use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph},
};

use super::game::DuelGame;
use super::pool::MovePool;
use super::protocol::MoveKind;

#[derive(Debug)]
pub struct DuelRenderer;

impl DuelRenderer {
    pub fn render(frame: &mut Frame, game: &DuelGame) {
        let session = game.session();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Length(3), // Status
                Constraint::Length(6), // Health
                Constraint::Length(4), // Pools
                Constraint::Min(3),    // Log
                Constraint::Length(1), // Keys
            ])
            .split(frame.area());

        let header = Paragraph::new(format!(
            "⚔ DUEL ⚔  you are the {}  ·  round {}",
            session.role(),
            session.round()
        ))
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
        frame.render_widget(header, chunks[0]);

        let status = match game.notice() {
            Some(notice) => format!("{}  ({notice})", session.status()),
            None => session.status().to_string(),
        };
        frame.render_widget(
            Paragraph::new(status)
                .block(Block::default().borders(Borders::ALL).title("Status"))
                .style(Style::default().fg(Color::Yellow)),
            chunks[1],
        );

        let health_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Length(3)])
            .split(chunks[2]);
        frame.render_widget(
            Self::health_gauge("You", session.local_health(), session.max_health(), Color::Green),
            health_rows[0],
        );
        frame.render_widget(
            Self::health_gauge("Opponent", session.remote_health(), session.max_health(), Color::Red),
            health_rows[1],
        );

        let pools = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[3]);
        for (kind, area) in [(MoveKind::Attack, pools[0]), (MoveKind::Block, pools[1])] {
            let title = if kind == game.selected() {
                format!("▶ {kind}")
            } else {
                kind.to_string()
            };
            frame.render_widget(
                Paragraph::new(Self::pool_line(session.pool(kind)))
                    .block(Block::default().borders(Borders::ALL).title(title)),
                area,
            );
        }

        let items: Vec<ListItem> = session.log().entries().map(ListItem::new).collect();
        frame.render_widget(
            List::new(items).block(Block::default().borders(Borders::ALL).title("Battle Log")),
            chunks[4],
        );

        frame.render_widget(
            Paragraph::new("[A] Attack  [B] Block  [Tab] Toggle  [1-5] Play slot  [Esc] Quit")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Gray)),
            chunks[5],
        );
    }

    /// Health is unbounded, so only the bar is clamped; the label shows the real number.
    fn health_gauge(title: &str, health: i32, max: i32, color: Color) -> Gauge<'static> {
        let ratio = if max > 0 {
            (f64::from(health) / f64::from(max)).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Gauge::default()
            .block(Block::default().borders(Borders::ALL).title(title.to_string()))
            .gauge_style(Style::default().fg(color))
            .ratio(ratio)
            .label(format!("{health} / {max}"))
    }

    fn pool_line(pool: &MovePool) -> Line<'static> {
        let spans: Vec<Span> = pool
            .slots()
            .enumerate()
            .map(|(slot, (value, used))| {
                let text = format!(" {}:{} ", slot + 1, value);
                if used {
                    Span::styled(text, Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT))
                } else {
                    Span::styled(text, Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
                }
            })
            .collect();
        Line::from(spans)
    }
}
