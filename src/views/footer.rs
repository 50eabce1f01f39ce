use ratatui::{
    prelude::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::AppState;
use crate::data::{ChartSlot, Session};
use crate::system;
use crate::ui::styles;

pub fn render(frame: &mut Frame, rect: Rect, state: AppState, session: &Session) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(90), Constraint::Percentage(10)])
        .split(rect);

    let slot = state.chart_slot();
    let mut spans = Vec::with_capacity(6);
    if let Some(slot) = slot {
        let subject = match slot {
            ChartSlot::Single => session.single.symbol.to_string(),
            ChartSlot::Compare => match (&session.compare.first, &session.compare.second) {
                (Some(first), Some(second)) => format!("{first} vs {second}"),
                (Some(first), None) => format!("{first} vs ?"),
                _ => "--".to_string(),
            },
            ChartSlot::DailyReturns => session
                .daily_returns
                .symbol
                .as_ref()
                .map_or_else(|| "--".to_string(), ToString::to_string),
            ChartSlot::MaxProfit => session.max_profit_symbol().to_string(),
        };
        spans.push(Span::styled(subject, styles::text()));
        spans.push(Span::styled("  ", styles::dark_gray()));
        spans.push(Span::styled(
            format!("[{}]", session.period_of(slot).label()),
            styles::label(),
        ));
        spans.push(Span::styled(
            format!("  {}", t!("Keyboard.Period")),
            styles::dark_gray(),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), chunks[0]);

    // Request indicator: yellow while a fetch is in flight for this tab
    let (status, status_style) = match slot {
        Some(slot) if system::pending(slot) => ("··· ", styles::pending()),
        Some(_) => ("■■■ ", styles::online()),
        None => ("    ", styles::text()),
    };
    let text = Span::styled(status, status_style);
    frame.render_widget(Paragraph::new(text).alignment(Alignment::Right), chunks[1]);
}
