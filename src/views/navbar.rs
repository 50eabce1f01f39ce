use ratatui::{
    prelude::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Paragraph, Tabs},
    Frame,
};

use crate::{app::AppState, ui::styles};

pub fn render(frame: &mut Frame, rect: Rect, state: AppState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rect);

    let tabs = vec![
        Line::from(format!(" {} [1] ", t!("tabs.Single"))),
        Line::from(format!(" {} [2] ", t!("tabs.Compare"))),
        Line::from(format!(" {} [3] ", t!("tabs.DailyReturns"))),
        Line::from(format!(" {} [4] ", t!("tabs.MaxProfit"))),
    ];

    let tabs = Tabs::new(tabs)
        .style(styles::text())
        .highlight_style(styles::text_selected())
        .divider("|")
        .select(match state {
            AppState::Compare => 1,
            AppState::DailyReturns => 2,
            AppState::MaxProfit => 3,
            _ => 0,
        });

    let dark_gray_style = styles::dark_gray();
    let help = Span::styled(t!("Keyboard.Help"), dark_gray_style);
    let log = Span::styled(t!("Keyboard.Console"), dark_gray_style);
    let search = Span::styled(t!("Keyboard.Search"), dark_gray_style);
    let quit = Span::styled(t!("Keyboard.Quit"), dark_gray_style);
    let hints = Paragraph::new(Line::from(vec![
        help,
        Span::styled(" ", dark_gray_style),
        log,
        Span::styled(" ", dark_gray_style),
        search,
        Span::styled(" ", dark_gray_style),
        quit,
    ]))
    .alignment(Alignment::Right);

    frame.render_widget(tabs, chunks[0]);
    frame.render_widget(hints, chunks[1]);
}
