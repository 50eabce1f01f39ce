use crate::{ui::styles, widgets::Search};

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};

pub fn render(frame: &mut Frame, rect: Rect, search: &mut Search<String>) {
    let popup = crate::app::POPUP.load(std::sync::atomic::Ordering::Relaxed);
    if popup == crate::app::POPUP_HELP {
        crate::views::help::render(frame, rect);
    } else if popup == crate::app::POPUP_SEARCH {
        searching(frame, rect, search);
    }
}

fn safe_cursor_x(chunk_x: u16, visual_cursor: usize) -> u16 {
    let offset = u16::try_from(visual_cursor).unwrap_or(u16::MAX - 1);
    chunk_x.saturating_add(offset).saturating_add(1)
}

fn searching(frame: &mut Frame, rect: Rect, search: &mut Search<String>) {
    const MAX_SIZE: (u16, u16) = (50, 30);
    let rect = crate::ui::rect::centered(MAX_SIZE.0, MAX_SIZE.1, rect);
    frame.render_widget(Clear, rect);

    let chunks = Layout::default()
        .margin(1)
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Percentage(100)].as_ref())
        .split(rect);

    let input = &search.input;
    // one line, without scroll
    let paragraph = Paragraph::new(input.value()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(styles::border())
            .title(t!("SearchStock.title")),
    );
    frame.render_widget(paragraph, chunks[0]);
    frame.set_cursor(
        // Put cursor past the end of the input text
        safe_cursor_x(chunks[0].x, input.visual_cursor()),
        // Move one line down, from the border to the input line
        chunks[0].y + 1,
    );

    let rows = search
        .options()
        .into_iter()
        .map(|symbol| Row::new(vec![Cell::from(Span::styled(symbol, styles::popup()))]))
        .collect::<Vec<_>>();

    let column_constraints = [Constraint::Percentage(100)];

    let table = Table::new(rows)
        .block(
            Block::default()
                .borders(Borders::all())
                .border_style(styles::border()),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .widths(&column_constraints)
        .column_spacing(2);

    frame.render_stateful_widget(table, chunks[1], &mut search.table);
}
