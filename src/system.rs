#![allow(clippy::too_many_lines)]
use std::{
    collections::HashMap,
    sync::atomic::{AtomicU8, Ordering},
    sync::Mutex,
};

use bevy_ecs::{prelude::*, system::CommandQueue};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table},
    Frame,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::{
    api,
    api::quote::StockQuote,
    app::{AppState, LAST_STATE, LOG_PANEL_VISIBLE, RT},
    data::{ChartSlot, Period, Session, Symbol, QUOTES, TABS},
    helper::{DecimalExt, Sign},
    ui::{styles, Content},
    views,
    widgets::{ControlStrip, FigureChart, Loading, LoadingWidget, LogPanel, Search, Terminal},
};

/// Channel used by background tasks to apply world updates and wake the
/// render loop.
#[derive(Resource)]
pub struct Command(pub mpsc::UnboundedSender<CommandQueue>);

// ---------- request tracking ----------

static PENDING: AtomicU8 = AtomicU8::new(0);

static FETCH_TASKS: std::sync::LazyLock<Mutex<HashMap<ChartSlot, JoinHandle<()>>>> =
    std::sync::LazyLock::new(Mutex::default);

/// Whether a request for this tab is currently in flight.
pub fn pending(slot: ChartSlot) -> bool {
    PENDING.load(Ordering::Relaxed) & slot.bit() != 0
}

fn notify(tx: &mpsc::UnboundedSender<CommandQueue>) {
    _ = tx.send(CommandQueue::default());
}

/// Run one fetch per chart slot. A newer request for the same slot aborts
/// the previous one, so a slow stale response can never overwrite fresher
/// data. The pending flag goes up before dispatch and comes down on both
/// the success and the failure path.
fn spawn_exclusive(
    slot: ChartSlot,
    tx: mpsc::UnboundedSender<CommandQueue>,
    fut: impl std::future::Future<Output = ()> + Send + 'static,
) {
    let mut tasks = FETCH_TASKS.lock().expect("poison");
    if let Some(previous) = tasks.remove(&slot) {
        previous.abort();
    }
    PENDING.fetch_or(slot.bit(), Ordering::Relaxed);
    notify(&tx);
    let handle = RT.get().expect("runtime handle").spawn(async move {
        fut.await;
        PENDING.fetch_and(!slot.bit(), Ordering::Relaxed);
        notify(&tx);
    });
    tasks.insert(slot, handle);
}

// ---------- fetches ----------

pub fn refresh_single(symbol: Symbol, period: Period, tx: mpsc::UnboundedSender<CommandQueue>) {
    spawn_exclusive(ChartSlot::Single, tx, async move {
        tracing::info!(symbol = %symbol, period = %period, "loading stock data");
        match api::quote::fetch(&symbol, period).await {
            Ok(quote) => QUOTES.insert(quote),
            Err(err) => {
                tracing::error!("failed to fetch stock data for {symbol}: {err}");
                TABS.set_error(ChartSlot::Single, err.to_string());
                return;
            }
        }
        // Chart follows the quote, same as the page did it
        match api::charts::stock_chart(&symbol, period).await {
            Ok(figure) => {
                tracing::debug!(traces = figure.data.len(), "stock chart received");
                TABS.install_figure(ChartSlot::Single, figure);
            }
            Err(err) => {
                tracing::error!("failed to load chart for {symbol}: {err}");
                TABS.set_error(ChartSlot::Single, err.to_string());
            }
        }
    });
}

pub fn refresh_compare(
    first: Symbol,
    second: Symbol,
    period: Period,
    tx: mpsc::UnboundedSender<CommandQueue>,
) {
    spawn_exclusive(ChartSlot::Compare, tx, async move {
        tracing::info!(%first, %second, period = %period, "comparing stocks");
        match api::charts::compare(&first, &second, period).await {
            Ok(response) => {
                for quote in response.quotes() {
                    QUOTES.insert(quote);
                }
                TABS.install_figure(ChartSlot::Compare, response.fig);
            }
            Err(err) => {
                tracing::error!("comparison failed: {err}");
                TABS.set_error(ChartSlot::Compare, err.to_string());
            }
        }
    });
}

/// Refresh one side's quote header right after a compare pick. Errors are
/// swallowed; the header simply stays empty until a comparison runs.
pub fn refresh_compare_member(
    symbol: Symbol,
    period: Period,
    tx: mpsc::UnboundedSender<CommandQueue>,
) {
    RT.get().expect("runtime handle").spawn(async move {
        if let Ok(quote) = api::quote::fetch(&symbol, period).await {
            QUOTES.insert(quote);
            notify(&tx);
        }
    });
}

pub fn refresh_daily_returns(
    symbol: Symbol,
    period: Period,
    tx: mpsc::UnboundedSender<CommandQueue>,
) {
    spawn_exclusive(ChartSlot::DailyReturns, tx, async move {
        tracing::info!(symbol = %symbol, period = %period, "loading daily returns");
        match api::charts::daily_returns(&symbol, period).await {
            Ok(response) => {
                TABS.install_figure(ChartSlot::DailyReturns, response.fig);
                TABS.modify(ChartSlot::DailyReturns, |data| data.table = response.table);
            }
            Err(err) => {
                tracing::error!("failed to fetch daily returns for {symbol}: {err}");
                TABS.set_error(ChartSlot::DailyReturns, err.to_string());
            }
        }
    });
}

pub fn refresh_max_profit(symbol: Symbol, period: Period, tx: mpsc::UnboundedSender<CommandQueue>) {
    spawn_exclusive(ChartSlot::MaxProfit, tx, async move {
        tracing::info!(symbol = %symbol, period = %period, "finding max-profit window");
        match api::charts::max_profit(&symbol, period).await {
            Ok(response) => {
                TABS.install_figure(ChartSlot::MaxProfit, response.fig);
                TABS.modify(ChartSlot::MaxProfit, |data| data.window = Some(response.window));
            }
            Err(err) => {
                tracing::error!("failed to find max-profit window for {symbol}: {err}");
                TABS.set_error(ChartSlot::MaxProfit, err.to_string());
            }
        }
    });
}

/// Re-run the active tab's fetch with its current session parameters.
pub fn refresh_slot(slot: ChartSlot, session: &Session, tx: mpsc::UnboundedSender<CommandQueue>) {
    match slot {
        ChartSlot::Single => {
            refresh_single(session.single.symbol.clone(), session.single.period, tx);
        }
        ChartSlot::Compare => {
            if let Some((first, second)) = session.compare_pair() {
                refresh_compare(first, second, session.compare.period, tx);
            }
        }
        ChartSlot::DailyReturns => {
            if let Some(symbol) = session.daily_returns.symbol.clone() {
                refresh_daily_returns(symbol, session.daily_returns.period, tx);
            }
        }
        ChartSlot::MaxProfit => {
            let symbol = session.max_profit_symbol();
            if !symbol.is_empty() {
                refresh_max_profit(symbol, session.max_profit.period, tx);
            }
        }
    }
}

// ---------- state transitions ----------

pub fn enter_single(session: Res<Session>, command: Res<Command>) {
    if TABS.get(ChartSlot::Single).chart.is_none() && !pending(ChartSlot::Single) {
        refresh_single(
            session.single.symbol.clone(),
            session.single.period,
            command.0.clone(),
        );
    }
}

pub fn exit_single() {
    LAST_STATE.store(AppState::Single, Ordering::Relaxed);
}

pub fn enter_daily_returns(session: Res<Session>, command: Res<Command>) {
    if TABS.get(ChartSlot::DailyReturns).chart.is_none() && !pending(ChartSlot::DailyReturns) {
        if let Some(symbol) = session.daily_returns.symbol.clone() {
            refresh_daily_returns(symbol, session.daily_returns.period, command.0.clone());
        }
    }
}

pub fn exit_daily_returns() {
    LAST_STATE.store(AppState::DailyReturns, Ordering::Relaxed);
}

pub fn enter_max_profit(session: Res<Session>, command: Res<Command>) {
    if TABS.get(ChartSlot::MaxProfit).chart.is_none() && !pending(ChartSlot::MaxProfit) {
        let symbol = session.max_profit_symbol();
        if !symbol.is_empty() {
            refresh_max_profit(symbol, session.max_profit.period, command.0.clone());
        }
    }
}

pub fn exit_max_profit() {
    LAST_STATE.store(AppState::MaxProfit, Ordering::Relaxed);
}

pub fn exit_compare() {
    LAST_STATE.store(AppState::Compare, Ordering::Relaxed);
}

/// Leaving the compare tab for the single view drops the picked pair, the
/// way the page cleared its compare inputs.
pub fn reset_compare(mut session: ResMut<Session>) {
    session.reset_compare();
}

// ---------- render systems ----------

pub fn error(mut terminal: ResMut<Terminal>, err: Res<Content<'static>>) {
    _ = terminal.draw(|frame| {
        frame.render_widget(err.clone(), frame.size());
    });
}

pub fn loading(mut terminal: ResMut<Terminal>, loading: Res<Loading>) {
    _ = terminal.draw(|frame| {
        frame.render_widget(LoadingWidget::from(&*loading), frame.size());
    });
}

fn page(
    frame: &mut Frame,
    state: AppState,
    session: &Session,
    search: &mut Search<String>,
    log_panel: &mut LogPanel,
    body: impl FnOnce(&mut Frame, Rect),
) {
    let area = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    views::navbar::render(frame, chunks[0], state);
    body(frame, chunks[1]);
    views::footer::render(frame, chunks[2], state, session);
    views::popup::render(frame, area, search);

    if LOG_PANEL_VISIBLE.load(Ordering::Relaxed) {
        let half = Rect {
            y: area.y + area.height / 2,
            height: area.height - area.height / 2,
            ..area
        };
        log_panel.render(frame, half);
    }
}

/// Chart column shared by every tab: control strip on top, the figure in
/// the middle, annotation text (if any) at the bottom.
fn chart_block(frame: &mut Frame, rect: Rect, slot: ChartSlot) {
    let data = TABS.get(slot);
    if let Some(error) = &data.error {
        frame.render_widget(
            Paragraph::new(error.clone())
                .style(styles::error())
                .alignment(Alignment::Center),
            crate::ui::rect::centered(0, 1, rect),
        );
        return;
    }
    let Some(chart) = &data.chart else {
        let hint = if pending(slot) {
            t!("Chart.Loading")
        } else {
            t!("Chart.NoData")
        };
        frame.render_widget(
            Paragraph::new(hint)
                .style(styles::dark_gray())
                .alignment(Alignment::Center),
            crate::ui::rect::centered(0, 1, rect),
        );
        return;
    };

    let annotations = crate::widgets::chart::annotation_lines(&chart.figure);
    let strip = ControlStrip::new(&chart.panel);
    let strip_height = strip.height(rect.width).min(rect.height / 3);
    let annotation_height = u16::try_from(annotations.len().min(3)).unwrap_or(0);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(strip_height),
            Constraint::Min(4),
            Constraint::Length(annotation_height),
        ])
        .split(rect);

    frame.render_widget(strip, chunks[0]);
    frame.render_widget(FigureChart::new(&chart.figure), chunks[1]);
    if annotation_height > 0 {
        let lines: Vec<Line> = annotations
            .iter()
            .take(usize::from(annotation_height))
            .map(|text| Line::from(Span::styled(text.clone(), styles::label())))
            .collect();
        frame.render_widget(Paragraph::new(lines), chunks[2]);
    }
}

fn quote_header(frame: &mut Frame, rect: Rect, quote: Option<&StockQuote>) {
    let Some(quote) = quote else {
        frame.render_widget(Paragraph::new("--").style(styles::label()), rect);
        return;
    };
    let change_style = styles::up(quote.change.sign());
    let line = Line::from(vec![
        Span::styled(quote.company_name.clone(), styles::text()),
        Span::styled(format!("  {}", quote.symbol), styles::label()),
        Span::styled(
            format!("  ${}", quote.current_price.format_price()),
            styles::text(),
        ),
        Span::styled(
            format!(
                "  {} ({}%)",
                quote.change.format_signed(),
                quote.change_percent.format_signed()
            ),
            change_style,
        ),
    ]);
    frame.render_widget(Paragraph::new(line), rect);
}

pub fn render_single(
    mut terminal: ResMut<Terminal>,
    session: Res<Session>,
    mut search: ResMut<Search<String>>,
    mut log_panel: ResMut<LogPanel>,
) {
    let quote = QUOTES.get(&session.single.symbol);
    _ = terminal.draw(|frame| {
        page(
            frame,
            AppState::Single,
            &session,
            &mut search,
            &mut log_panel,
            |frame, rect| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Length(2), Constraint::Min(0)])
                    .split(rect);
                quote_header(frame, chunks[0], quote.as_deref());
                chart_block(frame, chunks[1], ChartSlot::Single);
            },
        );
    });
}

pub fn render_compare(
    mut terminal: ResMut<Terminal>,
    session: Res<Session>,
    mut search: ResMut<Search<String>>,
    mut log_panel: ResMut<LogPanel>,
) {
    let first = session
        .compare
        .first
        .as_ref()
        .and_then(|symbol| QUOTES.get(symbol));
    let second = session
        .compare
        .second
        .as_ref()
        .and_then(|symbol| QUOTES.get(symbol));
    _ = terminal.draw(|frame| {
        page(
            frame,
            AppState::Compare,
            &session,
            &mut search,
            &mut log_panel,
            |frame, rect| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([
                        Constraint::Length(1),
                        Constraint::Length(2),
                        Constraint::Min(0),
                    ])
                    .split(rect);
                quote_header(frame, chunks[0], first.as_deref());
                quote_header(frame, chunks[1], second.as_deref());
                chart_block(frame, chunks[2], ChartSlot::Compare);
            },
        );
    });
}

pub fn render_daily_returns(
    mut terminal: ResMut<Terminal>,
    session: Res<Session>,
    mut search: ResMut<Search<String>>,
    mut log_panel: ResMut<LogPanel>,
) {
    let data = TABS.get(ChartSlot::DailyReturns);
    _ = terminal.draw(|frame| {
        page(
            frame,
            AppState::DailyReturns,
            &session,
            &mut search,
            &mut log_panel,
            |frame, rect| {
                let table_height = if data.table.is_empty() {
                    0
                } else {
                    (rect.height / 3).max(4)
                };
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(table_height)])
                    .split(rect);
                chart_block(frame, chunks[0], ChartSlot::DailyReturns);
                if table_height > 0 {
                    returns_table(frame, chunks[1], &data.table);
                }
            },
        );
    });
}

fn returns_table(frame: &mut Frame, rect: Rect, rows: &[crate::api::charts::ReturnRow]) {
    let header = Row::new(vec![
        Cell::from(t!("DailyReturns.Date")).style(styles::header()),
        Cell::from(t!("DailyReturns.AdjClose")).style(styles::header()),
        Cell::from(t!("DailyReturns.Return")).style(styles::header()),
    ]);
    // Latest rows first, clipped to the visible area
    let body: Vec<Row> = rows
        .iter()
        .rev()
        .take(rect.height.saturating_sub(1) as usize)
        .map(|row| {
            let return_style = styles::up(row.daily_return.sign());
            Row::new(vec![
                Cell::from(row.date.clone()).style(styles::label()),
                Cell::from(crate::ui::text::align_right(
                    &row.adj_close.format_price(),
                    10,
                )),
                Cell::from(crate::ui::text::align_right(
                    &format!("{}%", row.daily_return.format_signed()),
                    8,
                ))
                .style(return_style),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(12),
        Constraint::Length(10),
        Constraint::Length(8),
    ];
    let table = Table::new(body)
        .header(header)
        .widths(&widths)
        .column_spacing(2);
    frame.render_widget(table, rect);
}

pub fn render_max_profit(
    mut terminal: ResMut<Terminal>,
    session: Res<Session>,
    mut search: ResMut<Search<String>>,
    mut log_panel: ResMut<LogPanel>,
) {
    let data = TABS.get(ChartSlot::MaxProfit);
    _ = terminal.draw(|frame| {
        page(
            frame,
            AppState::MaxProfit,
            &session,
            &mut search,
            &mut log_panel,
            |frame, rect| {
                let summary_height = u16::from(data.window.is_some());
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Length(summary_height), Constraint::Min(0)])
                    .split(rect);
                if let Some(window) = &data.window {
                    let summary = t!(
                        "MaxProfit.Summary",
                        buy_date = window.buy_date,
                        buy_price = window.buy_price.format_price(),
                        sell_date = window.sell_date,
                        sell_price = window.sell_price.format_price(),
                        profit = window.profit.format_price()
                    );
                    frame.render_widget(
                        Paragraph::new(Line::from(Span::styled(summary, styles::text()))),
                        chunks[0],
                    );
                }
                chart_block(frame, chunks[1], ChartSlot::MaxProfit);
            },
        );
    });
}
