use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::OnceLock;
use std::time::Duration;

use atomic::Atomic;
use bevy_app::prelude::*;
use bevy_ecs::prelude::*;
use bevy_ecs::system::{CommandQueue, InsertResource};
use tokio::sync::mpsc;

use crate::data::{ChartSlot, Session, Symbol};
use crate::render::{DirtyFlags, RenderState};
use crate::system;
use crate::ui::Content;
use crate::widgets::{Loading, LogPanel, Search, Terminal};

pub static RT: OnceLock<tokio::runtime::Handle> = OnceLock::new();
pub static POPUP: AtomicU8 = AtomicU8::new(0);
pub static LAST_STATE: Atomic<AppState> = Atomic::new(AppState::Single);
pub static LOG_PANEL_VISIBLE: Atomic<bool> = Atomic::new(false);

pub const POPUP_HELP: u8 = 0b1;
pub const POPUP_SEARCH: u8 = 0b10;

/// Symbols seeded into the search popup's empty-query list.
const POPULAR_SYMBOLS: [&str; 7] = ["AAPL", "MSFT", "GOOGL", "AMZN", "TSLA", "META", "NVDA"];

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, States, bytemuck::NoUninit)]
#[repr(u8)]
pub enum AppState {
    Error,
    #[default]
    Loading,
    Single,
    Compare,
    DailyReturns,
    MaxProfit,
}

impl AppState {
    /// The chart slot owned by this state's view, if it has one.
    pub fn chart_slot(self) -> Option<ChartSlot> {
        match self {
            Self::Single => Some(ChartSlot::Single),
            Self::Compare => Some(ChartSlot::Compare),
            Self::DailyReturns => Some(ChartSlot::DailyReturns),
            Self::MaxProfit => Some(ChartSlot::MaxProfit),
            Self::Error | Self::Loading => None,
        }
    }
}

fn is_log_file_name(name: &str) -> bool {
    name.starts_with("tickerterm")
        && std::path::Path::new(name)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("log"))
}

fn latest_log_file_in(log_dir: &std::path::Path) -> Option<std::path::PathBuf> {
    use std::fs;

    let mut log_files: Vec<std::path::PathBuf> = fs::read_dir(log_dir)
        .ok()?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(is_log_file_name)
        })
        .collect();

    log_files.sort_by(|a, b| {
        let time_a = fs::metadata(a).and_then(|m| m.modified()).ok();
        let time_b = fs::metadata(b).and_then(|m| m.modified()).ok();
        match (time_a, time_b) {
            (Some(ta), Some(tb)) => tb.cmp(&ta),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        }
    });

    log_files.into_iter().next()
}

pub async fn run(session: Session) {
    let (update_tx, mut update_rx) = mpsc::unbounded_channel();

    // Remote autocomplete backed by /search_stocks, popular picks shown
    // for an empty query
    let search = Search::new(update_tx.clone(), |keyword| {
        Box::pin(crate::api::search::options(keyword))
    })
    .seed_history(POPULAR_SYMBOLS.iter().map(ToString::to_string).collect());

    RT.set(tokio::runtime::Handle::current()).unwrap();
    let mut app = bevy_app::App::new();
    app.add_state::<AppState>()
        .init_resource::<Terminal>()
        .init_resource::<Loading>()
        .init_resource::<LogPanel>()
        .insert_resource(search)
        .insert_resource(session)
        .insert_resource(system::Command(update_tx.clone()))
        .add_systems(Update, system::loading.run_if(in_state(AppState::Loading)))
        .add_systems(Update, system::error.run_if(in_state(AppState::Error)))
        .add_systems(OnEnter(AppState::Single), system::enter_single)
        .add_systems(OnExit(AppState::Single), system::exit_single)
        .add_systems(
            Update,
            system::render_single.run_if(in_state(AppState::Single)),
        )
        .add_systems(OnExit(AppState::Compare), system::exit_compare)
        .add_systems(
            OnTransition {
                from: AppState::Compare,
                to: AppState::Single,
            },
            system::reset_compare,
        )
        .add_systems(
            Update,
            system::render_compare.run_if(in_state(AppState::Compare)),
        )
        .add_systems(OnEnter(AppState::DailyReturns), system::enter_daily_returns)
        .add_systems(OnExit(AppState::DailyReturns), system::exit_daily_returns)
        .add_systems(
            Update,
            system::render_daily_returns.run_if(in_state(AppState::DailyReturns)),
        )
        .add_systems(OnEnter(AppState::MaxProfit), system::enter_max_profit)
        .add_systems(OnExit(AppState::MaxProfit), system::exit_max_profit)
        .add_systems(
            Update,
            system::render_max_profit.run_if(in_state(AppState::MaxProfit)),
        );

    // Initial tab: the single-stock view; its OnEnter kicks off the
    // first data load
    {
        let mut queue = CommandQueue::default();
        queue.push(InsertResource {
            resource: NextState(Some(AppState::Single)),
        });
        _ = update_tx.send(queue);
    }

    // Log file watcher for auto-refresh while the console overlay is open
    tokio::spawn({
        let tx = update_tx.clone();
        async move {
            use std::fs;
            use std::time::SystemTime;

            let mut last_modified: Option<SystemTime> = None;
            let mut last_size: u64 = 0;
            let log_dir = crate::logger::active_log_dir();

            tracing::debug!(log_dir = %log_dir.display(), "log panel watcher started");

            loop {
                tokio::time::sleep(Duration::from_millis(500)).await;

                if !LOG_PANEL_VISIBLE.load(Ordering::Relaxed) {
                    continue;
                }

                if let Some(log_file) = latest_log_file_in(&log_dir) {
                    if let Ok(metadata) = fs::metadata(&log_file) {
                        let modified = metadata.modified().ok();
                        let size = metadata.len();

                        if modified != last_modified || size != last_size {
                            last_modified = modified;
                            last_size = size;

                            let queue = CommandQueue::default();
                            if tx.send(queue).is_err() {
                                tracing::debug!("update channel closed, stopping log watcher");
                                break;
                            }
                        }
                    }
                }
            }
        }
    });

    // ~30 FPS rendering, skipped entirely while nothing is dirty
    let render_interval = std::time::Duration::from_millis(33);
    let mut render_tick = tokio::time::interval(render_interval);
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let mut events = crossterm::event::EventStream::new();
    let mut render_state = RenderState::new();
    render_state.mark_all_dirty();

    loop {
        tokio::select! {
            _ = render_tick.tick() => {
                if render_state.needs_render() {
                    app.update();
                    render_state.clear();
                } else {
                    render_state.skip();
                }
            }
            Some(mut cmd) = update_rx.recv() => {
                cmd.apply(&mut app.world);
                render_state.mark_dirty(DirtyFlags::ALL);
            }
            Some(event) = tokio_stream::StreamExt::next(&mut events) => {
                let event = match event {
                    Ok(crossterm::event::Event::Key(event)) => event,
                    Ok(_) => continue,
                    Err(err) => {
                        tracing::error!("failed to read terminal event: {err}");
                        app.world.insert_resource(Content::new(
                            t!("error.terminal.heading"),
                            t!("error.terminal.content"),
                        ));
                        app.world.insert_resource(NextState(Some(AppState::Error)));
                        render_state.mark_dirty(DirtyFlags::ERROR);
                        continue;
                    }
                };

                let popup = POPUP.load(Ordering::Relaxed);
                let state = *app.world.resource::<State<AppState>>().get();

                // The console overlay toggles even with a popup open
                if event == key!('`') {
                    let was_visible = LOG_PANEL_VISIBLE.load(Ordering::Relaxed);
                    LOG_PANEL_VISIBLE.store(!was_visible, Ordering::Relaxed);
                    render_state.mark_dirty(DirtyFlags::ALL);
                    continue;
                }

                if popup != 0 {
                    handle_popup_input(&mut app, popup, event, update_tx.clone());
                    render_state.mark_dirty(DirtyFlags::NONE.mark_popup_change(popup));
                    continue;
                }

                match state {
                    AppState::Error => return,
                    AppState::Loading => {
                        if matches!(event, ctrl!('c') | key!('q')) {
                            return;
                        }
                        continue;
                    },
                    AppState::Single
                    | AppState::Compare
                    | AppState::DailyReturns
                    | AppState::MaxProfit => (),
                }

                handle_global_keys(&mut app, event, state, update_tx.clone(), &mut render_state);
            }
        }
    }
}

fn handle_popup_input(
    app: &mut bevy_app::App,
    popup: u8,
    event: crossterm::event::KeyEvent,
    update_tx: mpsc::UnboundedSender<CommandQueue>,
) {
    if popup == POPUP_SEARCH {
        let state = *app.world.resource::<State<AppState>>().get();
        let mut search = app.world.resource_mut::<Search<String>>();
        let (hidden, selected) = search.handle_key(event);
        if hidden {
            POPUP.store(0, Ordering::Relaxed);
        }
        if let Some(selected) = selected {
            POPUP.store(0, Ordering::Relaxed);
            assign_symbol(app, state, Symbol::new(&selected), update_tx);
        }
    } else if popup == POPUP_HELP {
        POPUP.store(0, Ordering::Relaxed);
    }
}

/// Route a picked symbol into the active tab and kick off its fetch.
fn assign_symbol(
    app: &mut bevy_app::App,
    state: AppState,
    symbol: Symbol,
    update_tx: mpsc::UnboundedSender<CommandQueue>,
) {
    let mut session = app.world.resource_mut::<Session>();
    match state {
        AppState::Single => {
            session.single.symbol = symbol.clone();
            system::refresh_single(symbol, session.single.period, update_tx);
        }
        AppState::Compare => {
            // Fills side 1, then side 2, then overwrites side 1 again;
            // the chart itself waits for an explicit compare
            session.assign_compare(symbol.clone());
            system::refresh_compare_member(symbol, session.compare.period, update_tx);
        }
        AppState::DailyReturns => {
            session.daily_returns.symbol = Some(symbol.clone());
            system::refresh_daily_returns(symbol, session.daily_returns.period, update_tx);
        }
        AppState::MaxProfit => {
            session.max_profit.symbol = Some(symbol.clone());
            system::refresh_max_profit(symbol, session.max_profit.period, update_tx);
        }
        AppState::Error | AppState::Loading => {}
    }
}

fn set_state(app: &mut bevy_app::App, state: AppState, render_state: &mut RenderState) {
    app.world.insert_resource(NextState(Some(state)));
    render_state.mark_all_dirty();
}

fn handle_global_keys(
    app: &mut bevy_app::App,
    event: crossterm::event::KeyEvent,
    state: AppState,
    update_tx: mpsc::UnboundedSender<CommandQueue>,
    render_state: &mut RenderState,
) {
    let slot = state.chart_slot();
    match event {
        ctrl!('c') => crate::widgets::Terminal::graceful_exit(0),
        key!('1') if state != AppState::Single => set_state(app, AppState::Single, render_state),
        key!('2') if state != AppState::Compare => set_state(app, AppState::Compare, render_state),
        key!('3') if state != AppState::DailyReturns => {
            set_state(app, AppState::DailyReturns, render_state);
        }
        key!('4') if state != AppState::MaxProfit => {
            set_state(app, AppState::MaxProfit, render_state);
        }
        key!('/') => {
            if let Some(mut search) = app.world.get_resource_mut::<Search<String>>() {
                POPUP.store(POPUP_SEARCH, Ordering::Relaxed);
                search.visible();
                render_state.mark_dirty(DirtyFlags::POPUP_SEARCH);
            }
        }
        key!('?') => {
            POPUP.store(POPUP_HELP, Ordering::Relaxed);
            render_state.mark_dirty(DirtyFlags::POPUP_HELP);
        }
        key!(Esc) => {
            let last_state = LAST_STATE.load(Ordering::Relaxed);
            if last_state != state {
                app.world.insert_resource(NextState(Some(last_state)));
                render_state.mark_all_dirty();
            }
        }
        key!('p') => {
            if let Some(slot) = slot {
                cycle_period(app, slot, true, update_tx);
                render_state.mark_dirty(DirtyFlags::NONE.mark_slot(slot));
            }
        }
        shift!('P') => {
            if let Some(slot) = slot {
                cycle_period(app, slot, false, update_tx);
                render_state.mark_dirty(DirtyFlags::NONE.mark_slot(slot));
            }
        }
        key!('r') => {
            if let Some(slot) = slot {
                let session = app.world.resource::<Session>().clone();
                system::refresh_slot(slot, &session, update_tx);
                render_state.mark_dirty(DirtyFlags::NONE.mark_slot(slot));
            }
        }
        key!('c') if state == AppState::Compare => {
            let session = app.world.resource::<Session>().clone();
            if let Some((first, second)) = session.compare_pair() {
                system::refresh_compare(first, second, session.compare.period, update_tx);
            } else {
                crate::data::TABS.set_error(
                    ChartSlot::Compare,
                    t!("Compare.NeedTwo").to_string(),
                );
            }
            render_state.mark_dirty(DirtyFlags::COMPARE);
        }
        key!(Up) | key!('k') => {
            if let Some(slot) = slot {
                with_panel(slot, |chart| chart.panel.cursor_prev());
                render_state.mark_dirty(DirtyFlags::NONE.mark_slot(slot));
            }
        }
        key!(Down) | key!('j') => {
            if let Some(slot) = slot {
                with_panel(slot, |chart| chart.panel.cursor_next());
                render_state.mark_dirty(DirtyFlags::NONE.mark_slot(slot));
            }
        }
        key!(' ') | key!(Enter) => {
            if let Some(slot) = slot {
                with_panel(slot, |chart| chart.panel.toggle_at_cursor(&mut chart.figure));
                render_state.mark_dirty(DirtyFlags::NONE.mark_slot(slot));
            }
        }
        key!('a') => {
            if let Some(slot) = slot {
                with_panel(slot, |chart| chart.panel.select_all(&mut chart.figure));
                render_state.mark_dirty(DirtyFlags::NONE.mark_slot(slot));
            }
        }
        key!('n') => {
            if let Some(slot) = slot {
                with_panel(slot, |chart| chart.panel.clear_all(&mut chart.figure));
                render_state.mark_dirty(DirtyFlags::NONE.mark_slot(slot));
            }
        }
        _ => (),
    }
}

fn cycle_period(
    app: &mut bevy_app::App,
    slot: ChartSlot,
    forward: bool,
    update_tx: mpsc::UnboundedSender<CommandQueue>,
) {
    let mut session = app.world.resource_mut::<Session>();
    session.cycle_period(slot, forward);
    let session = session.clone();
    system::refresh_slot(slot, &session, update_tx);
}

fn with_panel(slot: ChartSlot, f: impl FnOnce(&mut crate::data::ChartSession)) {
    crate::data::TABS.modify(slot, |data| {
        if let Some(chart) = data.chart.as_mut() {
            f(chart);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::{is_log_file_name, latest_log_file_in};
    use std::fs;
    use std::path::PathBuf;
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    struct TempDirGuard {
        path: PathBuf,
    }

    impl TempDirGuard {
        fn new() -> Self {
            let unique = format!(
                "tickerterm-app-tests-{}",
                SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_nanos())
                    .unwrap_or_default()
            );
            let path = std::env::temp_dir().join(unique);
            fs::create_dir_all(&path).expect("failed to create temp dir");
            Self { path }
        }
    }

    impl Drop for TempDirGuard {
        fn drop(&mut self) {
            _ = fs::remove_dir_all(&self.path);
        }
    }

    #[test]
    fn accepts_expected_log_filenames() {
        assert!(is_log_file_name("tickerterm.log"));
        assert!(is_log_file_name("tickerterm.2026-08-07.log"));
        assert!(!is_log_file_name("tickerterm.txt"));
        assert!(!is_log_file_name("other.log"));
    }

    #[test]
    fn returns_latest_log_file() {
        let temp_dir = TempDirGuard::new();

        let old_log = temp_dir.path.join("tickerterm.old.log");
        let new_log = temp_dir.path.join("tickerterm.new.log");

        fs::write(&old_log, "old").expect("failed to write old log");
        std::thread::sleep(Duration::from_millis(20));
        fs::write(&new_log, "new").expect("failed to write new log");

        let selected = latest_log_file_in(&temp_dir.path).expect("latest log not found");
        assert_eq!(selected, new_log);
    }
}
