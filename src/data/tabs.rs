use std::{collections::HashMap, sync::RwLock};

use crate::api::charts::{ProfitWindow, ReturnRow};
use crate::figure::{ControlPanel, Figure};

/// Global per-tab chart data
pub static TABS: std::sync::LazyLock<TabStore> = std::sync::LazyLock::new(TabStore::new);

/// One chart location per tab. Each slot holds at most one rendered
/// figure at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChartSlot {
    Single,
    Compare,
    DailyReturns,
    MaxProfit,
}

impl ChartSlot {
    /// Stable bit position, used for the pending-request flags.
    pub fn bit(self) -> u8 {
        match self {
            Self::Single => 0b0001,
            Self::Compare => 0b0010,
            Self::DailyReturns => 0b0100,
            Self::MaxProfit => 0b1000,
        }
    }
}

/// A figure together with its control panel. The panel is built exactly
/// once per installed figure and thrown away with it; a re-render starts
/// from scratch.
#[derive(Clone, Debug, Default)]
pub struct ChartSession {
    pub figure: Figure,
    pub panel: ControlPanel,
}

#[derive(Clone, Debug, Default)]
pub struct TabData {
    pub chart: Option<ChartSession>,
    pub error: Option<String>,
    /// Daily-returns table rows (DailyReturns slot only).
    pub table: Vec<ReturnRow>,
    /// Best buy/sell window (MaxProfit slot only).
    pub window: Option<ProfitWindow>,
}

#[derive(Debug)]
pub struct TabStore {
    inner: RwLock<HashMap<ChartSlot, TabData>>,
}

impl TabStore {
    fn new() -> Self {
        Self {
            inner: RwLock::default(),
        }
    }

    /// Replace a slot's figure, rebuilding the control panel and clearing
    /// any previous error.
    pub fn install_figure(&self, slot: ChartSlot, figure: Figure) {
        let panel = ControlPanel::build(&figure);
        let mut store = self.inner.write().expect("poison");
        let data = store.entry(slot).or_default();
        data.chart = Some(ChartSession { figure, panel });
        data.error = None;
    }

    pub fn set_error(&self, slot: ChartSlot, message: String) {
        let mut store = self.inner.write().expect("poison");
        store.entry(slot).or_default().error = Some(message);
    }

    /// Mutate a slot in place (panel toggles, table/window updates).
    pub fn modify<R>(&self, slot: ChartSlot, f: impl FnOnce(&mut TabData) -> R) -> R {
        let mut store = self.inner.write().expect("poison");
        f(store.entry(slot).or_default())
    }

    /// Clone a slot's data out for rendering.
    pub fn get(&self, slot: ChartSlot) -> TabData {
        let store = self.inner.read().expect("poison");
        store.get(&slot).cloned().unwrap_or_default()
    }

    pub fn clear(&self, slot: ChartSlot) {
        let mut store = self.inner.write().expect("poison");
        store.remove(&slot);
    }
}

impl Default for TabStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{ChartSlot, TabStore};
    use crate::figure::{Figure, Trace, Visibility};

    fn figure() -> Figure {
        Figure {
            data: vec![Trace {
                name: Some("AAPL Close".to_string()),
                ..Trace::default()
            }],
            ..Figure::default()
        }
    }

    #[test]
    fn installing_a_figure_clears_previous_error() {
        let store = TabStore::new();
        store.set_error(ChartSlot::Single, "boom".to_string());
        store.install_figure(ChartSlot::Single, figure());
        let data = store.get(ChartSlot::Single);
        assert!(data.error.is_none());
        assert!(data.chart.is_some());
    }

    #[test]
    fn reinstall_rebuilds_the_panel_from_scratch() {
        let store = TabStore::new();
        store.install_figure(ChartSlot::Single, figure());
        store.modify(ChartSlot::Single, |data| {
            let chart = data.chart.as_mut().expect("chart installed");
            chart.panel.toggle(0, &mut chart.figure);
        });
        let toggled = store.get(ChartSlot::Single);
        assert_eq!(
            toggled.chart.expect("chart").figure.data[0].visible,
            Visibility::LegendOnly
        );

        // A new render discards the previous panel state entirely.
        store.install_figure(ChartSlot::Single, figure());
        let fresh = store.get(ChartSlot::Single).chart.expect("chart");
        assert!(fresh.panel.entries()[0].checked());
        assert_eq!(fresh.figure.data[0].visible, Visibility::Visible);
    }
}
