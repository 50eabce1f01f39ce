use bevy_ecs::prelude::Resource;

use super::tabs::ChartSlot;
use super::types::{Period, Symbol};

/// Explicit per-tab UI state. The original frontend kept these as loose
/// module-level variables; here every handler reads and writes one
/// page-level structure instead.
#[derive(Clone, Debug, Resource)]
pub struct Session {
    pub single: SingleTab,
    pub compare: CompareTab,
    pub daily_returns: ReturnsTab,
    pub max_profit: ProfitTab,
}

#[derive(Clone, Debug)]
pub struct SingleTab {
    pub symbol: Symbol,
    pub period: Period,
}

#[derive(Clone, Debug, Default)]
pub struct CompareTab {
    pub first: Option<Symbol>,
    pub second: Option<Symbol>,
    pub period: Period,
}

#[derive(Clone, Debug, Default)]
pub struct ReturnsTab {
    pub symbol: Option<Symbol>,
    pub period: Period,
}

#[derive(Clone, Debug, Default)]
pub struct ProfitTab {
    pub symbol: Option<Symbol>,
    pub period: Period,
}

impl Session {
    pub fn new(symbol: Symbol, period: Period) -> Self {
        Self {
            single: SingleTab { symbol, period },
            compare: CompareTab {
                period,
                ..CompareTab::default()
            },
            daily_returns: ReturnsTab {
                period,
                ..ReturnsTab::default()
            },
            max_profit: ProfitTab {
                period,
                ..ProfitTab::default()
            },
        }
    }

    pub fn period_of(&self, slot: ChartSlot) -> Period {
        match slot {
            ChartSlot::Single => self.single.period,
            ChartSlot::Compare => self.compare.period,
            ChartSlot::DailyReturns => self.daily_returns.period,
            ChartSlot::MaxProfit => self.max_profit.period,
        }
    }

    /// Step a tab's period forward or backward and return the new value.
    pub fn cycle_period(&mut self, slot: ChartSlot, forward: bool) -> Period {
        let period = self.period_of(slot);
        let period = if forward { period.next() } else { period.prev() };
        match slot {
            ChartSlot::Single => self.single.period = period,
            ChartSlot::Compare => self.compare.period = period,
            ChartSlot::DailyReturns => self.daily_returns.period = period,
            ChartSlot::MaxProfit => self.max_profit.period = period,
        }
        period
    }

    /// Assign a picked symbol to the compare tab. Fills the first empty
    /// side; with both sides taken, the first side is overwritten.
    pub fn assign_compare(&mut self, symbol: Symbol) -> usize {
        if self.compare.first.is_none() {
            self.compare.first = Some(symbol);
            0
        } else if self.compare.second.is_none() {
            self.compare.second = Some(symbol);
            1
        } else {
            self.compare.first = Some(symbol);
            0
        }
    }

    pub fn compare_pair(&self) -> Option<(Symbol, Symbol)> {
        match (&self.compare.first, &self.compare.second) {
            (Some(first), Some(second)) => Some((first.clone(), second.clone())),
            _ => None,
        }
    }

    pub fn reset_compare(&mut self) {
        self.compare.first = None;
        self.compare.second = None;
    }

    /// The max-profit tab falls back to the single tab's symbol when no
    /// explicit pick was made.
    pub fn max_profit_symbol(&self) -> Symbol {
        self.max_profit
            .symbol
            .clone()
            .unwrap_or_else(|| self.single.symbol.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::{ChartSlot, Period, Session, Symbol};

    fn session() -> Session {
        Session::new(Symbol::new("AAPL"), Period::SixMonths)
    }

    #[test]
    fn compare_assignment_rotates_back_to_the_first_side() {
        let mut session = session();
        assert_eq!(session.assign_compare(Symbol::new("AAPL")), 0);
        assert_eq!(session.assign_compare(Symbol::new("MSFT")), 1);
        assert_eq!(session.assign_compare(Symbol::new("GOOGL")), 0);
        let (first, second) = session.compare_pair().expect("both sides set");
        assert_eq!(first.as_str(), "GOOGL");
        assert_eq!(second.as_str(), "MSFT");
    }

    #[test]
    fn compare_pair_needs_both_sides() {
        let mut session = session();
        session.assign_compare(Symbol::new("AAPL"));
        assert!(session.compare_pair().is_none());
    }

    #[test]
    fn max_profit_falls_back_to_the_single_symbol() {
        let mut session = session();
        assert_eq!(session.max_profit_symbol().as_str(), "AAPL");
        session.max_profit.symbol = Some(Symbol::new("NVDA"));
        assert_eq!(session.max_profit_symbol().as_str(), "NVDA");
    }

    #[test]
    fn per_tab_periods_cycle_independently() {
        let mut session = session();
        session.cycle_period(ChartSlot::Compare, true);
        assert_eq!(session.period_of(ChartSlot::Compare), Period::OneYear);
        assert_eq!(session.period_of(ChartSlot::Single), Period::SixMonths);
        session.cycle_period(ChartSlot::Single, false);
        assert_eq!(session.period_of(ChartSlot::Single), Period::ThreeMonths);
    }
}
