use bitflags::bitflags;
use std::time::Instant;

use crate::data::ChartSlot;

bitflags! {
    /// Flags to track which UI components need re-rendering
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DirtyFlags: u32 {
        /// Nothing needs rendering
        const NONE = 0;
        /// Single-stock tab (quote header, chart, controls)
        const SINGLE = 0b0000_0001;
        /// Compare tab
        const COMPARE = 0b0000_0010;
        /// Daily-returns tab (chart + table)
        const DAILY_RETURNS = 0b0000_0100;
        /// Max-profit tab (chart + window summary)
        const MAX_PROFIT = 0b0000_1000;
        /// Help popup
        const POPUP_HELP = 0b0001_0000;
        /// Search popup
        const POPUP_SEARCH = 0b0010_0000;
        /// Loading screen
        const LOADING = 0b0100_0000;
        /// Error screen
        const ERROR = 0b1000_0000;
        /// Footer status line (pending requests, active symbol)
        const STATUS_BAR = 0b0001_0000_0000;
        /// All components need rendering (full redraw)
        const ALL = 0xFFFF_FFFF;
    }
}

impl DirtyFlags {
    /// Check if any component needs rendering
    #[inline]
    pub fn needs_render(self) -> bool {
        !self.is_empty()
    }

    /// Mark the view owning a chart slot, plus the status bar
    #[inline]
    #[must_use]
    pub fn mark_slot(mut self, slot: ChartSlot) -> Self {
        let flag = match slot {
            ChartSlot::Single => Self::SINGLE,
            ChartSlot::Compare => Self::COMPARE,
            ChartSlot::DailyReturns => Self::DAILY_RETURNS,
            ChartSlot::MaxProfit => Self::MAX_PROFIT,
        };
        self.insert(flag | Self::STATUS_BAR);
        self
    }

    /// Mark components for a popup change
    #[inline]
    #[must_use]
    pub fn mark_popup_change(mut self, popup: u8) -> Self {
        if popup & crate::app::POPUP_HELP != 0 {
            self.insert(Self::POPUP_HELP);
        }
        if popup & crate::app::POPUP_SEARCH != 0 {
            self.insert(Self::POPUP_SEARCH);
        }
        self
    }
}

/// Manages rendering state and tracks which components need updates
#[derive(Debug)]
pub struct RenderState {
    /// Dirty flags tracking which components need rendering
    dirty: DirtyFlags,
    /// Timestamp of the last successful render
    last_render: Instant,
    /// Total number of renders performed
    render_count: u64,
    /// Number of skipped renders (when nothing was dirty)
    skip_count: u64,
}

impl Default for RenderState {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderState {
    /// Create a new render state, initially clean
    pub fn new() -> Self {
        Self {
            dirty: DirtyFlags::NONE,
            last_render: Instant::now(),
            render_count: 0,
            skip_count: 0,
        }
    }

    /// Check if any component needs rendering
    #[inline]
    pub fn needs_render(&self) -> bool {
        self.dirty.needs_render()
    }

    /// Mark specific components as dirty
    #[inline]
    pub fn mark_dirty(&mut self, flags: DirtyFlags) {
        self.dirty.insert(flags);
    }

    /// Mark all components as dirty (full redraw)
    #[inline]
    pub fn mark_all_dirty(&mut self) {
        self.dirty = DirtyFlags::ALL;
    }

    /// Clear all dirty flags after successful render
    #[inline]
    pub fn clear(&mut self) {
        self.dirty = DirtyFlags::NONE;
        self.last_render = Instant::now();
        self.render_count += 1;
    }

    /// Increment skip counter when render is skipped
    #[inline]
    pub fn skip(&mut self) {
        self.skip_count += 1;
    }

    /// Get the current dirty flags
    #[inline]
    pub fn dirty(&self) -> DirtyFlags {
        self.dirty
    }

    /// Get time since last render
    #[inline]
    pub fn time_since_last_render(&self) -> std::time::Duration {
        self.last_render.elapsed()
    }

    /// Get rendering efficiency (percentage of renders that were skipped)
    #[allow(clippy::cast_precision_loss)]
    pub fn efficiency(&self) -> f64 {
        let total = self.render_count + self.skip_count;
        if total == 0 {
            0.0
        } else {
            (self.skip_count as f64 / total as f64) * 100.0
        }
    }

    /// Get statistics for logging/debugging
    pub fn stats(&self) -> String {
        format!(
            "renders: {}, skips: {}, skip rate: {:.1}%",
            self.render_count,
            self.skip_count,
            self.efficiency()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{DirtyFlags, RenderState};
    use crate::data::ChartSlot;

    #[test]
    fn test_dirty_flags() {
        let flags = DirtyFlags::NONE;
        assert!(!flags.needs_render());

        let flags = DirtyFlags::SINGLE | DirtyFlags::COMPARE;
        assert!(flags.needs_render());
        assert!(flags.contains(DirtyFlags::SINGLE));
        assert!(!flags.contains(DirtyFlags::MAX_PROFIT));
    }

    #[test]
    fn slot_marks_include_the_status_bar() {
        let flags = DirtyFlags::NONE.mark_slot(ChartSlot::DailyReturns);
        assert!(flags.contains(DirtyFlags::DAILY_RETURNS));
        assert!(flags.contains(DirtyFlags::STATUS_BAR));
        assert!(!flags.contains(DirtyFlags::SINGLE));
    }

    #[test]
    fn test_render_state() {
        let mut state = RenderState::new();
        assert!(!state.needs_render());

        state.mark_dirty(DirtyFlags::SINGLE);
        assert!(state.needs_render());

        state.clear();
        assert!(!state.needs_render());
        assert_eq!(state.render_count, 1);
    }

    #[test]
    fn test_efficiency_calculation() {
        let mut state = RenderState::new();

        for _ in 0..3 {
            state.mark_dirty(DirtyFlags::SINGLE);
            state.clear();
        }
        for _ in 0..7 {
            state.skip();
        }

        assert_eq!(state.render_count, 3);
        assert_eq!(state.skip_count, 7);
        assert!((state.efficiency() - 70.0).abs() < f64::EPSILON);
    }
}
