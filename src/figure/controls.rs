use serde_json::{Map, Value};

use super::model::{Figure, Layout, Trace, Visibility};

/// Above this many traces on one chart, single-trace groups are no longer
/// given individual checkboxes.
pub const TRACE_CEILING: usize = 40;

/// Largest group that still gets one checkbox per member trace.
const GROUP_FANOUT_MAX: usize = 6;

/// Reserved group keys, always rendered ahead of everything else.
const SEGMENTS_KEY: &str = "segments";
const HOVER_KEY: &str = "hover";

/// Key a trace is clustered under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GroupKey {
    /// Declared by the chart service (`meta.component`).
    Component(String),
    /// Fallback bucket for unlabeled traces whose name matches the
    /// daily-return pattern.
    DailyReturn,
    /// Fallback bucket for everything else without a declared key.
    Ungrouped,
}

impl GroupKey {
    fn for_trace(trace: &Trace) -> Self {
        if let Some(component) = trace.component() {
            return Self::Component(component.to_string());
        }
        let is_daily_return = trace
            .name
            .as_deref()
            .is_some_and(|name| name.to_ascii_lowercase().contains("daily return"));
        if is_daily_return {
            Self::DailyReturn
        } else {
            Self::Ungrouped
        }
    }

    fn render_rank(&self) -> u8 {
        match self {
            Self::Component(key) if key == SEGMENTS_KEY => 0,
            Self::Component(key) if key == HOVER_KEY => 1,
            _ => 2,
        }
    }

    fn is_reserved(&self) -> bool {
        self.render_rank() < 2
    }
}

/// A set of trace indices sharing one group key, in first-seen order.
#[derive(Clone, Debug)]
pub struct TraceGroup {
    pub key: GroupKey,
    pub indices: Vec<usize>,
    pub sample_label: String,
}

/// Partition traces into groups. Every index lands in exactly one group;
/// group order is first-seen order except that reserved keys sort first.
pub fn group_traces(traces: &[Trace]) -> Vec<TraceGroup> {
    let mut groups: Vec<TraceGroup> = Vec::new();
    for (index, trace) in traces.iter().enumerate() {
        let key = GroupKey::for_trace(trace);
        match groups.iter_mut().find(|group| group.key == key) {
            Some(group) => group.indices.push(index),
            None => groups.push(TraceGroup {
                key,
                indices: vec![index],
                sample_label: trace.label(index),
            }),
        }
    }
    groups.sort_by_key(|group| group.key.render_rank());
    groups
}

/// Deep copy of a layout's decorative overlay, captured once at panel
/// build time so "Max Profit" can restore it after the layout has been
/// cleared.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OverlaySnapshot {
    shapes: Vec<Value>,
    annotations: Vec<Value>,
}

impl OverlaySnapshot {
    /// Capture the overlay. A malformed layout degrades to an empty
    /// snapshot; the chart payload is trusted, so the failure is not
    /// surfaced anywhere.
    pub fn capture(layout: &Layout) -> Self {
        Self::try_capture(layout).unwrap_or_default()
    }

    fn try_capture(layout: &Layout) -> serde_json::Result<Self> {
        // Shapes and annotations must be JSON objects; anything else is a
        // malformed overlay and fails the whole capture.
        let shapes: Vec<Map<String, Value>> =
            serde_json::from_value(Value::Array(layout.shapes.clone()))?;
        let annotations: Vec<Map<String, Value>> =
            serde_json::from_value(Value::Array(layout.annotations.clone()))?;
        Ok(Self {
            shapes: shapes.into_iter().map(Value::Object).collect(),
            annotations: annotations.into_iter().map(Value::Object).collect(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty() && self.annotations.is_empty()
    }

    fn restore(&self, layout: &mut Layout) {
        layout.shapes = self.shapes.clone();
        layout.annotations = self.annotations.clone();
    }

    fn clear(layout: &mut Layout) {
        layout.shapes.clear();
        layout.annotations.clear();
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    /// Bound to one trace; unchecking parks it in the legend so it stays
    /// reachable from there.
    Single,
    /// Bound to a whole group; unchecking hides every member outright.
    Collapsed,
    /// Bound to the layout overlay instead of traces.
    Overlay,
}

/// A checkbox bound to one group, trace, or the overlay.
#[derive(Clone, Debug)]
pub struct ControlEntry {
    label: String,
    kind: EntryKind,
    indices: Vec<usize>,
    checked: bool,
}

impl ControlEntry {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn checked(&self) -> bool {
        self.checked
    }

    pub fn bound_indices(&self) -> &[usize] {
        &self.indices
    }
}

/// The control strip for one rendered chart: select/clear-all actions plus
/// one checkbox per group (or per trace, for small groups), plus the
/// overlay toggle when the chart carries decorations.
///
/// Built once per render and discarded with the chart; toggles mutate the
/// figure in place and keep checkbox state and trace visibility in sync.
#[derive(Clone, Debug, Default)]
pub struct ControlPanel {
    entries: Vec<ControlEntry>,
    snapshot: OverlaySnapshot,
    cursor: usize,
}

impl ControlPanel {
    pub fn build(figure: &Figure) -> Self {
        let total = figure.data.len();
        let mut entries = Vec::new();

        for group in group_traces(&figure.data) {
            let size = group.indices.len();
            let reserved = group.key.is_reserved();
            let fan_out = !reserved && total < TRACE_CEILING && size <= GROUP_FANOUT_MAX;
            // Reserved groups keep a dedicated checkbox when they hold a
            // single trace; everything else past the ceiling collapses.
            if fan_out || (reserved && size == 1) {
                for &index in &group.indices {
                    let trace = &figure.data[index];
                    entries.push(ControlEntry {
                        label: trace.label(index),
                        kind: EntryKind::Single,
                        indices: vec![index],
                        checked: trace.visible.is_shown(),
                    });
                }
            } else {
                let first = group.indices[0];
                entries.push(ControlEntry {
                    label: format!("{} ({size})", group.sample_label),
                    kind: EntryKind::Collapsed,
                    checked: figure.data[first].visible.is_shown(),
                    indices: group.indices,
                });
            }
        }

        let snapshot = OverlaySnapshot::capture(&figure.layout);
        if figure.layout.has_overlay() {
            entries.push(ControlEntry {
                label: "Max Profit".to_string(),
                kind: EntryKind::Overlay,
                indices: Vec::new(),
                checked: true,
            });
        }

        Self {
            entries,
            snapshot,
            cursor: 0,
        }
    }

    pub fn entries(&self) -> &[ControlEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn cursor_next(&mut self) {
        if !self.entries.is_empty() {
            self.cursor = (self.cursor + 1) % self.entries.len();
        }
    }

    pub fn cursor_prev(&mut self) {
        if !self.entries.is_empty() {
            self.cursor = self.cursor.checked_sub(1).unwrap_or(self.entries.len() - 1);
        }
    }

    /// Flip one entry and push the new state into the figure.
    pub fn toggle(&mut self, index: usize, figure: &mut Figure) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.checked = !entry.checked;
            Self::apply(entry, &self.snapshot, figure);
        }
    }

    pub fn toggle_at_cursor(&mut self, figure: &mut Figure) {
        self.toggle(self.cursor, figure);
    }

    /// Check every trace control and make all their traces visible.
    /// The overlay toggle is independent and untouched.
    pub fn select_all(&mut self, figure: &mut Figure) {
        for entry in &mut self.entries {
            if entry.kind == EntryKind::Overlay {
                continue;
            }
            entry.checked = true;
            Self::apply(entry, &self.snapshot, figure);
        }
    }

    /// Uncheck every trace control; each entry hides its traces per its
    /// own policy (legend-only for singles, fully hidden for groups).
    pub fn clear_all(&mut self, figure: &mut Figure) {
        for entry in &mut self.entries {
            if entry.kind == EntryKind::Overlay {
                continue;
            }
            entry.checked = false;
            Self::apply(entry, &self.snapshot, figure);
        }
    }

    fn apply(entry: &ControlEntry, snapshot: &OverlaySnapshot, figure: &mut Figure) {
        match entry.kind {
            EntryKind::Single => {
                let visibility = if entry.checked {
                    Visibility::Visible
                } else {
                    Visibility::LegendOnly
                };
                for &index in &entry.indices {
                    figure.set_visibility(index, visibility);
                }
            }
            EntryKind::Collapsed => {
                let visibility = if entry.checked {
                    Visibility::Visible
                } else {
                    Visibility::Hidden
                };
                for &index in &entry.indices {
                    figure.set_visibility(index, visibility);
                }
            }
            EntryKind::Overlay => {
                if entry.checked {
                    snapshot.restore(&mut figure.layout);
                } else {
                    OverlaySnapshot::clear(&mut figure.layout);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{group_traces, ControlPanel, EntryKind, GroupKey, TRACE_CEILING};
    use crate::figure::model::{Figure, Trace, TraceMeta, Visibility};

    fn trace(name: &str) -> Trace {
        Trace {
            name: Some(name.to_string()),
            ..Trace::default()
        }
    }

    fn grouped_trace(name: &str, component: &str) -> Trace {
        Trace {
            name: Some(name.to_string()),
            meta: Some(TraceMeta {
                component: Some(component.to_string()),
                ..TraceMeta::default()
            }),
            ..Trace::default()
        }
    }

    fn figure_with(data: Vec<Trace>) -> Figure {
        Figure {
            data,
            ..Figure::default()
        }
    }

    fn overlay_figure(data: Vec<Trace>) -> Figure {
        let mut figure = figure_with(data);
        figure.layout.shapes = vec![serde_json::json!({"type": "rect", "x0": 1})];
        figure.layout.annotations = vec![serde_json::json!({"text": "Max Profit"})];
        figure
    }

    #[test]
    fn every_trace_lands_in_exactly_one_group() {
        let traces = vec![
            grouped_trace("a", "segments"),
            trace("AAPL Daily Return"),
            trace("plain"),
            grouped_trace("b", "segments"),
            trace("MSFT daily return overlay"),
            Trace::default(),
        ];
        let groups = group_traces(&traces);
        let mut seen: Vec<usize> = groups.iter().flat_map(|g| g.indices.clone()).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..traces.len()).collect::<Vec<_>>());
    }

    #[test]
    fn fallback_buckets_split_on_daily_return_names() {
        let traces = vec![
            trace("AAPL Daily Return"),
            trace("AAPL Close"),
            trace("MSFT Daily Return"),
        ];
        let groups = group_traces(&traces);
        assert_eq!(groups.len(), 2);
        let daily = groups
            .iter()
            .find(|g| g.key == GroupKey::DailyReturn)
            .expect("daily-return bucket");
        assert_eq!(daily.indices, vec![0, 2]);
        let rest = groups
            .iter()
            .find(|g| g.key == GroupKey::Ungrouped)
            .expect("ungrouped bucket");
        assert_eq!(rest.indices, vec![1]);
    }

    #[test]
    fn reserved_groups_render_first_in_fixed_order() {
        let traces = vec![
            trace("t"),
            grouped_trace("hover line", "hover"),
            grouped_trace("seg", "segments"),
        ];
        let groups = group_traces(&traces);
        assert_eq!(groups[0].key, GroupKey::Component("segments".into()));
        assert_eq!(groups[1].key, GroupKey::Component("hover".into()));
    }

    // The worked example: segments + hover + 7 ungrouped traces.
    #[test]
    fn collapses_large_ungrouped_bucket_behind_reserved_groups() {
        let mut data = vec![
            grouped_trace("AAPL close", "segments"),
            grouped_trace("hover", "hover"),
        ];
        for i in 1..=7 {
            data.push(trace(&format!("t{i}")));
        }
        let panel = ControlPanel::build(&figure_with(data));

        let labels: Vec<&str> = panel.entries().iter().map(|e| e.label()).collect();
        assert_eq!(labels, vec!["AAPL close", "hover", "t1 (7)"]);
        assert_eq!(panel.entries()[2].kind(), EntryKind::Collapsed);
        assert_eq!(panel.entries()[2].bound_indices(), (2..9).collect::<Vec<_>>());
    }

    #[test]
    fn small_groups_fan_out_to_one_checkbox_per_trace() {
        let data = vec![
            grouped_trace("AAPL SMA_20", "sma"),
            grouped_trace("MSFT SMA_20", "sma"),
            trace("AAPL Close"),
        ];
        let panel = ControlPanel::build(&figure_with(data));
        assert_eq!(panel.entries().len(), 3);
        assert!(panel.entries().iter().all(|e| e.kind() == EntryKind::Single));
    }

    #[test]
    fn ceiling_forces_collapse_even_for_singles() {
        let mut data: Vec<Trace> = (0..TRACE_CEILING)
            .map(|i| grouped_trace(&format!("seg {i}"), "lines"))
            .collect();
        data.push(trace("lonely"));
        let panel = ControlPanel::build(&figure_with(data));
        // 41 traces total: both the 40-trace group and the singleton collapse.
        assert_eq!(panel.entries().len(), 2);
        assert_eq!(panel.entries()[0].label(), "seg 0 (40)");
        assert_eq!(panel.entries()[1].label(), "lonely (1)");
        assert!(panel
            .entries()
            .iter()
            .all(|e| e.kind() == EntryKind::Collapsed));
    }

    #[test]
    fn initial_checked_state_mirrors_visibility() {
        let mut hidden = trace("parked");
        hidden.visible = Visibility::LegendOnly;
        let panel = ControlPanel::build(&figure_with(vec![trace("shown"), hidden]));
        assert!(panel.entries()[0].checked());
        assert!(!panel.entries()[1].checked());
    }

    #[test]
    fn single_toggle_round_trips_through_legendonly() {
        let mut figure = figure_with(vec![trace("AAPL Close")]);
        let mut panel = ControlPanel::build(&figure);

        panel.toggle(0, &mut figure);
        assert_eq!(figure.data[0].visible, Visibility::LegendOnly);
        assert!(!panel.entries()[0].checked());

        panel.toggle(0, &mut figure);
        assert_eq!(figure.data[0].visible, Visibility::Visible);
        assert!(panel.entries()[0].checked());
    }

    #[test]
    fn collapsed_toggle_hides_members_outright() {
        let data: Vec<Trace> = (0..8)
            .map(|i| grouped_trace(&format!("seg {i}"), "segments"))
            .collect();
        let mut figure = figure_with(data);
        let mut panel = ControlPanel::build(&figure);

        panel.toggle(0, &mut figure);
        assert!(figure
            .data
            .iter()
            .all(|t| t.visible == Visibility::Hidden));

        panel.toggle(0, &mut figure);
        assert!(figure.data.iter().all(|t| t.visible == Visibility::Visible));
    }

    #[test]
    fn select_all_then_clear_all_unchecks_everything() {
        let mut data: Vec<Trace> = (0..8)
            .map(|i| grouped_trace(&format!("seg {i}"), "segments"))
            .collect();
        data.push(trace("AAPL Close"));
        let mut figure = figure_with(data);
        let mut panel = ControlPanel::build(&figure);

        panel.select_all(&mut figure);
        assert!(panel.entries().iter().all(|e| e.checked()));
        assert!(figure.data.iter().all(|t| t.visible == Visibility::Visible));

        panel.clear_all(&mut figure);
        assert!(panel.entries().iter().all(|e| !e.checked()));
        // Collapsed group goes fully hidden, the single goes legend-only.
        assert!(figure.data[..8]
            .iter()
            .all(|t| t.visible == Visibility::Hidden));
        assert_eq!(figure.data[8].visible, Visibility::LegendOnly);
    }

    #[test]
    fn no_overlay_means_no_max_profit_entry() {
        let panel = ControlPanel::build(&figure_with(vec![trace("AAPL Close")]));
        assert!(panel
            .entries()
            .iter()
            .all(|e| e.kind() != EntryKind::Overlay));
    }

    #[test]
    fn overlay_toggle_clears_and_restores_the_snapshot() {
        let mut figure = overlay_figure(vec![trace("AAPL Close")]);
        let expected_shapes = figure.layout.shapes.clone();
        let expected_annotations = figure.layout.annotations.clone();
        let mut panel = ControlPanel::build(&figure);

        let overlay = panel
            .entries()
            .iter()
            .position(|e| e.kind() == EntryKind::Overlay)
            .expect("overlay entry");
        assert_eq!(panel.entries()[overlay].label(), "Max Profit");
        assert!(panel.entries()[overlay].checked());

        panel.toggle(overlay, &mut figure);
        assert!(figure.layout.shapes.is_empty());
        assert!(figure.layout.annotations.is_empty());

        // Intervening mutation must not leak into the snapshot.
        figure
            .layout
            .annotations
            .push(serde_json::json!({"text": "stray"}));

        panel.toggle(overlay, &mut figure);
        assert_eq!(figure.layout.shapes, expected_shapes);
        assert_eq!(figure.layout.annotations, expected_annotations);
    }

    #[test]
    fn malformed_overlay_degrades_to_empty_snapshot() {
        let mut figure = figure_with(vec![trace("AAPL Close")]);
        figure.layout.shapes = vec![serde_json::json!("not an object")];
        let mut panel = ControlPanel::build(&figure);

        // The control is still offered, but restoring brings back nothing.
        let overlay = panel
            .entries()
            .iter()
            .position(|e| e.kind() == EntryKind::Overlay)
            .expect("overlay entry");
        panel.toggle(overlay, &mut figure);
        panel.toggle(overlay, &mut figure);
        assert!(figure.layout.shapes.is_empty());
        assert!(figure.layout.annotations.is_empty());
    }

    #[test]
    fn cursor_wraps_both_ways() {
        let mut panel = ControlPanel::build(&figure_with(vec![trace("a"), trace("b")]));
        assert_eq!(panel.cursor(), 0);
        panel.cursor_prev();
        assert_eq!(panel.cursor(), 1);
        panel.cursor_next();
        assert_eq!(panel.cursor(), 0);
    }
}
