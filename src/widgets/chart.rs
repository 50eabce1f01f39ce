use itertools::{Itertools, MinMaxResult};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Style},
    symbols,
    text::Span,
    widgets::{Axis, Chart, Dataset, GraphType, Paragraph, Widget},
};
use serde_json::Value;

use crate::figure::Figure;
use crate::ui::styles;

/// Dataset colors, cycled by series position.
const PALETTE: [Color; 8] = [
    Color::Cyan,
    Color::Yellow,
    Color::Magenta,
    Color::LightGreen,
    Color::LightBlue,
    Color::LightRed,
    Color::Green,
    Color::Blue,
];

/// Draws a figure's currently shown traces as line datasets. Category
/// positions stand in for the x axis; the first and last category labels
/// (usually dates) are shown at the axis ends.
pub struct FigureChart {
    series: Vec<(String, Vec<(f64, f64)>)>,
    x_len: usize,
    x_labels: (String, String),
    y_bounds: [f64; 2],
}

impl FigureChart {
    #[allow(clippy::cast_precision_loss)]
    pub fn new(figure: &Figure) -> Self {
        let mut series = Vec::new();
        let mut x_len = 0usize;
        let mut x_labels = (String::new(), String::new());

        for (index, trace) in figure.shown_traces() {
            let points: Vec<(f64, f64)> = trace
                .y
                .iter()
                .enumerate()
                .filter_map(|(x, y)| y.map(|y| (x as f64, y)))
                .collect();
            if points.is_empty() {
                continue;
            }
            if trace.y.len() > x_len {
                x_len = trace.y.len();
                x_labels = (
                    trace.x.first().map(category_label).unwrap_or_default(),
                    trace.x.last().map(category_label).unwrap_or_default(),
                );
            }
            series.push((trace.label(index), points));
        }

        let y_bounds = match series
            .iter()
            .flat_map(|(_, points)| points.iter().map(|(_, y)| *y))
            .minmax()
        {
            MinMaxResult::NoElements => [0.0, 1.0],
            MinMaxResult::OneElement(y) => [y - 1.0, y + 1.0],
            MinMaxResult::MinMax(min, max) => {
                let pad = ((max - min) * 0.02).max(f64::EPSILON);
                [min - pad, max + pad]
            }
        };

        Self {
            series,
            x_len,
            x_labels,
            y_bounds,
        }
    }
}

fn category_label(value: &Value) -> String {
    match value {
        Value::String(s) => s.chars().take(10).collect(),
        other => other.to_string(),
    }
}

/// Annotation texts of a figure's overlay, markup stripped, for display
/// beneath the chart.
pub fn annotation_lines(figure: &Figure) -> Vec<String> {
    figure
        .layout
        .annotations
        .iter()
        .filter_map(|annotation| annotation.get("text").and_then(Value::as_str))
        .map(crate::ui::text::strip_markup)
        .collect()
}

impl Widget for FigureChart {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.series.is_empty() {
            Paragraph::new(t!("Chart.Empty"))
                .style(styles::dark_gray())
                .alignment(Alignment::Center)
                .render(area, buf);
            return;
        }

        let datasets: Vec<Dataset> = self
            .series
            .iter()
            .enumerate()
            .map(|(i, (name, points))| {
                Dataset::default()
                    .name(name.as_str())
                    .marker(symbols::Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(PALETTE[i % PALETTE.len()]))
                    .data(points)
            })
            .collect();

        #[allow(clippy::cast_precision_loss)]
        let x_max = self.x_len.saturating_sub(1).max(1) as f64;
        let [y_min, y_max] = self.y_bounds;

        let x_axis = Axis::default()
            .style(styles::border())
            .bounds([0.0, x_max])
            .labels(vec![
                Span::styled(self.x_labels.0.clone(), styles::label()),
                Span::styled(self.x_labels.1.clone(), styles::label()),
            ]);
        let y_axis = Axis::default()
            .style(styles::border())
            .bounds(self.y_bounds)
            .labels(vec![
                Span::styled(format!("{y_min:.2}"), styles::label()),
                Span::styled(format!("{:.2}", (y_min + y_max) / 2.0), styles::label()),
                Span::styled(format!("{y_max:.2}"), styles::label()),
            ]);

        Chart::new(datasets)
            .x_axis(x_axis)
            .y_axis(y_axis)
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::{annotation_lines, FigureChart};
    use crate::figure::{Figure, Trace, Visibility};

    fn trace(name: &str, y: Vec<Option<f64>>) -> Trace {
        Trace {
            name: Some(name.to_string()),
            x: y
                .iter()
                .enumerate()
                .map(|(i, _)| serde_json::json!(format!("2026-01-{:02}", i + 1)))
                .collect(),
            y,
            ..Trace::default()
        }
    }

    #[test]
    fn hidden_traces_are_not_plotted() {
        let mut hidden = trace("b", vec![Some(2.0), Some(3.0)]);
        hidden.visible = Visibility::LegendOnly;
        let figure = Figure {
            data: vec![trace("a", vec![Some(1.0), Some(2.0)]), hidden],
            ..Figure::default()
        };
        let chart = FigureChart::new(&figure);
        assert_eq!(chart.series.len(), 1);
        assert_eq!(chart.series[0].0, "a");
    }

    #[test]
    fn null_points_are_skipped_without_shifting_positions() {
        let figure = Figure {
            data: vec![trace("a", vec![Some(1.0), None, Some(3.0)])],
            ..Figure::default()
        };
        let chart = FigureChart::new(&figure);
        assert_eq!(chart.series[0].1, vec![(0.0, 1.0), (2.0, 3.0)]);
        assert_eq!(chart.x_len, 3);
        assert_eq!(chart.x_labels.0, "2026-01-01");
    }

    #[test]
    fn collects_annotation_texts() {
        let mut figure = Figure::default();
        figure.layout.annotations = vec![
            serde_json::json!({"text": "<b>Max Profit</b><br>Gain: 27.70"}),
            serde_json::json!({"ax": 0}),
        ];
        assert_eq!(annotation_lines(&figure), vec!["Max Profit Gain: 27.70"]);
    }
}
