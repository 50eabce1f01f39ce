use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};

use crate::figure::ControlPanel;
use crate::ui::styles;

/// The control strip rendered immediately above a chart: one checkbox
/// per control entry, plus the select/clear-all key hints.
pub struct ControlStrip<'a> {
    panel: &'a ControlPanel,
}

impl<'a> ControlStrip<'a> {
    pub fn new(panel: &'a ControlPanel) -> Self {
        Self { panel }
    }

    /// Rows the strip needs for `width` columns, used by the view layout.
    pub fn height(&self, width: u16) -> u16 {
        if self.panel.is_empty() {
            return 0;
        }
        let total: usize = self
            .panel
            .entries()
            .iter()
            .map(|entry| entry.label().chars().count() + 5)
            .sum();
        let width = usize::from(width.max(1));
        u16::try_from(total.div_ceil(width) + 1).unwrap_or(2)
    }
}

impl Widget for ControlStrip<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.panel.is_empty() || area.height == 0 {
            return;
        }

        let mut lines = vec![Line::from(Span::styled(
            t!("Controls.Hint"),
            styles::dark_gray(),
        ))];

        let spans: Vec<Span> = self
            .panel
            .entries()
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let mark = if entry.checked() { 'x' } else { ' ' };
                let text = format!("[{mark}] {} ", entry.label());
                let style = if i == self.panel.cursor() {
                    styles::text_selected()
                } else {
                    styles::text()
                };
                Span::styled(text, style)
            })
            .collect();
        lines.push(Line::from(spans));

        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::ControlStrip;
    use crate::figure::{ControlPanel, Figure, Trace};

    #[test]
    fn empty_panel_takes_no_rows() {
        let panel = ControlPanel::build(&Figure::default());
        assert_eq!(ControlStrip::new(&panel).height(80), 0);
    }

    #[test]
    fn height_grows_with_entry_count() {
        let figure = Figure {
            data: (0..10)
                .map(|i| Trace {
                    name: Some(format!("trace name {i}")),
                    ..Trace::default()
                })
                .collect(),
            ..Figure::default()
        };
        let panel = ControlPanel::build(&figure);
        let strip = ControlStrip::new(&panel);
        assert!(strip.height(20) > strip.height(200));
    }
}
