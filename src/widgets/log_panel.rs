use bevy_ecs::prelude::Resource;
use ratatui::{
    layout::Rect,
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use std::fs;
use std::path::{Path, PathBuf};

fn is_log_file(path: &Path) -> bool {
    path.is_file()
        && path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("tickerterm") && n.ends_with(".log"))
}

/// Get the path to the latest log file
fn latest_log_file() -> Option<PathBuf> {
    let log_dir = crate::logger::active_log_dir();

    let mut log_files: Vec<PathBuf> = fs::read_dir(log_dir)
        .ok()?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| is_log_file(path))
        .collect();

    // Newest first by mtime
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

/// Read the last N lines from the log file
fn read_last_lines(path: &PathBuf, count: usize) -> Vec<String> {
    match fs::read_to_string(path) {
        Ok(content) => {
            let lines: Vec<String> = content
                .lines()
                .map(std::string::ToString::to_string)
                .collect();
            let start = lines.len().saturating_sub(count);
            lines[start..].to_vec()
        }
        Err(_) => vec![],
    }
}

/// Floating console overlay showing the tail of the active log file.
#[derive(Debug, Default, Resource)]
pub struct LogPanel {
    lines: Vec<String>,
}

impl LogPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refresh log content from file
    pub fn refresh(&mut self) {
        if let Some(log_file) = latest_log_file() {
            self.lines = read_last_lines(&log_file, 100);
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        // Auto-refresh on every draw
        self.refresh();

        frame.render_widget(Clear, area);

        let block = Block::default()
            .title(format!(" {} ", t!("Keyboard.Console")))
            .bg(Color::Black)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .style(Style::default().bg(Color::Black));

        let inner_area = block.inner(area);
        frame.render_widget(block, area);

        let display_lines: Vec<Line> = self
            .lines
            .iter()
            .rev()
            .take(inner_area.height as usize)
            .rev()
            .map(|line| {
                // Colorize log levels
                let style = if line.contains("ERROR") {
                    Style::default().fg(Color::Red)
                } else if line.contains("WARN") {
                    Style::default().fg(Color::Yellow)
                } else if line.contains("INFO") {
                    Style::default().fg(Color::Green)
                } else if line.contains("DEBUG") {
                    Style::default().fg(Color::Cyan)
                } else {
                    Style::default()
                };
                Line::from(Span::styled(line.clone(), style))
            })
            .collect();

        let paragraph = Paragraph::new(display_lines).style(Style::default().bg(Color::Black));
        frame.render_widget(paragraph, inner_area);
    }
}
