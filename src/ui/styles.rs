use std::cmp::Ordering;

use ratatui::style::{Color, Modifier, Style};

#[inline]
pub fn header() -> Style {
    Style::default().fg(Color::Gray)
}

#[inline]
pub fn gray() -> Style {
    Style::default().fg(Color::Gray)
}

#[inline]
pub fn dark_gray() -> Style {
    Style::default().fg(Color::DarkGray)
}

#[inline]
pub fn label() -> Style {
    Style::default().fg(Color::Gray)
}

#[inline]
pub fn text() -> Style {
    Style::default().fg(Color::Reset)
}

#[inline]
pub fn text_selected() -> Style {
    text().add_modifier(Modifier::REVERSED)
}

#[inline]
pub fn popup() -> Style {
    text()
}

#[inline]
pub fn title() -> Style {
    text()
}

#[inline]
pub fn border() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// Style a value by its sign: gains green, losses red.
#[inline]
pub fn up(val: Ordering) -> Style {
    match val {
        Ordering::Less => Style::default().fg(Color::LightRed),
        Ordering::Equal => Style::default().fg(Color::Reset),
        Ordering::Greater => Style::default().fg(Color::LightGreen),
    }
}

pub fn online() -> Style {
    Style::default().fg(Color::Green)
}

pub fn pending() -> Style {
    Style::default().fg(Color::Yellow)
}

pub fn error() -> Style {
    Style::default().fg(Color::Red)
}
