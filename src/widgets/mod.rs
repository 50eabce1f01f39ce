pub mod chart;
pub mod controls;
pub mod loading;
pub mod log_panel;
pub mod search;
pub mod terminal;

pub use chart::FigureChart;
pub use controls::ControlStrip;
pub use loading::{Loading, LoadingWidget};
pub use log_panel::LogPanel;
pub use search::Search;
pub use terminal::Terminal;
