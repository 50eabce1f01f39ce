pub mod controls;
pub mod model;

pub use controls::{ControlEntry, ControlPanel, EntryKind, OverlaySnapshot};
pub use model::{Figure, Layout, Trace, TraceMeta, Visibility};
