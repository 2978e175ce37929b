pub mod binder;
pub mod bridge;

pub use binder::{Binder, PaneContent, PaneError, PaneId};
pub use bridge::SelectionBridge;
