pub mod selection;
pub mod widgets;

pub use selection::Selection;
pub use widgets::{Param, Value, Widget, WidgetError, WidgetState};
