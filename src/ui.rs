//! Rendering for the detail screen.

mod detail;
mod spinner;
mod toast;

pub use detail::render_detail;
pub use spinner::Spinner;
pub use toast::{Toast, ToastKind, ToastManager};
