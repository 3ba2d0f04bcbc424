//! Repository detail screen.
//!
//! The screen shows a repository together with its owner. It follows the
//! same Elm-style split used by the rest of the app:
//! - [`Intent`] - user actions coming from the view
//! - [`UiState`] - the single observable state snapshot
//! - [`SideEffect`] - one-shot events for the host (toast, navigation)
//! - [`SearchDetailController`] - reduces intents and fetch results into state

mod controller;
mod intent;
mod model;
mod side_effect;
mod source;
mod state;

pub use controller::{DetailRoute, SearchDetailController};
pub use intent::Intent;
pub use model::{RepoDetail, UserDetail};
pub use side_effect::SideEffect;
pub use source::{FetchError, RepoDetailSource, UserDetailSource, UserDetailStream};
pub use state::UiState;
