/// One-shot events emitted by the detail screen.
///
/// These are never part of [`super::UiState`]: each one is delivered once
/// to the current subscriber and then forgotten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideEffect {
    /// Tell the user that loading failed
    ShowError,
    /// Leave the screen
    BackPreviousScreen,
}
