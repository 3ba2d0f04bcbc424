/// User actions on the detail screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Open the bottom sheet with the owner's full profile
    ClickMoreUserInfo,
    /// Dismiss the bottom sheet
    TouchBottomSheetClose,
}
