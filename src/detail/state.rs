use super::model::{RepoDetail, UserDetail};

/// Snapshot of everything the detail screen renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiState {
    pub is_loading: bool,
    pub is_bottom_sheet_visible: bool,
    pub repo_detail: Option<RepoDetail>,
    pub user_detail: Option<UserDetail>,
}

impl UiState {
    pub fn with_loading(&self, is_loading: bool) -> Self {
        Self {
            is_loading,
            ..self.clone()
        }
    }

    pub fn with_bottom_sheet_visible(&self, is_bottom_sheet_visible: bool) -> Self {
        Self {
            is_bottom_sheet_visible,
            ..self.clone()
        }
    }

    pub fn with_repo_detail(&self, repo_detail: RepoDetail) -> Self {
        Self {
            repo_detail: Some(repo_detail),
            ..self.clone()
        }
    }

    pub fn with_user_detail(&self, user_detail: UserDetail) -> Self {
        Self {
            user_detail: Some(user_detail),
            ..self.clone()
        }
    }
}
