use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Wrap};

use super::Spinner;
use crate::Theme;
use crate::detail::{RepoDetail, UiState, UserDetail};

/// Render the whole detail screen for `state`.
pub fn render_detail(
    frame: &mut Frame,
    area: Rect,
    state: &UiState,
    spinner: &mut Spinner,
    theme: &Theme,
) {
    let [header, body, hints] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(area);
    let [repo_area, owner_area] =
        Layout::horizontal([Constraint::Percentage(65), Constraint::Percentage(35)]).areas(body);

    render_header(frame, header, state, theme);
    render_repo(frame, repo_area, state, spinner, theme);
    render_owner(frame, owner_area, state.user_detail.as_ref(), theme);
    render_hints(frame, hints, state.is_bottom_sheet_visible, theme);

    if state.is_bottom_sheet_visible {
        render_bottom_sheet(frame, body, state.user_detail.as_ref(), theme);
    }
}

fn panel<'a>(title: &'a str, theme: &Theme) -> Block<'a> {
    Block::bordered()
        .border_type(theme.border_type)
        .border_style(Style::default().fg(theme.overlay0))
        .title(Span::styled(
            title,
            Style::default().fg(theme.mauve).add_modifier(Modifier::BOLD),
        ))
}

fn label(text: &str, theme: &Theme) -> Span<'static> {
    Span::styled(format!("{text:<10}"), Style::default().fg(theme.subtext0))
}

fn field(name: &str, value: impl Into<String>, theme: &Theme) -> Line<'static> {
    Line::from(vec![
        label(name, theme),
        Span::styled(value.into(), Style::default().fg(theme.text)),
    ])
}

fn render_header(frame: &mut Frame, area: Rect, state: &UiState, theme: &Theme) {
    let title = state
        .repo_detail
        .as_ref()
        .map_or_else(|| "Repository".to_string(), |repo| repo.full_name.clone());
    let mut spans = vec![Span::styled(
        format!(" {title}"),
        Style::default().fg(theme.lavender).add_modifier(Modifier::BOLD),
    )];
    if let Some(repo) = &state.repo_detail {
        if repo.is_archived {
            spans.push(Span::styled("  archived", Style::default().fg(theme.yellow)));
        }
        if repo.is_fork {
            spans.push(Span::styled("  fork", Style::default().fg(theme.subtext0)));
        }
    }
    frame.render_widget(Line::from(spans), area);
}

fn render_repo(
    frame: &mut Frame,
    area: Rect,
    state: &UiState,
    spinner: &mut Spinner,
    theme: &Theme,
) {
    let block = panel(" Repository ", theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    match &state.repo_detail {
        Some(repo) => {
            let paragraph = Paragraph::new(repo_lines(repo, theme)).wrap(Wrap { trim: true });
            frame.render_widget(paragraph, inner);
        }
        None if state.is_loading => spinner.render(frame, inner, theme),
        None => frame.render_widget(
            Paragraph::new("No repository loaded").style(Style::default().fg(theme.subtext0)),
            inner,
        ),
    }
}

fn repo_lines(repo: &RepoDetail, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    if let Some(description) = &repo.description {
        lines.push(Line::styled(
            description.clone(),
            Style::default().fg(theme.text).add_modifier(Modifier::ITALIC),
        ));
        lines.push(Line::default());
    }

    lines.push(Line::from(vec![
        Span::styled(format!("★ {}", repo.stars), Style::default().fg(theme.yellow)),
        Span::raw("   "),
        Span::styled(format!("⑂ {}", repo.forks), Style::default().fg(theme.blue)),
        Span::raw("   "),
        Span::styled(format!("◉ {}", repo.watchers), Style::default().fg(theme.green)),
        Span::raw("   "),
        Span::styled(format!("! {}", repo.open_issues), Style::default().fg(theme.peach)),
    ]));
    lines.push(Line::default());

    if let Some(language) = &repo.language {
        lines.push(field("Language", language.clone(), theme));
    }
    if let Some(license) = &repo.license {
        lines.push(field("License", license.clone(), theme));
    }
    lines.push(field("Branch", repo.default_branch.clone(), theme));
    if let Some(updated) = &repo.updated {
        lines.push(field("Updated", updated.clone(), theme));
    }
    if !repo.topics.is_empty() {
        lines.push(field("Topics", repo.topics.join(", "), theme));
    }
    lines.push(field("URL", repo.url.clone(), theme));
    lines
}

fn render_owner(frame: &mut Frame, area: Rect, user: Option<&UserDetail>, theme: &Theme) {
    let block = panel(" Owner ", theme);
    let lines = user.map_or_else(
        || {
            vec![Line::styled(
                "No owner loaded",
                Style::default().fg(theme.subtext0),
            )]
        },
        |user| {
            vec![
                Line::styled(
                    user.display_name().to_string(),
                    Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
                ),
                Line::styled(format!("@{}", user.login), Style::default().fg(theme.subtext1)),
                Line::default(),
                field("Followers", user.followers.clone(), theme),
                field("Following", user.following.clone(), theme),
                field("Repos", user.public_repos.clone(), theme),
            ]
        },
    );
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn render_bottom_sheet(frame: &mut Frame, body: Rect, user: Option<&UserDetail>, theme: &Theme) {
    let [_, sheet] =
        Layout::vertical([Constraint::Percentage(45), Constraint::Percentage(55)]).areas(body);

    let title = user.map_or_else(|| " Owner ".to_string(), |u| format!(" {} ", u.login));
    let block = Block::bordered()
        .border_type(theme.border_type)
        .border_style(Style::default().fg(theme.lavender))
        .title(title)
        .style(Style::default().bg(theme.base));

    let lines = user.map_or_else(
        || vec![Line::styled("Loading...", Style::default().fg(theme.subtext0))],
        |user| user_lines(user, theme),
    );

    frame.render_widget(Clear, sheet);
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        sheet,
    );
}

fn user_lines(user: &UserDetail, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = vec![Line::styled(
        user.display_name().to_string(),
        Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
    )];
    if let Some(bio) = &user.bio {
        lines.push(Line::styled(bio.clone(), Style::default().fg(theme.subtext1)));
    }
    lines.push(Line::default());

    let optional = [
        ("Company", &user.company),
        ("Location", &user.location),
        ("Blog", &user.blog),
        ("Email", &user.email),
        ("Joined", &user.joined),
    ];
    for (name, value) in optional {
        if let Some(value) = value {
            lines.push(field(name, value.clone(), theme));
        }
    }
    lines.push(field(
        "Network",
        format!("{} followers · {} following", user.followers, user.following),
        theme,
    ));
    lines.push(field("Repos", user.public_repos.clone(), theme));
    lines.push(field("Profile", user.url.clone(), theme));
    lines
}

fn render_hints(frame: &mut Frame, area: Rect, sheet_visible: bool, theme: &Theme) {
    let hints = if sheet_visible {
        " esc close · q quit"
    } else {
        " i owner info · q quit"
    };
    frame.render_widget(
        Line::styled(hints, Style::default().fg(theme.subtext0)),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::{RepoDetailRaw, UserDetailRaw};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use serde_json::json;

    fn state(sheet_visible: bool) -> UiState {
        let repo: RepoDetailRaw = serde_json::from_value(json!({
            "name": "Hello-World",
            "full_name": "octocat/Hello-World",
            "owner": { "login": "octocat" },
            "description": "My first repository",
            "html_url": "https://github.com/octocat/Hello-World",
            "default_branch": "main",
            "stargazers_count": 10
        }))
        .unwrap();
        let user: UserDetailRaw = serde_json::from_value(json!({
            "login": "octocat",
            "name": "The Octocat",
            "location": "San Francisco",
            "html_url": "https://github.com/octocat",
            "avatar_url": "https://avatars.githubusercontent.com/u/583231",
            "followers": 5
        }))
        .unwrap();
        UiState {
            is_loading: false,
            is_bottom_sheet_visible: sheet_visible,
            repo_detail: Some(repo.into()),
            user_detail: Some(user.into()),
        }
    }

    fn render(state: &UiState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let mut spinner = Spinner::new("Loading...");
        terminal
            .draw(|frame| {
                render_detail(frame, frame.area(), state, &mut spinner, &Theme::default());
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(ratatui::buffer::Cell::symbol)
            .collect()
    }

    #[test]
    fn test_renders_repository_and_owner() {
        let screen = render(&state(false));
        assert!(screen.contains("octocat/Hello-World"));
        assert!(screen.contains("My first repository"));
        assert!(screen.contains("The Octocat"));
        assert!(!screen.contains("San Francisco"));
    }

    #[test]
    fn test_bottom_sheet_shows_full_profile() {
        let screen = render(&state(true));
        assert!(screen.contains("San Francisco"));
        assert!(screen.contains("esc close"));
    }

    #[test]
    fn test_empty_state() {
        let screen = render(&UiState::default());
        assert!(screen.contains("No repository loaded"));
        assert!(screen.contains("No owner loaded"));
    }
}
