use std::sync::Arc;
use std::time::{Duration, Instant};

use color_eyre::Result;
use color_eyre::eyre::eyre;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::Theme;
use crate::config::AppConfig;
use crate::detail::{DetailRoute, Intent, SearchDetailController, SideEffect, UiState};
use crate::github::GithubClient;
use crate::tui::{Event, Tui};
use crate::ui::{Spinner, Toast, ToastKind, ToastManager, render_detail};

const ERROR_MESSAGE: &str = "Failed to load repository details";

/// What a key press on the detail screen asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAction {
    Intent(Intent),
    Quit,
    Ignore,
}

fn key_action(key: KeyEvent, sheet_visible: bool) -> KeyAction {
    match key.code {
        KeyCode::Char('q') => KeyAction::Quit,
        KeyCode::Esc if sheet_visible => KeyAction::Intent(Intent::TouchBottomSheetClose),
        KeyCode::Esc => KeyAction::Quit,
        KeyCode::Char('i') | KeyCode::Enter if !sheet_visible => {
            KeyAction::Intent(Intent::ClickMoreUserInfo)
        }
        _ => KeyAction::Ignore,
    }
}

/// Hosts the detail screen in the terminal.
///
/// The app renders whatever the controller's latest state is on every
/// frame, forwards key presses as intents, and reacts to side effects:
/// errors become toasts, and leaving the screen waits until the toast has
/// been visible for its full duration.
pub struct App {
    controller: SearchDetailController,
    state_rx: watch::Receiver<UiState>,
    side_effects: mpsc::Receiver<SideEffect>,
    theme: Theme,
    spinner: Spinner,
    toasts: ToastManager,
    toast_duration: Duration,
    frame_rate: f64,
    tick_rate: f64,
    leave_at: Option<Instant>,
    should_quit: bool,
}

impl App {
    pub fn new(
        route: DetailRoute,
        client: GithubClient,
        config: &AppConfig,
        theme: Theme,
    ) -> Result<Self> {
        let client = Arc::new(client);
        let controller = match config.network.fetch_timeout() {
            Some(timeout) => SearchDetailController::with_fetch_timeout(
                route,
                client.clone(),
                client,
                timeout,
            ),
            None => SearchDetailController::new(route, client.clone(), client),
        };
        let side_effects = controller
            .take_side_effects()
            .ok_or_else(|| eyre!("Side effects of the detail screen already taken"))?;

        Ok(Self {
            state_rx: controller.state(),
            controller,
            side_effects,
            theme,
            spinner: Spinner::new("Loading..."),
            toasts: ToastManager::new(),
            toast_duration: config.ui.toast_duration(),
            frame_rate: config.ui.frame_rate,
            tick_rate: config.ui.tick_rate,
            leave_at: None,
            should_quit: false,
        })
    }

    pub async fn run(mut self) -> Result<()> {
        let mut tui = Tui::new(self.frame_rate, self.tick_rate)?;
        tui.enter()?;

        while !self.should_quit {
            let Some(event) = tui.next_event().await else {
                break;
            };
            self.handle_event(&mut tui, event)?;
            self.drain_side_effects();
        }

        tui.exit()?;
        self.controller.close().await;
        info!("Detail screen closed");
        Ok(())
    }

    fn handle_event(&mut self, tui: &mut Tui, event: Event) -> Result<()> {
        match event {
            Event::Quit => self.should_quit = true,
            Event::Tick => self.handle_tick(),
            Event::Render | Event::Resize(..) => {
                tui.draw(|frame| self.render(frame))?;
            }
            Event::Key(key) => self.handle_key(key),
            Event::Error(e) => warn!("Terminal input error: {e}"),
        }
        Ok(())
    }

    fn handle_tick(&mut self) {
        if self.state_rx.borrow().is_loading {
            self.spinner.on_tick();
        }
        self.toasts.on_tick();
        if self.leave_at.is_some_and(|at| Instant::now() >= at) {
            self.should_quit = true;
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        let sheet_visible = self.state_rx.borrow().is_bottom_sheet_visible;
        match key_action(key, sheet_visible) {
            KeyAction::Intent(intent) => self.controller.handle_intent(intent),
            KeyAction::Quit => self.should_quit = true,
            KeyAction::Ignore => {}
        }
    }

    fn drain_side_effects(&mut self) {
        while let Ok(effect) = self.side_effects.try_recv() {
            debug!(?effect, "Side effect");
            match effect {
                SideEffect::ShowError => {
                    self.toasts
                        .show(Toast::error(ERROR_MESSAGE, self.toast_duration));
                }
                SideEffect::BackPreviousScreen => {
                    if self.leave_at.is_none() {
                        self.toasts.show(Toast::new(
                            "Returning to previous screen",
                            ToastKind::Info,
                            self.toast_duration,
                        ));
                        self.leave_at = Some(Instant::now() + self.toast_duration);
                    }
                }
            }
        }
    }

    fn render(&mut self, frame: &mut Frame) {
        let state = self.state_rx.borrow_and_update().clone();
        let area = frame.area();
        render_detail(frame, area, &state, &mut self.spinner, &self.theme);
        if !self.toasts.is_empty() {
            self.toasts.render(frame, area, &self.theme);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::from(code)
    }

    #[test]
    fn test_info_key_opens_sheet() {
        assert_eq!(
            key_action(key(KeyCode::Char('i')), false),
            KeyAction::Intent(Intent::ClickMoreUserInfo)
        );
        assert_eq!(
            key_action(key(KeyCode::Enter), false),
            KeyAction::Intent(Intent::ClickMoreUserInfo)
        );
    }

    #[test]
    fn test_escape_closes_sheet_before_quitting() {
        assert_eq!(
            key_action(key(KeyCode::Esc), true),
            KeyAction::Intent(Intent::TouchBottomSheetClose)
        );
        assert_eq!(key_action(key(KeyCode::Esc), false), KeyAction::Quit);
    }

    #[test]
    fn test_quit_and_unbound_keys() {
        assert_eq!(key_action(key(KeyCode::Char('q')), true), KeyAction::Quit);
        assert_eq!(key_action(key(KeyCode::Char('i')), true), KeyAction::Ignore);
        assert_eq!(key_action(key(KeyCode::Char('x')), false), KeyAction::Ignore);
    }
}
