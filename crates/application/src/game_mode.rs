//! Game mode toggle.

use perfmon_notify::{game_mode_alert, NotificationGatewayRef};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameModeState {
    #[default]
    Inactive,
    Active,
}

impl GameModeState {
    fn flipped(self) -> Self {
        match self {
            GameModeState::Inactive => GameModeState::Active,
            GameModeState::Active => GameModeState::Inactive,
        }
    }
}

/// Two-state game mode switch.
///
/// Switching on posts one "monitoring active" notification; switching off
/// posts nothing.
pub struct GameModeController {
    state: Mutex<GameModeState>,
    notifier: NotificationGatewayRef,
}

impl GameModeController {
    pub fn new(notifier: NotificationGatewayRef) -> Self {
        Self {
            state: Mutex::new(GameModeState::Inactive),
            notifier,
        }
    }

    pub fn state(&self) -> GameModeState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_active(&self) -> bool {
        self.state() == GameModeState::Active
    }

    /// Flip the state and return the new one.
    pub fn toggle(&self) -> GameModeState {
        let next = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            *state = state.flipped();
            *state
        };

        tracing::info!(state = ?next, "game mode toggled");
        if next == GameModeState::Active {
            self.notifier.notify(game_mode_alert());
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perfmon_notify::RecordingNotifier;
    use std::sync::Arc;

    #[test]
    fn test_toggle_twice_restores_state_with_one_notification() {
        let notifier = Arc::new(RecordingNotifier::new());
        let controller = GameModeController::new(notifier.clone());

        assert_eq!(controller.toggle(), GameModeState::Active);
        assert!(controller.is_active());
        assert_eq!(controller.toggle(), GameModeState::Inactive);

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].data_type(), Some("gameMode"));
    }

    #[test]
    fn test_each_activation_notifies() {
        let notifier = Arc::new(RecordingNotifier::new());
        let controller = GameModeController::new(notifier.clone());

        for _ in 0..6 {
            controller.toggle();
        }
        assert_eq!(controller.state(), GameModeState::Inactive);
        assert_eq!(notifier.count(), 3);
    }
}
