//! Cooldown state machines that turn raw triggers into one-cycle pulses.
//!
//! Each (player, action) pair is `READY` while its cooldown is 0 and `ACTIVE` while it is
//! positive. Every cycle the cooldown is decremented first; if it is then 0 the raw trigger is
//! evaluated, and a true trigger fires a pulse and restarts the cooldown. The visible state is
//! `jumping`/`kicking` only on the firing cycle, so a held gesture pulses once every
//! `cooldown_frames` cycles.

use crate::common::PlayerSlot;
use crate::config::GestureSettings;
use crate::pipeline::disambiguation::PlayerObservation;
use crate::pipeline::types::{ControlState, JumpState, KickState, Movement};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionDebouncer {
    cooldown: u32,
    cooldown_frames: u32,
    /// Released cycles needed to cancel a running cooldown. None keeps the full window.
    early_release: Option<u32>,
    released_streak: u32,
}

impl ActionDebouncer {
    pub fn new(cooldown_frames: u32, early_release: Option<u32>) -> Self {
        Self {
            cooldown: 0,
            cooldown_frames: cooldown_frames.max(1),
            early_release,
            released_streak: 0,
        }
    }

    pub fn cooldown(&self) -> u32 {
        self.cooldown
    }

    pub fn is_ready(&self) -> bool {
        self.cooldown == 0
    }

    /// Advances one cycle. Returns true only on the cycle the action fires.
    ///
    /// `trigger` is `None` when the limb wasn't observed; that counts as not triggering but
    /// doesn't advance or break an early-release streak.
    pub fn update(&mut self, trigger: Option<bool>) -> bool {
        if self.cooldown > 0 {
            self.cooldown -= 1;
            match trigger {
                Some(true) => self.released_streak = 0,
                Some(false) => {
                    self.released_streak += 1;
                    if self
                        .early_release
                        .is_some_and(|frames| self.released_streak >= frames)
                    {
                        self.cooldown = 0;
                    }
                }
                None => {}
            }
        }

        if self.cooldown == 0 {
            self.released_streak = 0;
            if trigger == Some(true) {
                self.cooldown = self.cooldown_frames;
                return true;
            }
        }
        false
    }

    pub fn reset(&mut self) {
        self.cooldown = 0;
        self.released_streak = 0;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerStateMachine {
    jump: ActionDebouncer,
    kick: ActionDebouncer,
}

impl PlayerStateMachine {
    pub fn new(settings: &GestureSettings) -> Self {
        let debouncer = ActionDebouncer::new(settings.cooldown_frames, settings.early_release());
        Self {
            jump: debouncer.clone(),
            kick: debouncer,
        }
    }

    pub fn jump(&self) -> &ActionDebouncer {
        &self.jump
    }

    pub fn kick(&self) -> &ActionDebouncer {
        &self.kick
    }
}

/// Both players' debouncers plus the last control state they produced.
///
/// Owned by the frame worker; consumers only ever see copies of `state`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlStateMachine {
    players: [PlayerStateMachine; 2],
    state: ControlState,
}

impl ControlStateMachine {
    pub fn new(settings: &GestureSettings) -> Self {
        let player = PlayerStateMachine::new(settings);
        Self {
            players: [player.clone(), player],
            state: ControlState::rest(),
        }
    }

    pub fn state(&self) -> &ControlState {
        &self.state
    }

    pub fn player(&self, player: PlayerSlot) -> &PlayerStateMachine {
        &self.players[player.index()]
    }

    /// Runs one cycle for both players. Movement carries no memory between cycles.
    pub fn update(&mut self, observations: &[PlayerObservation; 2]) -> ControlState {
        for player in PlayerSlot::ALL {
            let observation = &observations[player.index()];
            let machine = &mut self.players[player.index()];
            let controls = self.state.get_mut(player);

            controls.movement = observation.movement.unwrap_or(Movement::None);
            controls.jump = JumpState::from_active(machine.jump.update(observation.jump));
            controls.kick = KickState::from_active(machine.kick.update(observation.kick));
        }
        self.state
    }

    /// Back to the rest state: no movement, everything ready, all cooldowns cleared.
    pub fn reset(&mut self) {
        for machine in &mut self.players {
            machine.jump.reset();
            machine.kick.reset();
        }
        self.state = ControlState::rest();
    }
}
