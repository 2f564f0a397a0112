pub mod keyboard;
pub mod selection;
pub mod vision;

pub use keyboard::{Key, KeyboardController, KeyboardInput};
pub use selection::{select, ActiveController, ControlSelection};
pub use vision::VisionController;

use crate::pipeline::ControlState;

/// What the game loop drives once per tick, whatever the input device.
pub trait Controller: Send {
    fn kind(&self) -> ControlSelection;

    /// Current controls for both players. Never blocks.
    fn process_input(&mut self) -> ControlState;

    /// Back to the rest state, e.g. after a goal. Safe to call repeatedly.
    fn reset_states(&mut self);

    /// Releases everything the controller holds. Safe to call repeatedly.
    fn cleanup(&mut self);
}
