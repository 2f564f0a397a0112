mod action_state;
mod control_state;
mod snapshot;

pub use action_state::{JumpState, KickState, Movement};
pub use control_state::{ControlState, PlayerControls};
pub use snapshot::PlayerSnapshot;
