pub mod debounce;
pub mod disambiguation;
pub mod features;
pub mod frame_processor;
pub mod types;

pub use debounce::{ActionDebouncer, ControlStateMachine};
pub use disambiguation::{Disambiguator, PlayerObservation};
pub use features::FeatureInterpreter;
pub use frame_processor::{FrameProcessor, ProcessedFrame};
pub use types::{ControlState, JumpState, KickState, Movement, PlayerControls, PlayerSnapshot};
