pub mod frame;
pub mod player;

pub use frame::Frame;
pub use player::PlayerSlot;
