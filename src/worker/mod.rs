pub mod debug_view;
pub mod frame_worker;
pub mod stats;

pub use debug_view::{DebugFrame, DebugView};
pub use frame_worker::{FrameWorker, FrameWorkerBuilder, StopOutcome};
pub use stats::{WorkerStats, WorkerStatsSnapshot};
