//! Frame production pipeline.
//!
//! The pieces the worker task composes: the bounded queue the host drains,
//! the clock frame timestamps are posted against, and the cooldown state
//! that drives masking. [`StreamShared`] is the lifecycle word connecting
//! the worker to start/stop calls and device property reads.

pub mod clock;
pub mod cooldown;
pub mod queue;
pub mod worker;

pub use clock::StreamClock;
pub use cooldown::{CooldownState, MaskingState, TickOutcome};
pub use queue::{FrameQueue, QueueAlteredFn};
pub use worker::{StreamShared, WorkerContext};
