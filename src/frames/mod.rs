//! Frames - embedded micro-frontend instances
//!
//! handle:    FrameHandle side table entries, FrameConfig per slot
//! surface:   the content container (trait + in-memory implementation)
//! factory:   element creation (sandbox, allow, interceptor)
//! message:   host → frame wire messages
//! lifecycle: reuse / pool / create / retire decisions and timers

pub mod factory;
pub mod handle;
pub mod lifecycle;
pub mod message;
pub mod surface;

pub use handle::{ClientMeta, FrameConfig, FrameElement, FrameHandle, FrameId, FrameKind, Slot};
pub use lifecycle::{
    can_reuse_frame, handshake_failed, is_isolated, FrameLifecycleManager, FrameTimer, MountOutcome, MountRequest,
};
pub use message::{FramePayload, InternalData, Outbound};
pub use surface::{FrameSurface, MemorySurface};
