//! Device and context management
//!
//! - [`RenderingModule`]: device lifecycle, per-thread contexts, hardware selection
//! - [`StateMutationBarrier`]: permits guarding shared device-level state
//! - [`OutputWindow`]: windows closed first during shutdown

mod barrier;
mod rendering_module;
mod window;

pub use barrier::{StateMutationBarrier, MutationPermit, LockedMutationPermit, FrozenMutations};
pub use rendering_module::{RenderingModule, ModuleState};
pub use window::OutputWindow;
