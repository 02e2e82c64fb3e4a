/*!
# LOSGAP GPU

Resource and device layer of the LOSGAP rendering stack.

This crate wraps a native graphics driver behind the [`GraphicsBackend`](losgap::backend::GraphicsBackend)
trait and exposes strongly typed, builder-created GPU resources on top of it.

## Architecture

- **RenderingModule**: device lifecycle, per-thread device contexts, hardware selection
- **StateMutationBarrier**: permits and freezes around shared device-level state
- **Buffer / ConstantBuffer / VertexBuffer / IndexBuffer**: typed buffers
- **Texture1D / Texture2D / Texture3D** (and arrays): typed textures with mip chains
- **ShaderResourceView / UnorderedAccessView / RenderTargetView / DepthStencilView**: resource views
- **Hardware**: GPU and output enumeration, recommended hardware selection

Concrete backends (such as the software backend crate) implement `GraphicsBackend`.
*/

// Internal modules
mod error;
mod system;
mod config;
mod validation;
pub mod log;
pub mod backend;
pub mod hardware;
pub mod device;
pub mod resource;
pub mod view;

// Main losgap namespace module
pub mod losgap {
    // Error types
    pub use crate::error::{Error, Result};

    // System singleton
    pub use crate::system::LosgapSystem;

    // Configuration and validation layer
    pub use crate::config::RenderingConfig;
    pub use crate::validation::Validation;

    // Device management
    pub use crate::device::{
        RenderingModule, ModuleState, StateMutationBarrier, MutationPermit, LockedMutationPermit,
        FrozenMutations, OutputWindow,
    };

    // Logging sub-module (types only, macros are exported at the crate root)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Backend boundary
    pub mod backend {
        pub use crate::backend::*;
    }

    // Hardware enumeration
    pub mod hardware {
        pub use crate::hardware::*;
    }

    // Resources
    pub mod resource {
        pub use crate::resource::*;
    }

    // Views
    pub mod view {
        pub use crate::view::*;
    }
}

// Re-export math library at crate root
pub use glam;
