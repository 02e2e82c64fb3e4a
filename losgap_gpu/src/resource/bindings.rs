/// GPU binding flags

use bitflags::bitflags;

bitflags! {
    /// Ways a resource may be bound to the pipeline.
    ///
    /// Bindings restrict which views can be created over a resource; they do not
    /// affect which CPU-side operations its usage permits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct GpuBindings: u32 {
        const READABLE_SHADER_RESOURCE = 0x8;
        const RENDER_TARGET            = 0x20;
        const DEPTH_STENCIL_TARGET     = 0x40;
        const WRITABLE_SHADER_RESOURCE = 0x80;
    }
}

impl GpuBindings {
    /// No binding at all
    pub const NONE: GpuBindings = GpuBindings::empty();

    /// Bindings that require the GPU to write into the resource
    pub const GPU_WRITABLE: GpuBindings = GpuBindings::RENDER_TARGET
        .union(GpuBindings::DEPTH_STENCIL_TARGET)
        .union(GpuBindings::WRITABLE_SHADER_RESOURCE);

    pub fn is_none(&self) -> bool {
        self.is_empty()
    }
}
