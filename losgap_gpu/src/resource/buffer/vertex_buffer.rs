/// Vertex and index buffers

use std::fmt;
use std::marker::PhantomData;
use std::mem::size_of;
use std::sync::Arc;
use crate::backend::{BufferDesc, BufferKind};
use crate::device::RenderingModule;
use crate::error::{Error, Result};
use crate::resource::{
    Resource, ResourceCore, ResourceSupport, ResourceUsage, GpuBindings, native_format_of,
};
use crate::resource::buffer::{BufferElement, BufferResource};
use crate::resource::buffer::buffer_resource::{BufferParams, create_buffer_core};
use crate::resource::memo::Memo;
use crate::resource::resource::{check_support, short_type_name};

const PIPELINE_BUFFER_USAGES: &[ResourceUsage] = &[
    ResourceUsage::Immutable,
    ResourceUsage::DiscardWrite,
    ResourceUsage::Write,
];

/// Buffer bound to the input assembler as vertex data
pub struct VertexBuffer<T: BufferElement> {
    core: Arc<ResourceCore>,
    length: u32,
    _marker: PhantomData<fn() -> T>,
}

/// Buffer of `u32` vertex indices
pub struct IndexBuffer {
    core: Arc<ResourceCore>,
    length: u32,
}

impl<T: BufferElement> ResourceSupport for VertexBuffer<T> {
    const SUPPORTED_USAGES: &'static [ResourceUsage] = PIPELINE_BUFFER_USAGES;
    const SUPPORTED_BINDINGS: GpuBindings = GpuBindings::NONE;
}

impl ResourceSupport for IndexBuffer {
    const SUPPORTED_USAGES: &'static [ResourceUsage] = PIPELINE_BUFFER_USAGES;
    const SUPPORTED_BINDINGS: GpuBindings = GpuBindings::NONE;
}

impl<T: BufferElement> VertexBuffer<T> {
    /// Builder seeded from this buffer; clones without `copy_data` carry no data
    pub fn clone_builder(&self, copy_data: bool) -> VertexBufferBuilder<T> {
        VertexBufferBuilder {
            module: Arc::clone(self.core.module()),
            params: BufferParams::cloned_from(&self.core, self.length, copy_data),
            memo: Memo::new(),
        }
    }
}

impl IndexBuffer {
    /// Builder seeded from this buffer; clones without `copy_data` carry no data
    pub fn clone_builder(&self, copy_data: bool) -> IndexBufferBuilder {
        IndexBufferBuilder {
            module: Arc::clone(self.core.module()),
            params: BufferParams::cloned_from(&self.core, self.length, copy_data),
            memo: Memo::new(),
        }
    }
}

impl<T: BufferElement> Resource for VertexBuffer<T> {
    fn core(&self) -> &Arc<ResourceCore> {
        &self.core
    }
}

impl Resource for IndexBuffer {
    fn core(&self) -> &Arc<ResourceCore> {
        &self.core
    }
}

impl<T: BufferElement> BufferResource for VertexBuffer<T> {
    type Element = T;

    fn length(&self) -> u32 {
        self.length
    }

    fn is_structured(&self) -> bool {
        native_format_of::<T>().is_none()
    }
}

impl BufferResource for IndexBuffer {
    type Element = u32;

    fn length(&self) -> u32 {
        self.length
    }

    fn is_structured(&self) -> bool {
        false
    }
}

impl<T: BufferElement> fmt::Display for VertexBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [Usage: {}, Length: {}]", self.core.kind(), self.usage(), self.length)
    }
}

impl fmt::Display for IndexBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [Usage: {}, Length: {}]", self.core.kind(), self.usage(), self.length)
    }
}

fn pipeline_buffer_desc<T: BufferElement>(kind: BufferKind, params: &BufferParams<T>) -> BufferDesc {
    let format = native_format_of::<T>();
    BufferDesc {
        kind,
        size_bytes: params.size_bytes(),
        element_size: size_of::<T>() as u32,
        usage: params.usage,
        bindings: params.bindings,
        structured: format.is_none(),
        allow_raw_access: false,
        format,
    }
}

// ===== BUILDERS =====

/// Builder for [`VertexBuffer<T>`]
#[derive(Clone)]
pub struct VertexBufferBuilder<T: BufferElement> {
    module: Arc<RenderingModule>,
    params: BufferParams<T>,
    memo: Memo<VertexBuffer<T>>,
}

impl<T: BufferElement> VertexBufferBuilder<T> {
    fn with_params(&self, params: BufferParams<T>) -> Self {
        Self { module: Arc::clone(&self.module), params, memo: Memo::new() }
    }

    pub fn usage(&self) -> ResourceUsage {
        self.params.usage
    }

    pub fn length(&self) -> u32 {
        self.params.length
    }

    pub fn with_usage(&self, usage: ResourceUsage) -> Self {
        self.with_params(self.params.with_usage(usage))
    }

    pub fn with_length(&self, length: u32) -> Self {
        self.with_params(self.params.with_length(length))
    }

    pub fn with_permitted_bindings(&self, bindings: GpuBindings) -> Self {
        self.with_params(self.params.with_bindings(bindings))
    }

    pub fn with_initial_data(&self, data: &[T]) -> Self {
        self.with_params(self.params.with_initial_data(data))
    }

    pub fn create(&self) -> Result<VertexBuffer<T>> {
        let kind = format!("VertexBuffer<{}>", short_type_name::<T>());
        check_support::<VertexBuffer<T>>(&kind, self.params.usage, self.params.bindings)?;
        self.params.assure_valid(self.module.validation(), &kind, false)?;
        let desc = pipeline_buffer_desc(BufferKind::Vertex, &self.params);
        let core = create_buffer_core(&self.module, &desc, &self.params, kind)?;
        Ok(VertexBuffer { core, length: self.params.length, _marker: PhantomData })
    }

    pub fn get_or_create(&self) -> Result<Arc<VertexBuffer<T>>> {
        self.memo.get_or_try_init(|| self.create())
    }
}

impl<T: BufferElement> TryFrom<&VertexBufferBuilder<T>> for Arc<VertexBuffer<T>> {
    type Error = Error;

    fn try_from(builder: &VertexBufferBuilder<T>) -> Result<Self> {
        builder.get_or_create()
    }
}

/// Builder for [`IndexBuffer`]
#[derive(Clone)]
pub struct IndexBufferBuilder {
    module: Arc<RenderingModule>,
    params: BufferParams<u32>,
    memo: Memo<IndexBuffer>,
}

impl IndexBufferBuilder {
    fn with_params(&self, params: BufferParams<u32>) -> Self {
        Self { module: Arc::clone(&self.module), params, memo: Memo::new() }
    }

    pub fn usage(&self) -> ResourceUsage {
        self.params.usage
    }

    pub fn length(&self) -> u32 {
        self.params.length
    }

    pub fn with_usage(&self, usage: ResourceUsage) -> Self {
        self.with_params(self.params.with_usage(usage))
    }

    pub fn with_length(&self, length: u32) -> Self {
        self.with_params(self.params.with_length(length))
    }

    pub fn with_permitted_bindings(&self, bindings: GpuBindings) -> Self {
        self.with_params(self.params.with_bindings(bindings))
    }

    pub fn with_initial_data(&self, indices: &[u32]) -> Self {
        self.with_params(self.params.with_initial_data(indices))
    }

    pub fn create(&self) -> Result<IndexBuffer> {
        let kind = "IndexBuffer".to_string();
        check_support::<IndexBuffer>(&kind, self.params.usage, self.params.bindings)?;
        self.params.assure_valid(self.module.validation(), &kind, false)?;
        let desc = pipeline_buffer_desc(BufferKind::Index, &self.params);
        let core = create_buffer_core(&self.module, &desc, &self.params, kind)?;
        Ok(IndexBuffer { core, length: self.params.length })
    }

    pub fn get_or_create(&self) -> Result<Arc<IndexBuffer>> {
        self.memo.get_or_try_init(|| self.create())
    }
}

impl TryFrom<&IndexBufferBuilder> for Arc<IndexBuffer> {
    type Error = Error;

    fn try_from(builder: &IndexBufferBuilder) -> Result<Self> {
        builder.get_or_create()
    }
}

impl RenderingModule {
    /// Builder for a vertex buffer of `T` (Immutable, no bindings)
    pub fn new_vertex_buffer<T: BufferElement>(self: &Arc<Self>) -> VertexBufferBuilder<T> {
        VertexBufferBuilder {
            module: Arc::clone(self),
            params: BufferParams::new(ResourceUsage::Immutable, GpuBindings::NONE),
            memo: Memo::new(),
        }
    }

    /// Builder for an index buffer (Immutable, no bindings)
    pub fn new_index_buffer(self: &Arc<Self>) -> IndexBufferBuilder {
        IndexBufferBuilder {
            module: Arc::clone(self),
            params: BufferParams::new(ResourceUsage::Immutable, GpuBindings::NONE),
            memo: Memo::new(),
        }
    }
}
