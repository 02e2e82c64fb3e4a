/// General purpose typed buffer and its builder

use std::fmt;
use std::marker::PhantomData;
use std::mem::size_of;
use std::sync::Arc;
use crate::backend::{BufferDesc, BufferKind, ShaderResourceRange, UnorderedAccessRange};
use crate::device::RenderingModule;
use crate::error::{Error, Result};
use crate::resource::{
    Resource, ResourceCore, ResourceSupport, ResourceUsage, GpuBindings, native_format_of,
};
use crate::resource::buffer::{BufferElement, BufferResource};
use crate::resource::buffer::buffer_resource::{BufferParams, create_buffer_core};
use crate::resource::memo::Memo;
use crate::resource::resource::{check_support, short_type_name};
use crate::view::{ShaderResourceView, UnorderedAccessView};

/// Typed GPU buffer
///
/// Buffers bindable as shader resources or unordered-access targets. Elements
/// of a type without a native format make the buffer *structured*.
pub struct Buffer<T: BufferElement> {
    core: Arc<ResourceCore>,
    length: u32,
    structured: bool,
    _marker: PhantomData<fn() -> T>,
}

impl<T: BufferElement> ResourceSupport for Buffer<T> {
    const SUPPORTED_USAGES: &'static [ResourceUsage] = &ResourceUsage::ALL;
    const SUPPORTED_BINDINGS: GpuBindings = GpuBindings::READABLE_SHADER_RESOURCE
        .union(GpuBindings::WRITABLE_SHADER_RESOURCE);
}

impl<T: BufferElement> Buffer<T> {
    /// Raw (byte-address) views are possible: natively formatted elements and shader bindings
    pub fn allows_raw_access(&self) -> bool {
        !self.structured && self.permitted_bindings().intersects(Self::SUPPORTED_BINDINGS)
    }

    /// Builder seeded with this buffer's usage, length and bindings
    ///
    /// With `copy_data`, the new buffer receives a copy of this one's contents
    /// right after creation.
    pub fn clone_builder(&self, copy_data: bool) -> BufferBuilder<T> {
        BufferBuilder {
            module: Arc::clone(self.core.module()),
            params: BufferParams::cloned_from(&self.core, self.length, copy_data),
            memo: Memo::new(),
        }
    }

    /// Shader-resource view over `count` elements from `first`
    pub fn create_view(&self, first: u32, count: u32) -> Result<ShaderResourceView> {
        self.core.require_binding(GpuBindings::READABLE_SHADER_RESOURCE, "shader resource view")?;
        let validation = self.core.validation();
        validation.assure(count > 0, || "A view must cover at least one element.".to_string())?;
        validation.assure_range(first as u64, count as u64, self.length as u64, "View")?;
        ShaderResourceView::create(
            &self.core,
            self.to_string(),
            ShaderResourceRange::Buffer { first_element: first, num_elements: count },
        )
    }

    pub fn create_default_view(&self) -> Result<ShaderResourceView> {
        self.create_view(0, self.length)
    }

    /// Unordered-access view over `count` elements from `first`
    ///
    /// Buffers of natively formatted elements get raw views, which support
    /// neither append/consume nor a hidden counter.
    pub fn create_unordered_access_view(
        &self,
        first: u32,
        count: u32,
        append_consume: bool,
        include_counter: bool,
    ) -> Result<UnorderedAccessView> {
        self.core.require_binding(GpuBindings::WRITABLE_SHADER_RESOURCE, "unordered access view")?;
        let raw = !self.structured;
        if append_consume && include_counter {
            return Err(Error::InvalidArgument(
                "Append/consume and counter support are mutually exclusive.".to_string()
            ));
        }
        if raw && (append_consume || include_counter) {
            return Err(Error::InvalidArgument(format!(
                "Raw view over {} can not have append/consume or counter support.", self.core.kind()
            )));
        }
        let validation = self.core.validation();
        validation.assure(count > 0, || "A view must cover at least one element.".to_string())?;
        validation.assure_range(first as u64, count as u64, self.length as u64, "View")?;
        UnorderedAccessView::create(
            &self.core,
            self.to_string(),
            UnorderedAccessRange::Buffer {
                first_element: first,
                num_elements: count,
                append_consume,
                include_counter,
                raw,
            },
        )
    }

    pub fn create_default_unordered_access_view(&self) -> Result<UnorderedAccessView> {
        self.create_unordered_access_view(0, self.length, false, false)
    }
}

impl<T: BufferElement> Resource for Buffer<T> {
    fn core(&self) -> &Arc<ResourceCore> {
        &self.core
    }
}

impl<T: BufferElement> BufferResource for Buffer<T> {
    type Element = T;

    fn length(&self) -> u32 {
        self.length
    }

    fn is_structured(&self) -> bool {
        self.structured
    }
}

impl<T: BufferElement> fmt::Display for Buffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [Usage: {}, Length: {}]", self.core.kind(), self.usage(), self.length)
    }
}

impl<T: BufferElement> fmt::Debug for Buffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("core", &self.core)
            .field("length", &self.length)
            .field("structured", &self.structured)
            .finish()
    }
}

// ===== BUILDER =====

/// Builder for [`Buffer<T>`]
///
/// Every `with_*` call returns a new builder; the original is left untouched.
#[derive(Clone)]
pub struct BufferBuilder<T: BufferElement> {
    module: Arc<RenderingModule>,
    params: BufferParams<T>,
    memo: Memo<Buffer<T>>,
}

impl<T: BufferElement> BufferBuilder<T> {
    fn with_params(&self, params: BufferParams<T>) -> Self {
        Self { module: Arc::clone(&self.module), params, memo: Memo::new() }
    }

    pub fn usage(&self) -> ResourceUsage {
        self.params.usage
    }

    pub fn length(&self) -> u32 {
        self.params.length
    }

    pub fn permitted_bindings(&self) -> GpuBindings {
        self.params.bindings
    }

    pub fn initial_data(&self) -> Option<&[T]> {
        self.params.initial_data.as_deref()
    }

    pub fn with_usage(&self, usage: ResourceUsage) -> Self {
        self.with_params(self.params.with_usage(usage))
    }

    /// Initial data is kept only if it still has `length` elements
    pub fn with_length(&self, length: u32) -> Self {
        self.with_params(self.params.with_length(length))
    }

    pub fn with_permitted_bindings(&self, bindings: GpuBindings) -> Self {
        self.with_params(self.params.with_bindings(bindings))
    }

    /// Set the initial contents; the length follows the data
    pub fn with_initial_data(&self, data: &[T]) -> Self {
        self.with_params(self.params.with_initial_data(data))
    }

    /// Same byte size with a different element type
    ///
    /// The byte size must be a multiple of the new element size.
    pub fn with_element_type<U: BufferElement>(&self) -> Result<BufferBuilder<U>> {
        Ok(BufferBuilder {
            module: Arc::clone(&self.module),
            params: self.params.with_element_type::<U>(self.module.validation())?,
            memo: Memo::new(),
        })
    }

    /// Create a new buffer from the current state
    pub fn create(&self) -> Result<Buffer<T>> {
        let kind = format!("Buffer<{}>", short_type_name::<T>());
        let params = &self.params;
        check_support::<Buffer<T>>(&kind, params.usage, params.bindings)?;
        params.assure_valid(self.module.validation(), &kind, true)?;

        let format = native_format_of::<T>();
        let structured = format.is_none();
        let desc = BufferDesc {
            kind: BufferKind::Generic,
            size_bytes: params.size_bytes(),
            element_size: size_of::<T>() as u32,
            usage: params.usage,
            bindings: params.bindings,
            structured,
            allow_raw_access: !structured && params.bindings.intersects(Buffer::<T>::SUPPORTED_BINDINGS),
            format,
        };
        let core = create_buffer_core(&self.module, &desc, params, kind)?;
        Ok(Buffer { core, length: params.length, structured, _marker: PhantomData })
    }

    /// The buffer created from this builder state, creating it on first call
    pub fn get_or_create(&self) -> Result<Arc<Buffer<T>>> {
        self.memo.get_or_try_init(|| self.create())
    }
}

impl<T: BufferElement> TryFrom<&BufferBuilder<T>> for Arc<Buffer<T>> {
    type Error = Error;

    fn try_from(builder: &BufferBuilder<T>) -> Result<Self> {
        builder.get_or_create()
    }
}

impl RenderingModule {
    /// Builder for a general purpose buffer of `T`
    ///
    /// Defaults: Immutable usage, no data, readable shader resource binding.
    pub fn new_buffer<T: BufferElement>(self: &Arc<Self>) -> BufferBuilder<T> {
        BufferBuilder {
            module: Arc::clone(self),
            params: BufferParams::new(ResourceUsage::Immutable, GpuBindings::READABLE_SHADER_RESOURCE),
            memo: Memo::new(),
        }
    }
}
