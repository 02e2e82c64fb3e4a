/// Shader constant buffers

use std::fmt;
use std::marker::PhantomData;
use std::mem::size_of;
use std::sync::Arc;
use crate::backend::{BufferDesc, BufferKind, MapMode};
use crate::device::RenderingModule;
use crate::error::{Error, Result};
use crate::resource::{Resource, ResourceCore, ResourceSupport, ResourceUsage, GpuBindings};
use crate::resource::buffer::{BufferElement, BufferResource};
use crate::resource::buffer::buffer_resource::{BufferParams, create_buffer_core};
use crate::resource::memo::Memo;
use crate::resource::resource::{check_support, short_type_name};

/// Required alignment of a constant buffer's element, in bytes
const CONSTANT_BUFFER_ALIGNMENT: usize = 16;

/// Single-element buffer bound to shader constant slots
pub struct ConstantBuffer<T: BufferElement> {
    core: Arc<ResourceCore>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: BufferElement> ResourceSupport for ConstantBuffer<T> {
    const SUPPORTED_USAGES: &'static [ResourceUsage] = &[ResourceUsage::Immutable, ResourceUsage::DiscardWrite];
    const SUPPORTED_BINDINGS: GpuBindings = GpuBindings::NONE;
}

impl<T: BufferElement> ConstantBuffer<T> {
    /// Replace the constant value (write-discard)
    pub fn discard_write(&self, value: &T) -> Result<()> {
        self.core.require_usage(self.core.usage().can_discard_write(), "discard-write to")?;
        self.core.map_and_write(0, MapMode::WriteDiscard, 0, bytemuck::bytes_of(value))
    }

    /// Builder seeded from this buffer
    ///
    /// Without `copy_data` the clone starts from a zeroed value.
    pub fn clone_builder(&self, copy_data: bool) -> ConstantBufferBuilder<T> {
        let mut params = BufferParams::cloned_from(&self.core, 1, copy_data);
        if !copy_data {
            params = params.with_initial_data(&[T::zeroed()]);
        }
        ConstantBufferBuilder { module: Arc::clone(self.core.module()), params, memo: Memo::new() }
    }
}

impl<T: BufferElement> Resource for ConstantBuffer<T> {
    fn core(&self) -> &Arc<ResourceCore> {
        &self.core
    }
}

impl<T: BufferElement> BufferResource for ConstantBuffer<T> {
    type Element = T;

    fn length(&self) -> u32 {
        1
    }

    fn is_structured(&self) -> bool {
        true
    }
}

impl<T: BufferElement> fmt::Display for ConstantBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [Usage: {}, Size: {}]", self.core.kind(), self.usage(), self.size_bytes())
    }
}

/// Builder for [`ConstantBuffer<T>`]
#[derive(Clone)]
pub struct ConstantBufferBuilder<T: BufferElement> {
    module: Arc<RenderingModule>,
    params: BufferParams<T>,
    memo: Memo<ConstantBuffer<T>>,
}

impl<T: BufferElement> ConstantBufferBuilder<T> {
    fn with_params(&self, params: BufferParams<T>) -> Self {
        Self { module: Arc::clone(&self.module), params, memo: Memo::new() }
    }

    pub fn usage(&self) -> ResourceUsage {
        self.params.usage
    }

    pub fn initial_value(&self) -> Option<T> {
        self.params.initial_data.as_ref().and_then(|data| data.first().copied())
    }

    pub fn with_usage(&self, usage: ResourceUsage) -> Self {
        self.with_params(self.params.with_usage(usage))
    }

    pub fn with_permitted_bindings(&self, bindings: GpuBindings) -> Self {
        self.with_params(self.params.with_bindings(bindings))
    }

    pub fn with_initial_value(&self, value: T) -> Self {
        self.with_params(self.params.with_initial_data(&[value]))
    }

    pub fn create(&self) -> Result<ConstantBuffer<T>> {
        let kind = format!("ConstantBuffer<{}>", short_type_name::<T>());
        let params = &self.params;
        check_support::<ConstantBuffer<T>>(&kind, params.usage, params.bindings)?;
        let validation = self.module.validation();
        params.assure_valid(validation, &kind, false)?;
        validation.assure(size_of::<T>() % CONSTANT_BUFFER_ALIGNMENT == 0, || {
            format!(
                "{}: element size {} is not a multiple of {} bytes.",
                kind, size_of::<T>(), CONSTANT_BUFFER_ALIGNMENT
            )
        })?;

        let desc = BufferDesc {
            kind: BufferKind::Constant,
            size_bytes: params.size_bytes(),
            element_size: size_of::<T>() as u32,
            usage: params.usage,
            bindings: params.bindings,
            structured: true,
            allow_raw_access: false,
            format: None,
        };
        let core = create_buffer_core(&self.module, &desc, params, kind)?;
        Ok(ConstantBuffer { core, _marker: PhantomData })
    }

    pub fn get_or_create(&self) -> Result<Arc<ConstantBuffer<T>>> {
        self.memo.get_or_try_init(|| self.create())
    }
}

impl<T: BufferElement> TryFrom<&ConstantBufferBuilder<T>> for Arc<ConstantBuffer<T>> {
    type Error = Error;

    fn try_from(builder: &ConstantBufferBuilder<T>) -> Result<Self> {
        builder.get_or_create()
    }
}

impl RenderingModule {
    /// Builder for a constant buffer holding one `T`
    ///
    /// Defaults: Immutable usage with a zeroed initial value.
    pub fn new_constant_buffer<T: BufferElement>(self: &Arc<Self>) -> ConstantBufferBuilder<T> {
        ConstantBufferBuilder {
            module: Arc::clone(self),
            params: BufferParams::new(ResourceUsage::Immutable, GpuBindings::NONE).with_initial_data(&[T::zeroed()]),
            memo: Memo::new(),
        }
    }
}
