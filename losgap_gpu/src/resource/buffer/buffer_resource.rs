/// Shared buffer machinery: element bound, the `BufferResource` trait and builder parameters

use std::mem::size_of;
use std::sync::Arc;
use bytemuck::Pod;
use crate::backend::{BufferDesc, MapMode, SubresourceCopy};
use crate::device::RenderingModule;
use crate::error::Result;
use crate::resource::{
    Resource, ResourceCore, ResourceUsage, GpuBindings, SubresourceBox, RawResourceDataView,
};
use crate::resource::resource::{copy_endpoints_disposed, copy_initial_contents};
use crate::validation::Validation;

const LOG_SOURCE: &str = "losgap::Buffer";

/// Element type storable in a buffer
pub trait BufferElement: Pod + Send + Sync + 'static {}

impl<T: Pod + Send + Sync + 'static> BufferElement for T {}

/// Operations shared by every buffer type
pub trait BufferResource: Resource {
    type Element: BufferElement;

    /// Number of elements
    fn length(&self) -> u32;

    /// True when the element type has no native format
    fn is_structured(&self) -> bool;

    fn element_size(&self) -> u32 {
        size_of::<Self::Element>() as u32
    }

    /// Write `data` starting at element `offset`
    fn write(&self, data: &[Self::Element], offset: u32) -> Result<()> {
        let core = self.core();
        core.require_usage(core.usage().can_write(), "write to")?;
        core.validation().assure_range(offset as u64, data.len() as u64, self.length() as u64, "Write")?;
        if data.is_empty() {
            return Ok(());
        }

        let bytes: &[u8] = bytemuck::cast_slice(data);
        let byte_offset = offset * self.element_size();
        if core.usage() == ResourceUsage::Write {
            let region = SubresourceBox::new(byte_offset, byte_offset + bytes.len() as u32);
            let context = core.context()?;
            core.backend().update_subresource_region(
                context,
                core.handle(),
                0,
                &region,
                bytes,
                bytes.len() as u32,
                bytes.len() as u32,
            )
        } else {
            core.map_and_write(0, core.write_map_mode(), byte_offset as usize, bytes)
        }
    }

    /// Overwrite through a write-discard mapping, starting at element `offset`
    ///
    /// Contents outside the written range are undefined afterwards.
    fn discard_write(&self, data: &[Self::Element], offset: u32) -> Result<()> {
        let core = self.core();
        core.require_usage(core.usage().can_discard_write(), "discard-write to")?;
        core.validation().assure_range(offset as u64, data.len() as u64, self.length() as u64, "Discard write")?;
        core.map_and_write(
            0,
            MapMode::WriteDiscard,
            (offset * self.element_size()) as usize,
            bytemuck::cast_slice(data),
        )
    }

    /// Read every element back
    fn read(&self) -> Result<Vec<Self::Element>> {
        let core = self.core();
        core.require_usage(core.usage().can_read(), "read from")?;
        let bytes = core.map_and_read(0, 0, self.length() as usize * self.element_size() as usize)?;
        Ok(bytemuck::pod_collect_to_vec(&bytes))
    }

    /// Map read/write and hand the elements to `action`
    fn read_write<F>(&self, action: F) -> Result<()>
    where
        F: FnOnce(&mut RawResourceDataView<'_, Self::Element>),
    {
        let core = self.core();
        core.require_usage(core.usage().can_read_write(), "read/write")?;
        let length = self.length();
        core.map(0, MapMode::ReadWrite, |mapped| {
            let mut view = RawResourceDataView::new(
                mapped.data,
                length,
                1,
                1,
                mapped.row_pitch as usize,
                mapped.depth_pitch as usize,
            );
            action(&mut view);
        })
    }

    /// Copy the whole buffer into `destination` (same byte size required)
    fn copy_to<D: Resource + ?Sized>(&self, destination: &D) -> Result<()> {
        crate::resource::resource::copy_whole_resource(self.core(), destination.core())
    }

    /// Copy `count` elements from `source_first` to element `destination_offset` of `destination`
    fn copy_to_range<D>(&self, destination: &D, source_first: u32, count: u32, destination_offset: u32) -> Result<()>
    where
        D: BufferResource<Element = Self::Element> + ?Sized,
    {
        let (source_core, destination_core) = (self.core(), destination.core());
        if copy_endpoints_disposed(source_core, destination_core) {
            return Ok(());
        }
        destination_core.require_usage(destination_core.usage().can_be_copy_destination(), "copy to")?;

        let validation = source_core.validation();
        validation.assure(source_core.handle() != destination_core.handle(), || {
            format!("Can not copy {} to itself.", source_core.kind())
        })?;
        validation.assure_range(source_first as u64, count as u64, self.length() as u64, "Copy source")?;
        validation.assure_range(destination_offset as u64, count as u64, destination.length() as u64, "Copy destination")?;

        let element_size = self.element_size();
        let copy = SubresourceCopy {
            source: source_core.handle(),
            source_subresource: 0,
            region: SubresourceBox::new(source_first * element_size, (source_first + count) * element_size),
            destination: destination_core.handle(),
            destination_subresource: 0,
            destination_offset: [destination_offset * element_size, 0, 0],
        };
        let context = source_core.context()?;
        source_core.backend().copy_subresource_region(context, &copy)
    }
}

// ===== BUILDER PARAMETERS =====

/// Builder state shared by every buffer builder
pub(crate) struct BufferParams<T> {
    pub usage: ResourceUsage,
    pub length: u32,
    pub bindings: GpuBindings,
    pub initial_data: Option<Arc<[T]>>,
    /// Resource copied into the new buffer right after creation
    pub copy_source: Option<Arc<ResourceCore>>,
}

impl<T> Clone for BufferParams<T> {
    fn clone(&self) -> Self {
        Self {
            usage: self.usage,
            length: self.length,
            bindings: self.bindings,
            initial_data: self.initial_data.clone(),
            copy_source: self.copy_source.clone(),
        }
    }
}

impl<T: BufferElement> BufferParams<T> {
    pub fn new(usage: ResourceUsage, bindings: GpuBindings) -> Self {
        Self { usage, length: 0, bindings, initial_data: None, copy_source: None }
    }

    /// Parameters seeded from an existing buffer
    pub fn cloned_from(core: &Arc<ResourceCore>, length: u32, copy_data: bool) -> Self {
        Self {
            usage: core.usage(),
            length,
            bindings: core.permitted_bindings(),
            initial_data: None,
            copy_source: copy_data.then(|| Arc::clone(core)),
        }
    }

    pub fn with_usage(&self, usage: ResourceUsage) -> Self {
        Self { usage, ..self.clone() }
    }

    pub fn with_bindings(&self, bindings: GpuBindings) -> Self {
        Self { bindings, ..self.clone() }
    }

    /// Keeps the initial data only if its length still matches
    pub fn with_length(&self, length: u32) -> Self {
        let initial_data = self.initial_data.clone().filter(|data| data.len() == length as usize);
        Self { length, initial_data, ..self.clone() }
    }

    pub fn with_initial_data(&self, data: &[T]) -> Self {
        Self {
            length: data.len() as u32,
            initial_data: Some(Arc::from(data)),
            ..self.clone()
        }
    }

    /// Same byte size viewed as `U` elements; typed initial data is dropped
    pub fn with_element_type<U: BufferElement>(&self, validation: Validation) -> Result<BufferParams<U>> {
        let byte_size = self.length as u64 * size_of::<T>() as u64;
        let element_size = size_of::<U>().max(1) as u64;
        validation.assure(byte_size % element_size == 0, || {
            format!(
                "Can not view {} bytes as elements of {} bytes: the size is not a multiple.",
                byte_size, element_size
            )
        })?;
        Ok(BufferParams {
            usage: self.usage,
            length: (byte_size / element_size) as u32,
            bindings: self.bindings,
            initial_data: None,
            copy_source: self.copy_source.clone(),
        })
    }

    pub fn size_bytes(&self) -> u64 {
        self.length as u64 * size_of::<T>() as u64
    }

    /// Construction assurances common to every buffer
    ///
    /// `require_bindings_when_static` rejects Immutable and DiscardWrite
    /// buffers with no bindings, which could never be read by the GPU.
    pub fn assure_valid(&self, validation: Validation, kind: &str, require_bindings_when_static: bool) -> Result<()> {
        let is_static = matches!(self.usage, ResourceUsage::Immutable | ResourceUsage::DiscardWrite);

        validation.assure(
            self.usage != ResourceUsage::Immutable || self.initial_data.is_some() || self.copy_source.is_some(),
            || format!("{}: immutable resources require initial data.", kind),
        )?;
        validation.assure(
            !(require_bindings_when_static && is_static && self.bindings.is_none()),
            || format!("{}: {} resources without GPU bindings are useless.", kind, self.usage),
        )?;
        validation.assure(
            !self.usage.is_staging() || self.bindings.is_none(),
            || format!("{}: staging resources can not have GPU bindings ({:?}).", kind, self.bindings),
        )?;
        validation.assure(
            !is_static || !self.bindings.intersects(GpuBindings::GPU_WRITABLE),
            || format!("{}: {} resources can not be written by the GPU ({:?}).", kind, self.usage, self.bindings),
        )?;
        validation.assure(self.length > 0, || format!("{}: length must be greater than zero.", kind))?;
        if let Some(data) = &self.initial_data {
            validation.assure(data.len() == self.length as usize, || {
                format!("{}: initial data has {} elements, length is {}.", kind, data.len(), self.length)
            })?;
        }
        Ok(())
    }
}

/// Allocate the native buffer, upload initial data and run the pending copy
pub(crate) fn create_buffer_core<T: BufferElement>(
    module: &Arc<RenderingModule>,
    desc: &BufferDesc,
    params: &BufferParams<T>,
    kind: String,
) -> Result<Arc<ResourceCore>> {
    let device = module.device()?;
    let initial_bytes: Option<&[u8]> = params.initial_data.as_deref().map(bytemuck::cast_slice);
    let handle = module.backend().create_buffer(device, desc, initial_bytes)?;
    let core = ResourceCore::new(Arc::clone(module), handle, desc.usage, desc.size_bytes, desc.bindings, kind);

    if let Some(source) = &params.copy_source {
        if let Err(e) = copy_initial_contents(source, &core) {
            crate::losgap_error!(LOG_SOURCE, "Initial copy into {} failed: {}", core.kind(), e);
            let _ = core.dispose();
            return Err(e);
        }
    }
    Ok(core)
}
