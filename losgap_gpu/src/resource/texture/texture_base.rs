/// Texture state and the operations shared by every dimensionality

use std::fmt;
use std::marker::PhantomData;
use std::mem::size_of;
use std::sync::Arc;
use crate::backend::{TextureDimension, MapMode, MappedSubresource, SubresourceCopy, ShaderResourceRange, UnorderedAccessRange};
use crate::error::Result;
use crate::resource::{
    Resource, ResourceCore, ResourceUsage, GpuBindings, SubresourceBox, RawResourceDataView,
    Texel, TexelFormat, texture_utils,
};
use crate::resource::resource::{copy_endpoints_disposed, copy_whole_resource};
use crate::resource::texture::texture_params::{TextureCopySource, TextureShape};
use crate::view::{ShaderResourceView, UnorderedAccessView, RenderTargetView, DepthStencilView, ResourceView};

const LOG_SOURCE: &str = "losgap::Texture";

/// Position of a texture inside its array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ArraySlot {
    pub index: u32,
    pub length: u32,
}

/// State of one texture, standalone or an element of an array
///
/// Array elements share their array's [`ResourceCore`].
pub struct TextureBase<T: Texel> {
    core: Arc<ResourceCore>,
    /// "Texture2D<Rgba8UNorm>"
    kind: String,
    dimension: TextureDimension,
    width: u32,
    height: u32,
    depth: u32,
    num_mips: u32,
    mip_allocation: bool,
    mip_generation_target: bool,
    dynamic_detail: bool,
    multisampled: bool,
    slot: Option<ArraySlot>,
    _marker: PhantomData<fn() -> T>,
}

/// Copy a tightly packed region into pitched mapped memory; false if it does not fit
fn copy_into_mapped(mapped: &mut MappedSubresource<'_>, region: &SubresourceBox, texel_size: usize, source: &[u8]) -> bool {
    let row_bytes = region.width() as usize * texel_size;
    let (row_pitch, depth_pitch) = (mapped.row_pitch as usize, mapped.depth_pitch as usize);
    let mut rows = source.chunks_exact(row_bytes.max(1));
    for w in region.w_min..region.w_max {
        for v in region.v_min..region.v_max {
            let start = w as usize * depth_pitch + v as usize * row_pitch + region.u_min as usize * texel_size;
            let (Some(target), Some(row)) = (mapped.data.get_mut(start..start + row_bytes), rows.next()) else {
                return false;
            };
            target.copy_from_slice(row);
        }
    }
    true
}

/// Copy a `width x height x depth` region out of pitched mapped memory into a tight buffer
fn copy_from_mapped(mapped: &MappedSubresource<'_>, width: u32, height: u32, depth: u32, texel_size: usize) -> Option<Vec<u8>> {
    let row_bytes = width as usize * texel_size;
    let mut out = Vec::with_capacity(row_bytes * height as usize * depth as usize);
    for w in 0..depth as usize {
        for v in 0..height as usize {
            let start = w * mapped.depth_pitch as usize + v * mapped.row_pitch as usize;
            out.extend_from_slice(mapped.data.get(start..start + row_bytes)?);
        }
    }
    Some(out)
}

impl<T: Texel> TextureBase<T> {
    pub(crate) fn new(
        core: Arc<ResourceCore>,
        kind: String,
        dimension: TextureDimension,
        shape: TextureShape,
        slot: Option<ArraySlot>,
    ) -> Self {
        let num_mips = if shape.mip_allocation {
            texture_utils::num_mips(shape.width, shape.height, shape.depth)
        } else {
            1
        };
        Self {
            core,
            kind,
            dimension,
            width: shape.width,
            height: shape.height,
            depth: shape.depth,
            num_mips,
            mip_allocation: shape.mip_allocation,
            mip_generation_target: shape.mip_generation_target,
            dynamic_detail: shape.dynamic_detail,
            multisampled: shape.multisampled,
            slot,
            _marker: PhantomData,
        }
    }

    pub(crate) fn core(&self) -> &Arc<ResourceCore> {
        &self.core
    }

    pub(crate) fn kind(&self) -> &str {
        &self.kind
    }

    pub(crate) fn shape(&self) -> TextureShape {
        TextureShape {
            width: self.width,
            height: self.height,
            depth: self.depth,
            mip_allocation: self.mip_allocation,
            mip_generation_target: self.mip_generation_target,
            dynamic_detail: self.dynamic_detail,
            multisampled: self.multisampled,
        }
    }

    pub(crate) fn slot(&self) -> Option<ArraySlot> {
        self.slot
    }

    /// This texture as the initial-data source of a clone
    pub(crate) fn copy_source(&self) -> TextureCopySource {
        TextureCopySource { core: Arc::clone(&self.core), slot: self.slot, num_mips: self.num_mips }
    }

    /// Size of this texture; for array elements, the array's size over its length
    pub(crate) fn size_bytes(&self) -> u64 {
        match self.slot {
            Some(slot) => self.core.size_bytes() / slot.length.max(1) as u64,
            None => self.core.size_bytes(),
        }
    }

    /// Dispose a standalone texture; array elements only log a warning
    pub(crate) fn dispose(&self) -> Result<()> {
        if self.slot.is_some() {
            crate::losgap_warn!(
                LOG_SOURCE,
                "Can not dispose an element of {}: dispose the array instead.",
                self.core.kind()
            );
            return Ok(());
        }
        self.core.dispose()
    }

    fn texel_size() -> usize {
        size_of::<T>()
    }

    fn assure_mip(&self, mip_index: u32) -> Result<()> {
        self.core.validation().assure_index(mip_index, self.num_mips, "Mip index")
    }

    pub(crate) fn mip_extent(&self, mip_index: u32) -> (u32, u32, u32) {
        (
            texture_utils::mip_dimension(self.width, mip_index),
            texture_utils::mip_dimension(self.height, mip_index),
            texture_utils::mip_dimension(self.depth, mip_index),
        )
    }

    pub(crate) fn subresource(&self, mip_index: u32) -> Result<u32> {
        self.assure_mip(mip_index)?;
        let array_index = self.slot.map_or(0, |slot| slot.index);
        Ok(texture_utils::subresource_index(self.num_mips, mip_index, array_index))
    }

    // ===== DATA TRANSFER =====

    /// Write `data` into `region` of a mip
    pub(crate) fn write_region(&self, data: &[T], mip_index: u32, region: &SubresourceBox) -> Result<()> {
        let core = &self.core;
        core.require_usage(core.usage().can_write(), "write to")?;
        let subresource = self.subresource(mip_index)?;
        let (mip_width, mip_height, mip_depth) = self.mip_extent(mip_index);
        let validation = core.validation();
        validation.assure(data.len() as u64 == region.volume(), || {
            format!("Data length {} does not match write region {} (volume {}).", data.len(), region, region.volume())
        })?;
        validation.assure(region.fits_within(mip_width, mip_height, mip_depth), || {
            format!("Write region {} exceeds mip {} ({}x{}x{}).", region, mip_index, mip_width, mip_height, mip_depth)
        })?;
        if data.is_empty() {
            return Ok(());
        }

        let bytes: &[u8] = bytemuck::cast_slice(data);
        if core.usage() == ResourceUsage::Write {
            let row_pitch = region.width() * Self::texel_size() as u32;
            let context = core.context()?;
            return core.backend().update_subresource_region(
                context,
                core.handle(),
                subresource,
                region,
                bytes,
                row_pitch,
                row_pitch * region.height(),
            );
        }

        let mut copied = false;
        core.map(subresource, core.write_map_mode(), |mut mapped| {
            copied = copy_into_mapped(&mut mapped, region, Self::texel_size(), bytes);
        })?;
        if !copied {
            crate::losgap_bail!(LOG_SOURCE, "Mapped memory of {} too small for region {}", self.kind, region);
        }
        Ok(())
    }

    /// Overwrite a whole mip through a write-discard mapping
    pub(crate) fn discard_write(&self, data: &[T], mip_index: u32) -> Result<()> {
        let core = &self.core;
        core.require_usage(core.usage().can_discard_write(), "discard-write to")?;
        let subresource = self.subresource(mip_index)?;
        let (mip_width, mip_height, mip_depth) = self.mip_extent(mip_index);
        let expected = mip_width as u64 * mip_height as u64 * mip_depth as u64;
        core.validation().assure(data.len() as u64 == expected, || {
            format!("Data length {} does not match mip {} texel count {}.", data.len(), mip_index, expected)
        })?;

        let region = SubresourceBox::whole(mip_width, mip_height, mip_depth);
        let bytes: &[u8] = bytemuck::cast_slice(data);
        let mut copied = false;
        core.map(subresource, MapMode::WriteDiscard, |mut mapped| {
            copied = copy_into_mapped(&mut mapped, &region, Self::texel_size(), bytes);
        })?;
        if !copied {
            crate::losgap_bail!(LOG_SOURCE, "Mapped memory of {} too small for mip {}", self.kind, mip_index);
        }
        Ok(())
    }

    /// Every texel of a mip, tightly packed
    pub(crate) fn read_mip(&self, mip_index: u32) -> Result<Vec<T>> {
        let core = &self.core;
        core.require_usage(core.usage().can_read(), "read from")?;
        let subresource = self.subresource(mip_index)?;
        let (mip_width, mip_height, mip_depth) = self.mip_extent(mip_index);

        let mut bytes = None;
        core.map(subresource, MapMode::Read, |mapped| {
            bytes = copy_from_mapped(&mapped, mip_width, mip_height, mip_depth, Self::texel_size());
        })?;
        match bytes {
            Some(bytes) => Ok(bytemuck::pod_collect_to_vec(&bytes)),
            None => Err(crate::losgap_err!(LOG_SOURCE, "Mapped memory of {} too small for mip {}", self.kind, mip_index)),
        }
    }

    /// Every mip, largest first
    pub(crate) fn read_all(&self) -> Result<Vec<T>> {
        let core = &self.core;
        core.require_usage(core.usage().can_read(), "read from")?;
        let mut texels = Vec::with_capacity(
            texture_utils::size_texels(self.mip_allocation, self.width, self.height, self.depth) as usize
        );
        for mip_index in 0..self.num_mips {
            texels.extend(self.read_mip(mip_index)?);
        }
        Ok(texels)
    }

    pub(crate) fn read_write<F>(&self, action: F, mip_index: u32) -> Result<()>
    where
        F: FnOnce(&mut RawResourceDataView<'_, T>),
    {
        let core = &self.core;
        core.require_usage(core.usage().can_read_write(), "read/write")?;
        let subresource = self.subresource(mip_index)?;
        let (mip_width, mip_height, mip_depth) = self.mip_extent(mip_index);
        core.map(subresource, MapMode::ReadWrite, |mapped| {
            let mut view = RawResourceDataView::new(
                mapped.data,
                mip_width,
                mip_height,
                mip_depth,
                mapped.row_pitch as usize,
                mapped.depth_pitch as usize,
            );
            action(&mut view);
        })
    }

    /// Copy every mip of this texture into `destination`
    pub(crate) fn copy_to(&self, destination: &TextureBase<T>) -> Result<()> {
        if self.slot.is_none() && destination.slot.is_none() {
            return copy_whole_resource(&self.core, &destination.core);
        }

        // At least one side is an array element: copy mip by mip
        if copy_endpoints_disposed(&self.core, &destination.core) {
            return Ok(());
        }
        let destination_core = &destination.core;
        destination_core.require_usage(destination_core.usage().can_be_copy_destination(), "copy to")?;
        let validation = self.core.validation();
        validation.assure(
            self.core.handle() != destination_core.handle() || self.slot != destination.slot,
            || format!("Can not copy {} to itself.", self.kind),
        )?;
        validation.assure(self.shape_matches(destination), || {
            format!("Can not copy {} to {}: dimensions or mip counts differ.", self.kind, destination.kind)
        })?;

        let context = self.core.context()?;
        for mip_index in 0..self.num_mips {
            let (mip_width, mip_height, mip_depth) = self.mip_extent(mip_index);
            let copy = SubresourceCopy {
                source: self.core.handle(),
                source_subresource: self.subresource(mip_index)?,
                region: SubresourceBox::whole(mip_width, mip_height, mip_depth),
                destination: destination_core.handle(),
                destination_subresource: destination.subresource(mip_index)?,
                destination_offset: [0, 0, 0],
            };
            self.core.backend().copy_subresource_region(context, &copy)?;
        }
        Ok(())
    }

    fn shape_matches(&self, other: &TextureBase<T>) -> bool {
        (self.width, self.height, self.depth, self.num_mips) == (other.width, other.height, other.depth, other.num_mips)
    }

    /// Copy `region` of `source_mip` to `destination_mip` of `destination` at `offset`
    pub(crate) fn copy_to_region(
        &self,
        destination: &TextureBase<T>,
        region: &SubresourceBox,
        source_mip: u32,
        destination_mip: u32,
        offset: [u32; 3],
    ) -> Result<()> {
        if copy_endpoints_disposed(&self.core, &destination.core) {
            return Ok(());
        }
        let destination_core = &destination.core;
        destination_core.require_usage(destination_core.usage().can_be_copy_destination(), "copy to")?;

        let source_subresource = self.subresource(source_mip)?;
        let destination_subresource = destination.subresource(destination_mip)?;
        let validation = self.core.validation();
        let (src_w, src_h, src_d) = self.mip_extent(source_mip);
        validation.assure(region.fits_within(src_w, src_h, src_d), || {
            format!("Copy region {} exceeds source mip {} ({}x{}x{}).", region, source_mip, src_w, src_h, src_d)
        })?;
        let (dst_w, dst_h, dst_d) = destination.mip_extent(destination_mip);
        let target = SubresourceBox::new_3d(
            offset[0],
            offset[0].saturating_add(region.width()),
            offset[1],
            offset[1].saturating_add(region.height()),
            offset[2],
            offset[2].saturating_add(region.depth()),
        );
        validation.assure(target.fits_within(dst_w, dst_h, dst_d), || {
            format!("Copy target {} exceeds destination mip {} ({}x{}x{}).", target, destination_mip, dst_w, dst_h, dst_d)
        })?;
        validation.assure(
            self.core.handle() != destination_core.handle() || source_subresource != destination_subresource,
            || format!("Can not copy a subresource of {} onto itself.", self.kind),
        )?;

        let copy = SubresourceCopy {
            source: self.core.handle(),
            source_subresource,
            region: *region,
            destination: destination_core.handle(),
            destination_subresource,
            destination_offset: offset,
        };
        let context = self.core.context()?;
        self.core.backend().copy_subresource_region(context, &copy)
    }

    /// Regenerate mips 1..N from mip 0
    pub(crate) fn generate_mips(&self, description: String) -> Result<()> {
        self.core.validation().assure(self.mip_generation_target, || {
            format!("{} was not created as a mip generation target.", self.kind)
        })?;
        let view = self.create_view(0, self.num_mips, description)?;
        let context = self.core.context()?;
        let result = self.core.backend().generate_mips(context, view.handle());
        view.dispose()?;
        result
    }

    // ===== VIEWS =====

    pub(crate) fn create_view(&self, first_mip: u32, num_mips: u32, description: String) -> Result<ShaderResourceView> {
        self.core.require_binding(GpuBindings::READABLE_SHADER_RESOURCE, "shader resource view")?;
        let validation = self.core.validation();
        validation.assure(num_mips > 0, || "A view must cover at least one mip.".to_string())?;
        validation.assure_range(first_mip as u64, num_mips as u64, self.num_mips as u64, "View mips")?;
        let range = match self.slot {
            Some(slot) => ShaderResourceRange::TextureArray {
                first_mip,
                num_mips,
                first_array_index: slot.index,
                num_array_elements: 1,
            },
            None => ShaderResourceRange::Texture { first_mip, num_mips },
        };
        ShaderResourceView::create(&self.core, description, range)
    }

    pub(crate) fn create_unordered_access_view(&self, mip_index: u32, description: String) -> Result<UnorderedAccessView> {
        self.core.require_binding(GpuBindings::WRITABLE_SHADER_RESOURCE, "unordered access view")?;
        self.assure_mip(mip_index)?;
        let range = match self.slot {
            Some(slot) => UnorderedAccessRange::TextureArray {
                mip_index,
                first_array_index: slot.index,
                num_array_elements: 1,
            },
            None => UnorderedAccessRange::Texture { mip_index },
        };
        UnorderedAccessView::create(&self.core, description, range)
    }

    /// Unordered-access view over some depth slices of a 3D mip
    pub(crate) fn create_volume_unordered_access_view(
        &self,
        mip_index: u32,
        first_slice: u32,
        num_slices: u32,
        description: String,
    ) -> Result<UnorderedAccessView> {
        self.core.require_binding(GpuBindings::WRITABLE_SHADER_RESOURCE, "unordered access view")?;
        self.assure_mip(mip_index)?;
        let (_, _, mip_depth) = self.mip_extent(mip_index);
        let validation = self.core.validation();
        validation.assure(num_slices > 0, || "A view must cover at least one slice.".to_string())?;
        validation.assure_range(first_slice as u64, num_slices as u64, mip_depth as u64, "View slices")?;
        UnorderedAccessView::create(
            &self.core,
            description,
            UnorderedAccessRange::VolumeSlices { mip_index, first_slice, num_slices },
        )
    }

    pub(crate) fn create_render_target_view(&self, mip_index: u32, description: String) -> Result<RenderTargetView> {
        self.core.require_binding(GpuBindings::RENDER_TARGET, "render target view")?;
        self.assure_mip(mip_index)?;
        RenderTargetView::create(&self.core, description, mip_index, self.slot.map(|slot| slot.index))
    }

    pub(crate) fn create_depth_stencil_view(&self, mip_index: u32, description: String) -> Result<DepthStencilView> {
        self.core.require_binding(GpuBindings::DEPTH_STENCIL_TARGET, "depth stencil view")?;
        self.assure_mip(mip_index)?;
        DepthStencilView::create(&self.core, description, mip_index, self.slot.map(|slot| slot.index))
    }

    /// "Texture2D<Rgba8UNorm> [Usage: Immutable, Width: 4, Height: 4, Mips: 3]"
    pub(crate) fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [Usage: {}, Width: {}", self.kind, self.core.usage(), self.width)?;
        if self.dimension != TextureDimension::Tex1D {
            write!(f, ", Height: {}", self.height)?;
        }
        if self.dimension == TextureDimension::Tex3D {
            write!(f, ", Depth: {}", self.depth)?;
        }
        write!(f, ", Mips: {}", self.num_mips)?;
        if let Some(slot) = self.slot {
            write!(f, ", Element: {}/{}", slot.index, slot.length)?;
        }
        write!(f, "]")
    }
}

/// Properties and operations shared by 1D, 2D and 3D textures
///
/// Dimension-specific reads and writes (`read`, `write`) live on the concrete
/// texture types.
pub trait Texture: Resource {
    type TexelType: Texel;

    #[doc(hidden)]
    fn base(&self) -> &TextureBase<Self::TexelType>;

    fn width(&self) -> u32 {
        self.base().width
    }

    fn height(&self) -> u32 {
        self.base().height
    }

    fn depth(&self) -> u32 {
        self.base().depth
    }

    fn num_mips(&self) -> u32 {
        self.base().num_mips
    }

    fn texel_format(&self) -> TexelFormat {
        Self::TexelType::FORMAT
    }

    fn is_mipmapped(&self) -> bool {
        self.base().mip_allocation
    }

    fn is_mip_gen_target(&self) -> bool {
        self.base().mip_generation_target
    }

    /// Registered for dynamic detail adjustment
    fn is_global_detail_target(&self) -> bool {
        self.base().dynamic_detail
    }

    fn is_multisampled(&self) -> bool {
        self.base().multisampled
    }

    fn is_array_texture(&self) -> bool {
        self.base().slot.is_some()
    }

    /// Index within the owning array; 0 for standalone textures
    fn array_index(&self) -> u32 {
        self.base().slot.map_or(0, |slot| slot.index)
    }

    /// Subresource index of a mip of this texture
    fn subresource_index(&self, mip_index: u32) -> Result<u32> {
        self.base().subresource(mip_index)
    }

    fn mip_width(&self, mip_index: u32) -> Result<u32> {
        self.base().assure_mip(mip_index)?;
        Ok(self.base().mip_extent(mip_index).0)
    }

    fn mip_height(&self, mip_index: u32) -> Result<u32> {
        self.base().assure_mip(mip_index)?;
        Ok(self.base().mip_extent(mip_index).1)
    }

    fn mip_depth(&self, mip_index: u32) -> Result<u32> {
        self.base().assure_mip(mip_index)?;
        Ok(self.base().mip_extent(mip_index).2)
    }

    fn mip_size_texels(&self, mip_index: u32) -> Result<u64> {
        let base = self.base();
        base.assure_mip(mip_index)?;
        Ok(texture_utils::mip_texels(base.width, base.height, base.depth, mip_index))
    }

    fn mip_size_bytes(&self, mip_index: u32) -> Result<u64> {
        Ok(self.mip_size_texels(mip_index)? * size_of::<Self::TexelType>() as u64)
    }

    /// Overwrite a whole mip (write-discard)
    fn discard_write(&self, data: &[Self::TexelType], mip_index: u32) -> Result<()> {
        self.base().discard_write(data, mip_index)
    }

    /// Map a mip read/write and hand it to `action`
    fn read_write<F>(&self, action: F, mip_index: u32) -> Result<()>
    where
        F: FnOnce(&mut RawResourceDataView<'_, Self::TexelType>),
    {
        self.base().read_write(action, mip_index)
    }

    /// Every mip, largest first, each laid out slice by slice then row by row
    fn read_all(&self) -> Result<Vec<Self::TexelType>> {
        self.base().read_all()
    }

    /// Copy every mip into `destination`
    fn copy_to<D: Texture<TexelType = Self::TexelType>>(&self, destination: &D) -> Result<()> {
        self.base().copy_to(destination.base())
    }

    /// Copy `region` of `source_mip` into `destination_mip` of `destination` at `(u, v, w)` offset
    fn copy_to_region<D: Texture<TexelType = Self::TexelType>>(
        &self,
        destination: &D,
        region: &SubresourceBox,
        source_mip: u32,
        destination_mip: u32,
        destination_offset: [u32; 3],
    ) -> Result<()> {
        self.base().copy_to_region(destination.base(), region, source_mip, destination_mip, destination_offset)
    }

    /// Regenerate mips 1..N from mip 0 (mip generation targets only)
    fn generate_mips(&self) -> Result<()> {
        self.base().generate_mips(self.to_string())
    }

    /// Shader-resource view over `num_mips` mips from `first_mip`
    fn create_view(&self, first_mip: u32, num_mips: u32) -> Result<ShaderResourceView> {
        self.base().create_view(first_mip, num_mips, self.to_string())
    }

    fn create_default_view(&self) -> Result<ShaderResourceView> {
        self.create_view(0, self.num_mips())
    }
}
