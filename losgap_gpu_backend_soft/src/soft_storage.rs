/// CPU-side storage of buffers and textures
///
/// Every subresource is a tightly packed byte vector. Buffers have a single
/// subresource measured in bytes (texel size 1); texture subresources are
/// ordered mip-major within each array slice, matching
/// `texture_utils::subresource_index`.

use losgap_gpu::losgap::{Error, Result};
use losgap_gpu::losgap::backend::{BufferDesc, TextureDesc, TextureDimension, TextureInitialData};
use losgap_gpu::losgap::resource::{ResourceUsage, SubresourceBox, TexelFormat, texture_utils};
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Slot of a buffer or texture
    pub(crate) struct ResourceKey;
}

/// Every live resource of the backend
pub(crate) type ResourceSlots = SlotMap<ResourceKey, SoftResource>;

/// One mip of one array slice (or a whole buffer)
#[derive(Debug, Clone)]
pub(crate) struct SoftSubresource {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub texel_size: u32,
    pub data: Vec<u8>,
}

impl SoftSubresource {
    pub fn new(width: u32, height: u32, depth: u32, texel_size: u32) -> Self {
        let len = width as usize * height as usize * depth as usize * texel_size as usize;
        Self { width, height, depth, texel_size, data: vec![0; len] }
    }

    pub fn row_pitch(&self) -> u32 {
        self.width * self.texel_size
    }

    pub fn depth_pitch(&self) -> u32 {
        self.row_pitch() * self.height
    }

    fn check_region(&self, region: &SubresourceBox) -> Result<()> {
        if region.fits_within(self.width, self.height, self.depth) {
            return Ok(());
        }
        Err(Error::InvalidArgument(format!(
            "Region {} outside of {}x{}x{} subresource.",
            region, self.width, self.height, self.depth
        )))
    }

    /// Copy `source` (laid out with the given pitches) into `region`
    pub fn write_region(&mut self, region: &SubresourceBox, source: &[u8], row_pitch: u32, depth_pitch: u32) -> Result<()> {
        self.check_region(region)?;
        let texel_size = self.texel_size as usize;
        let row_bytes = region.width() as usize * texel_size;
        let (own_row_pitch, own_depth_pitch) = (self.row_pitch() as usize, self.depth_pitch() as usize);

        for z in 0..region.depth() as usize {
            for y in 0..region.height() as usize {
                let from = z * depth_pitch as usize + y * row_pitch as usize;
                let row = source.get(from..from + row_bytes).ok_or_else(|| Error::InvalidArgument(format!(
                    "Source data too small for region {} ({} bytes).", region, source.len()
                )))?;
                let to = (region.w_min as usize + z) * own_depth_pitch
                    + (region.v_min as usize + y) * own_row_pitch
                    + region.u_min as usize * texel_size;
                self.data[to..to + row_bytes].copy_from_slice(row);
            }
        }
        Ok(())
    }

    /// Tightly packed copy of `region`
    pub fn read_region(&self, region: &SubresourceBox) -> Result<Vec<u8>> {
        self.check_region(region)?;
        let texel_size = self.texel_size as usize;
        let row_bytes = region.width() as usize * texel_size;
        let mut out = Vec::with_capacity(row_bytes * region.height() as usize * region.depth() as usize);
        for z in region.w_min as usize..region.w_max as usize {
            for y in region.v_min as usize..region.v_max as usize {
                let from = z * self.depth_pitch() as usize + y * self.row_pitch() as usize + region.u_min as usize * texel_size;
                out.extend_from_slice(&self.data[from..from + row_bytes]);
            }
        }
        Ok(out)
    }
}

/// What a resource is, beyond its bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SoftResourceKind {
    Buffer,
    Texture {
        dimension: TextureDimension,
        format: TexelFormat,
        num_mips: u32,
        array_size: u32,
        mip_generation_target: bool,
    },
}

#[derive(Debug, Clone)]
pub(crate) struct SoftResource {
    pub usage: ResourceUsage,
    pub kind: SoftResourceKind,
    pub subresources: Vec<SoftSubresource>,
}

impl SoftResource {
    pub fn new_buffer(desc: &BufferDesc, initial_data: Option<&[u8]>) -> Result<Self> {
        let size = u32::try_from(desc.size_bytes).map_err(|_| Error::OutOfMemory)?;
        let mut subresource = SoftSubresource::new(size, 1, 1, 1);
        if let Some(bytes) = initial_data {
            if bytes.len() != subresource.data.len() {
                return Err(Error::InvalidArgument(format!(
                    "Initial data is {} bytes, buffer is {} bytes.", bytes.len(), size
                )));
            }
            subresource.data.copy_from_slice(bytes);
        }
        Ok(Self { usage: desc.usage, kind: SoftResourceKind::Buffer, subresources: vec![subresource] })
    }

    pub fn new_texture(desc: &TextureDesc, initial_data: Option<TextureInitialData<'_>>) -> Result<Self> {
        let num_mips = desc.num_mips.max(1);
        let texel_size = desc.format.size_bytes();
        let mut subresources = Vec::with_capacity((desc.array_size * num_mips) as usize);
        for _ in 0..desc.array_size {
            for mip in 0..num_mips {
                subresources.push(SoftSubresource::new(
                    texture_utils::mip_dimension(desc.width, mip),
                    texture_utils::mip_dimension(desc.height, mip),
                    texture_utils::mip_dimension(desc.depth, mip),
                    texel_size,
                ));
            }
        }

        if let Some(initial) = initial_data {
            if initial.subresources.len() != subresources.len() {
                return Err(Error::InvalidArgument(format!(
                    "Initial data describes {} subresources, texture has {}.",
                    initial.subresources.len(),
                    subresources.len()
                )));
            }
            for (subresource, data_desc) in subresources.iter_mut().zip(initial.subresources) {
                let source = initial.bytes.get(data_desc.offset..).unwrap_or_default();
                let whole = SubresourceBox::whole(subresource.width, subresource.height, subresource.depth);
                subresource.write_region(&whole, source, data_desc.row_stride, data_desc.slice_stride)?;
            }
        }

        Ok(Self {
            usage: desc.usage,
            kind: SoftResourceKind::Texture {
                dimension: desc.dimension,
                format: desc.format,
                num_mips,
                array_size: desc.array_size,
                mip_generation_target: desc.mip_generation_target,
            },
            subresources,
        })
    }

    pub fn subresource(&self, index: u32) -> Result<&SoftSubresource> {
        self.subresources.get(index as usize).ok_or_else(|| Error::InvalidArgument(format!(
            "Subresource {} out of range ({} subresources).", index, self.subresources.len()
        )))
    }

    pub fn subresource_mut(&mut self, index: u32) -> Result<&mut SoftSubresource> {
        let count = self.subresources.len();
        self.subresources.get_mut(index as usize).ok_or_else(|| Error::InvalidArgument(format!(
            "Subresource {} out of range ({} subresources).", index, count
        )))
    }

    /// Same subresource count and byte sizes
    pub fn layout_matches(&self, other: &SoftResource) -> bool {
        self.subresources.len() == other.subresources.len()
            && self.subresources
                .iter()
                .zip(&other.subresources)
                .all(|(a, b)| a.data.len() == b.data.len())
    }

    pub fn texel_size(&self) -> u32 {
        self.subresources.first().map_or(1, |subresource| subresource.texel_size)
    }
}

#[cfg(test)]
#[path = "soft_storage_tests.rs"]
mod tests;
