/// Descriptors passed across the backend boundary
///
/// Descriptors reach the backend only after the resource layer has validated
/// them, so backends may trust their contents.

use crate::backend::ResourceHandle;
use crate::resource::{ResourceUsage, GpuBindings, TexelFormat, SubresourceBox, InitialResourceDataDesc};

// ===== BUFFERS =====

/// Pipeline role of a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    /// General purpose buffer (shader resources, UAVs)
    Generic,
    Constant,
    Vertex,
    Index,
}

/// Descriptor for creating a buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferDesc {
    pub kind: BufferKind,
    /// Total size in bytes
    pub size_bytes: u64,
    /// Size of one element in bytes
    pub element_size: u32,
    pub usage: ResourceUsage,
    pub bindings: GpuBindings,
    /// Elements have no native format
    pub structured: bool,
    /// Buffer may be viewed as raw bytes
    pub allow_raw_access: bool,
    /// Native element format, when there is one
    pub format: Option<TexelFormat>,
}

// ===== TEXTURES =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureDimension {
    Tex1D,
    Tex2D,
    Tex3D,
}

/// Descriptor for creating a texture or texture array
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureDesc {
    pub dimension: TextureDimension,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    /// Number of array slices (1 for a single texture)
    pub array_size: u32,
    pub num_mips: u32,
    pub format: TexelFormat,
    pub usage: ResourceUsage,
    pub bindings: GpuBindings,
    pub multisampled: bool,
    pub mip_generation_target: bool,
}

/// Initial contents of a texture: a flat upload buffer plus one descriptor per subresource
#[derive(Debug, Clone, Copy)]
pub struct TextureInitialData<'a> {
    pub bytes: &'a [u8],
    pub subresources: &'a [InitialResourceDataDesc],
}

// ===== VIEWS =====

/// Range covered by a shader-resource view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderResourceRange {
    Buffer { first_element: u32, num_elements: u32 },
    Texture { first_mip: u32, num_mips: u32 },
    TextureArray { first_mip: u32, num_mips: u32, first_array_index: u32, num_array_elements: u32 },
}

/// Range covered by an unordered-access view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnorderedAccessRange {
    Buffer {
        first_element: u32,
        num_elements: u32,
        append_consume: bool,
        include_counter: bool,
        raw: bool,
    },
    Texture { mip_index: u32 },
    TextureArray { mip_index: u32, first_array_index: u32, num_array_elements: u32 },
    /// Depth slices of one mip of a 3D texture
    VolumeSlices { mip_index: u32, first_slice: u32, num_slices: u32 },
}

/// Descriptor for creating a view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewDesc {
    ShaderResource(ShaderResourceRange),
    UnorderedAccess(UnorderedAccessRange),
    RenderTarget { mip_index: u32, array_index: Option<u32> },
    DepthStencil { mip_index: u32, array_index: Option<u32> },
}

// ===== DATA TRANSFER =====

/// CPU mapping mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapMode {
    Read,
    Write,
    ReadWrite,
    /// Previous contents may be discarded by the driver
    WriteDiscard,
}

/// Memory of a mapped subresource, valid for the duration of the mapping callback
#[derive(Debug)]
pub struct MappedSubresource<'a> {
    pub data: &'a mut [u8],
    /// Bytes between two consecutive rows
    pub row_pitch: u32,
    /// Bytes between two consecutive depth slices
    pub depth_pitch: u32,
}

/// Parameters of a region copy between two subresources
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubresourceCopy {
    pub source: ResourceHandle,
    pub source_subresource: u32,
    /// Region of the source to copy (bytes on `u` for buffers)
    pub region: SubresourceBox,
    pub destination: ResourceHandle,
    pub destination_subresource: u32,
    /// Destination position of the region's minimum corner
    pub destination_offset: [u32; 3],
}
