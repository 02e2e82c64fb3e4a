//! GPU resources: buffers, textures and the vocabulary they share
//!
//! Resources are created exclusively through builders obtained from the
//! [`RenderingModule`](crate::device::RenderingModule) (`new_buffer`,
//! `new_texture_2d`, ...). Which CPU operations a resource allows depends only
//! on its [`ResourceUsage`]; its [`GpuBindings`] decide which views it accepts.

mod usage;
mod bindings;
mod subresource_box;
pub mod texture_utils;
mod initial_data;
mod texel;
mod texel_array;
mod raw_view;
mod resource;
mod memo;
mod buffer;
mod texture;

pub use usage::ResourceUsage;
pub use bindings::GpuBindings;
pub use subresource_box::SubresourceBox;
pub use initial_data::InitialResourceDataDesc;
pub use texel::{
    Texel, TexelFormat, ChannelKind, native_format_of, RenderTargetTexel,
    Rgba8UNorm, Rgba8UNormSrgb, Bgra8UNorm, Rgba8UInt, Rgba8SNorm, Rgba16UNorm,
    Rg16UNorm, Rg16UInt, Rgba32UInt, Rgba32Int, B5G6R5, DepthStencil,
};
pub use texel_array::{TexelArray1D, TexelArray2D, TexelArray3D};
pub use raw_view::RawResourceDataView;
pub use resource::{Resource, ResourceCore, ResourceSupport};
pub use buffer::{
    BufferElement, BufferResource, Buffer, BufferBuilder, ConstantBuffer, ConstantBufferBuilder,
    VertexBuffer, VertexBufferBuilder, IndexBuffer, IndexBufferBuilder,
};
pub use texture::{
    Texture, TextureBase, TextureArray, ArrayElement,
    Texture1D, Texture1DArray, Texture1DBuilder,
    Texture2D, Texture2DArray, Texture2DBuilder,
    Texture3D, Texture3DBuilder,
};
