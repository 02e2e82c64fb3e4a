//! Graphics backend boundary
//!
//! Everything that crosses into the native driver goes through the
//! [`GraphicsBackend`] trait using opaque handles and validated descriptors.

mod handles;
mod desc;
mod graphics_backend;

#[cfg(test)]
pub(crate) mod mock_backend;

pub use handles::{
    DeviceHandle, DeviceContextHandle, ResourceHandle, ResourceViewHandle, CommandListHandle,
};
pub use desc::{
    BufferDesc, BufferKind, TextureDesc, TextureDimension, TextureInitialData,
    ViewDesc, ShaderResourceRange, UnorderedAccessRange, MapMode, MappedSubresource,
    SubresourceCopy,
};
pub use graphics_backend::{GraphicsBackend, CreatedDevice};
