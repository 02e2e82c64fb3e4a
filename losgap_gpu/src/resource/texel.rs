//! Texel formats and texel types
//!
//! A [`Texel`] is a plain-old-data type tagged with the [`TexelFormat`] that
//! describes its channel layout to the backend. Element types without a texel
//! format can still be stored in buffers, where they make the buffer
//! "structured".

use std::any::TypeId;
use std::fmt;
use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3, Vec4};

/// Channel layout of a texel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum TexelFormat {
    R32G32B32A32_SFLOAT,
    R32G32B32A32_UINT,
    R32G32B32A32_SINT,
    R32G32B32_SFLOAT,
    R32G32_SFLOAT,
    R16G16B16A16_UNORM,
    R16G16_UNORM,
    R16G16_UINT,
    R8G8B8A8_UNORM,
    R8G8B8A8_SRGB,
    R8G8B8A8_UINT,
    R8G8B8A8_SNORM,
    B8G8R8A8_UNORM,
    B5G6R5_UNORM,
    R32_SFLOAT,
    R32_UINT,
    R32_SINT,
    R16_UINT,
    R16_SINT,
    R8_UINT,
    R8_SINT,
    D24_UNORM_S8_UINT,
}

/// Numeric interpretation of a format's channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    UNorm,
    UNormSrgb,
    SNorm,
    UInt,
    SInt,
    Float,
    /// Channels of unequal width packed into one word
    Packed,
}

impl TexelFormat {
    /// Size of one texel in bytes
    pub fn size_bytes(&self) -> u32 {
        self.channel_count() * self.bits_per_channel() / 8
    }

    pub fn channel_count(&self) -> u32 {
        use TexelFormat::*;
        match self {
            R32G32B32A32_SFLOAT | R32G32B32A32_UINT | R32G32B32A32_SINT
            | R16G16B16A16_UNORM
            | R8G8B8A8_UNORM | R8G8B8A8_SRGB | R8G8B8A8_UINT | R8G8B8A8_SNORM
            | B8G8R8A8_UNORM => 4,
            R32G32B32_SFLOAT => 3,
            R32G32_SFLOAT | R16G16_UNORM | R16G16_UINT => 2,
            // Packed formats report a single 16/32-bit channel
            B5G6R5_UNORM | D24_UNORM_S8_UINT => 1,
            R32_SFLOAT | R32_UINT | R32_SINT | R16_UINT | R16_SINT | R8_UINT | R8_SINT => 1,
        }
    }

    /// Bits per channel (the whole word for packed formats)
    pub fn bits_per_channel(&self) -> u32 {
        use TexelFormat::*;
        match self {
            R32G32B32A32_SFLOAT | R32G32B32A32_UINT | R32G32B32A32_SINT
            | R32G32B32_SFLOAT | R32G32_SFLOAT
            | R32_SFLOAT | R32_UINT | R32_SINT | D24_UNORM_S8_UINT => 32,
            R16G16B16A16_UNORM | R16G16_UNORM | R16G16_UINT | R16_UINT | R16_SINT
            | B5G6R5_UNORM => 16,
            R8G8B8A8_UNORM | R8G8B8A8_SRGB | R8G8B8A8_UINT | R8G8B8A8_SNORM
            | B8G8R8A8_UNORM | R8_UINT | R8_SINT => 8,
        }
    }

    pub fn channel_kind(&self) -> ChannelKind {
        use TexelFormat::*;
        match self {
            R32G32B32A32_SFLOAT | R32G32B32_SFLOAT | R32G32_SFLOAT | R32_SFLOAT => ChannelKind::Float,
            R32G32B32A32_UINT | R16G16_UINT | R8G8B8A8_UINT | R32_UINT | R16_UINT | R8_UINT => ChannelKind::UInt,
            R32G32B32A32_SINT | R32_SINT | R16_SINT | R8_SINT => ChannelKind::SInt,
            R16G16B16A16_UNORM | R16G16_UNORM | R8G8B8A8_UNORM | B8G8R8A8_UNORM => ChannelKind::UNorm,
            R8G8B8A8_SRGB => ChannelKind::UNormSrgb,
            R8G8B8A8_SNORM => ChannelKind::SNorm,
            B5G6R5_UNORM | D24_UNORM_S8_UINT => ChannelKind::Packed,
        }
    }

    pub fn is_depth_stencil(&self) -> bool {
        *self == TexelFormat::D24_UNORM_S8_UINT
    }
}

impl fmt::Display for TexelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A texel type: plain old data with a fixed [`TexelFormat`]
pub trait Texel: Pod + PartialEq + fmt::Debug + Send + Sync + 'static {
    const FORMAT: TexelFormat;
}

macro_rules! impl_texel {
    ($($ty:ty => $format:ident),* $(,)?) => {
        $(impl Texel for $ty {
            const FORMAT: TexelFormat = TexelFormat::$format;
        })*
    };
}

// ============================================================================
// TEXEL TYPES
// ============================================================================

/// Four normalized 8-bit channels, RGBA order
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
pub struct Rgba8UNorm {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8UNorm {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Four normalized 8-bit channels in sRGB space
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
pub struct Rgba8UNormSrgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Four normalized 8-bit channels, BGRA order (typical swap chain layout)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
pub struct Bgra8UNorm {
    pub b: u8,
    pub g: u8,
    pub r: u8,
    pub a: u8,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
pub struct Rgba8UInt {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
pub struct Rgba8SNorm {
    pub r: i8,
    pub g: i8,
    pub b: i8,
    pub a: i8,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
pub struct Rgba16UNorm {
    pub r: u16,
    pub g: u16,
    pub b: u16,
    pub a: u16,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
pub struct Rg16UNorm {
    pub r: u16,
    pub g: u16,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
pub struct Rg16UInt {
    pub r: u16,
    pub g: u16,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
pub struct Rgba32UInt {
    pub r: u32,
    pub g: u32,
    pub b: u32,
    pub a: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
pub struct Rgba32Int {
    pub r: i32,
    pub g: i32,
    pub b: i32,
    pub a: i32,
}

/// 5-6-5 packed color
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
pub struct B5G6R5(pub u16);

/// 24-bit normalized depth with an 8-bit stencil in the top byte
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
pub struct DepthStencil(pub u32);

impl DepthStencil {
    const DEPTH_MASK: u32 = 0x00FF_FFFF;

    pub fn new(depth: f32, stencil: u8) -> Self {
        let depth_bits = (depth.clamp(0.0, 1.0) * Self::DEPTH_MASK as f32).round() as u32;
        Self(depth_bits | (stencil as u32) << 24)
    }

    pub fn depth(&self) -> f32 {
        (self.0 & Self::DEPTH_MASK) as f32 / Self::DEPTH_MASK as f32
    }

    pub fn stencil(&self) -> u8 {
        (self.0 >> 24) as u8
    }
}

/// Default format for render target textures
pub type RenderTargetTexel = Rgba8UNorm;

impl_texel! {
    Vec4 => R32G32B32A32_SFLOAT,
    Rgba32UInt => R32G32B32A32_UINT,
    Rgba32Int => R32G32B32A32_SINT,
    Vec3 => R32G32B32_SFLOAT,
    Vec2 => R32G32_SFLOAT,
    Rgba16UNorm => R16G16B16A16_UNORM,
    Rg16UNorm => R16G16_UNORM,
    Rg16UInt => R16G16_UINT,
    Rgba8UNorm => R8G8B8A8_UNORM,
    Rgba8UNormSrgb => R8G8B8A8_SRGB,
    Rgba8UInt => R8G8B8A8_UINT,
    Rgba8SNorm => R8G8B8A8_SNORM,
    Bgra8UNorm => B8G8R8A8_UNORM,
    B5G6R5 => B5G6R5_UNORM,
    f32 => R32_SFLOAT,
    u32 => R32_UINT,
    i32 => R32_SINT,
    u16 => R16_UINT,
    i16 => R16_SINT,
    u8 => R8_UINT,
    i8 => R8_SINT,
    DepthStencil => D24_UNORM_S8_UINT,
}

/// Native format of an arbitrary element type, if it has one
///
/// Types without a native format are stored as structured buffer elements.
pub fn native_format_of<T: 'static>() -> Option<TexelFormat> {
    fn entry<U: Texel>() -> (TypeId, TexelFormat) {
        (TypeId::of::<U>(), U::FORMAT)
    }

    let id = TypeId::of::<T>();
    [
        entry::<Vec4>(), entry::<Rgba32UInt>(), entry::<Rgba32Int>(), entry::<Vec3>(),
        entry::<Vec2>(), entry::<Rgba16UNorm>(), entry::<Rg16UNorm>(), entry::<Rg16UInt>(),
        entry::<Rgba8UNorm>(), entry::<Rgba8UNormSrgb>(), entry::<Rgba8UInt>(),
        entry::<Rgba8SNorm>(), entry::<Bgra8UNorm>(), entry::<B5G6R5>(), entry::<f32>(),
        entry::<u32>(), entry::<i32>(), entry::<u16>(), entry::<i16>(), entry::<u8>(),
        entry::<i8>(), entry::<DepthStencil>(),
    ]
    .into_iter()
    .find(|(type_id, _)| *type_id == id)
    .map(|(_, format)| format)
}

#[cfg(test)]
#[path = "texel_tests.rs"]
mod tests;
