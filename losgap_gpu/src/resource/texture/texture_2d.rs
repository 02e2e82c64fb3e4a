/// Two-dimensional textures and arrays of them

use std::fmt;
use std::ops::Range;
use std::sync::Arc;
use crate::backend::TextureDimension;
use crate::device::RenderingModule;
use crate::error::{Error, Result};
use crate::resource::{
    Resource, ResourceCore, ResourceSupport, ResourceUsage, GpuBindings, SubresourceBox, Texel, TexelArray2D,
};
use crate::resource::memo::Memo;
use crate::resource::resource::{check_support, short_type_name};
use crate::resource::texture::{Texture, TextureBase, TextureArray, ArrayElement};
use crate::resource::texture::texture_params::{TextureCopySource, TextureParams, create_texture_core, texture_builder_setters};
use crate::view::{UnorderedAccessView, RenderTargetView, DepthStencilView};

/// 2D texture of `T` texels
pub struct Texture2D<T: Texel> {
    base: TextureBase<T>,
}

/// Array of 2D textures
pub type Texture2DArray<T> = TextureArray<Texture2D<T>>;

impl<T: Texel> ResourceSupport for Texture2D<T> {
    const SUPPORTED_USAGES: &'static [ResourceUsage] = &ResourceUsage::ALL;
    const SUPPORTED_BINDINGS: GpuBindings = GpuBindings::READABLE_SHADER_RESOURCE
        .union(GpuBindings::WRITABLE_SHADER_RESOURCE)
        .union(GpuBindings::RENDER_TARGET)
        .union(GpuBindings::DEPTH_STENCIL_TARGET);
}

impl<T: Texel> Texture2D<T> {
    /// Texels of one mip, indexable by `(u, v)`
    pub fn read(&self, mip_index: u32) -> Result<TexelArray2D<T>> {
        let texels = self.base.read_mip(mip_index)?;
        let (width, height, _) = self.base.mip_extent(mip_index);
        Ok(TexelArray2D::new(texels, width, height))
    }

    /// Write `data` (row by row) into the `u` x `v` rectangle of a mip
    pub fn write(&self, data: &[T], mip_index: u32, u: Range<u32>, v: Range<u32>) -> Result<()> {
        self.base.write_region(data, mip_index, &SubresourceBox::new_2d(u.start, u.end, v.start, v.end))
    }

    pub fn write_region(&self, data: &[T], mip_index: u32, region: &SubresourceBox) -> Result<()> {
        self.base.write_region(data, mip_index, region)
    }

    pub fn create_unordered_access_view(&self, mip_index: u32) -> Result<UnorderedAccessView> {
        self.base.create_unordered_access_view(mip_index, self.to_string())
    }

    /// Render-target view over one mip (of this array slice, for array elements)
    pub fn create_render_target_view(&self, mip_index: u32) -> Result<RenderTargetView> {
        self.base.create_render_target_view(mip_index, self.to_string())
    }

    /// Depth-stencil view over one mip (of this array slice, for array elements)
    pub fn create_depth_stencil_view(&self, mip_index: u32) -> Result<DepthStencilView> {
        self.base.create_depth_stencil_view(mip_index, self.to_string())
    }

    pub fn clone_builder(&self, copy_data: bool) -> Texture2DBuilder<T> {
        Self::builder_from(self, copy_data.then(|| self.base.copy_source()))
    }
}

impl<T: Texel> Resource for Texture2D<T> {
    fn core(&self) -> &Arc<ResourceCore> {
        self.base.core()
    }

    fn size_bytes(&self) -> u64 {
        self.base.size_bytes()
    }

    fn dispose(&self) -> Result<()> {
        self.base.dispose()
    }
}

impl<T: Texel> Texture for Texture2D<T> {
    type TexelType = T;

    fn base(&self) -> &TextureBase<T> {
        &self.base
    }
}

impl<T: Texel> ArrayElement for Texture2D<T> {
    type Builder = Texture2DBuilder<T>;

    fn from_base(base: TextureBase<T>) -> Self {
        Self { base }
    }

    fn builder_from(element: &Self, copy_source: Option<TextureCopySource>) -> Texture2DBuilder<T> {
        let core = element.base.core();
        Texture2DBuilder {
            module: Arc::clone(core.module()),
            params: TextureParams::cloned_from(core.usage(), core.permitted_bindings(), element.base.shape(), copy_source),
            memo: Memo::new(),
        }
    }
}

impl<T: Texel> fmt::Display for Texture2D<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.base.describe(f)
    }
}

// ===== BUILDER =====

/// Builder for [`Texture2D<T>`] and [`Texture2DArray<T>`]
#[derive(Clone)]
pub struct Texture2DBuilder<T: Texel> {
    module: Arc<RenderingModule>,
    params: TextureParams<T>,
    memo: Memo<Texture2D<T>>,
}

impl<T: Texel> Texture2DBuilder<T> {
    texture_builder_setters!();

    pub fn height(&self) -> u32 {
        self.params.height
    }

    pub fn multisampled(&self) -> bool {
        self.params.multisampled
    }

    pub fn with_height(&self, height: u32) -> Self {
        self.with_params(TextureParams { height, ..self.params.clone() })
    }

    /// Multisampled textures have a single mip and no initial data
    pub fn with_multisampling(&self, multisampled: bool) -> Self {
        self.with_params(TextureParams { multisampled, ..self.params.clone() })
    }

    pub fn with_texel_format<U: Texel>(&self) -> Texture2DBuilder<U> {
        Texture2DBuilder {
            module: Arc::clone(&self.module),
            params: self.params.with_texel_format::<U>(),
            memo: Memo::new(),
        }
    }

    fn check(&self, kind: &str, array_length: u32) -> Result<()> {
        check_support::<Texture2D<T>>(kind, self.params.usage, self.params.bindings)?;
        self.params.assure_valid(self.module.validation(), kind, array_length)
    }

    pub fn create(&self) -> Result<Texture2D<T>> {
        let kind = format!("Texture2D<{}>", short_type_name::<T>());
        self.check(&kind, 1)?;
        let core = create_texture_core(&self.module, TextureDimension::Tex2D, &self.params, 1, kind.clone())?;
        Ok(Texture2D {
            base: TextureBase::new(core, kind, TextureDimension::Tex2D, self.params.shape(), None),
        })
    }

    pub fn create_array(&self, length: u32) -> Result<Texture2DArray<T>> {
        let element_kind = format!("Texture2D<{}>", short_type_name::<T>());
        let kind = format!("Texture2DArray<{}>", short_type_name::<T>());
        self.check(&kind, length)?;
        self.module.validation().assure(self.params.usage != ResourceUsage::DiscardWrite, || {
            format!("{}: can not create an array of discard-write textures.", kind)
        })?;
        let core = create_texture_core(&self.module, TextureDimension::Tex2D, &self.params, length, kind)?;
        Ok(TextureArray::from_core(core, &element_kind, TextureDimension::Tex2D, self.params.shape(), length))
    }

    pub fn get_or_create(&self) -> Result<Arc<Texture2D<T>>> {
        self.memo.get_or_try_init(|| self.create())
    }
}

impl<T: Texel> TryFrom<&Texture2DBuilder<T>> for Arc<Texture2D<T>> {
    type Error = Error;

    fn try_from(builder: &Texture2DBuilder<T>) -> Result<Self> {
        builder.get_or_create()
    }
}

impl RenderingModule {
    /// Builder for a 2D texture (Immutable, readable shader resource, 0x0)
    pub fn new_texture_2d<T: Texel>(self: &Arc<Self>) -> Texture2DBuilder<T> {
        Texture2DBuilder {
            module: Arc::clone(self),
            params: TextureParams::new(TextureDimension::Tex2D),
            memo: Memo::new(),
        }
    }
}
