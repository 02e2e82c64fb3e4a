/// One-dimensional textures and arrays of them

use std::fmt;
use std::ops::Range;
use std::sync::Arc;
use crate::backend::TextureDimension;
use crate::device::RenderingModule;
use crate::error::{Error, Result};
use crate::resource::{
    Resource, ResourceCore, ResourceSupport, ResourceUsage, GpuBindings, SubresourceBox, Texel, TexelArray1D,
};
use crate::resource::memo::Memo;
use crate::resource::resource::{check_support, short_type_name};
use crate::resource::texture::{Texture, TextureBase, TextureArray, ArrayElement};
use crate::resource::texture::texture_params::{TextureCopySource, TextureParams, create_texture_core, texture_builder_setters};
use crate::view::UnorderedAccessView;

/// 1D texture of `T` texels
pub struct Texture1D<T: Texel> {
    base: TextureBase<T>,
}

/// Array of 1D textures
pub type Texture1DArray<T> = TextureArray<Texture1D<T>>;

impl<T: Texel> ResourceSupport for Texture1D<T> {
    const SUPPORTED_USAGES: &'static [ResourceUsage] = &ResourceUsage::ALL;
    const SUPPORTED_BINDINGS: GpuBindings = GpuBindings::READABLE_SHADER_RESOURCE
        .union(GpuBindings::WRITABLE_SHADER_RESOURCE)
        .union(GpuBindings::RENDER_TARGET);
}

impl<T: Texel> Texture1D<T> {
    /// Texels of one mip
    pub fn read(&self, mip_index: u32) -> Result<TexelArray1D<T>> {
        Ok(TexelArray1D::new(self.base.read_mip(mip_index)?))
    }

    /// Write `data` at texels `range` of a mip
    pub fn write(&self, data: &[T], mip_index: u32, range: Range<u32>) -> Result<()> {
        self.base.write_region(data, mip_index, &SubresourceBox::new(range.start, range.end))
    }

    pub fn write_region(&self, data: &[T], mip_index: u32, region: &SubresourceBox) -> Result<()> {
        self.base.write_region(data, mip_index, region)
    }

    pub fn create_unordered_access_view(&self, mip_index: u32) -> Result<UnorderedAccessView> {
        self.base.create_unordered_access_view(mip_index, self.to_string())
    }

    /// Builder seeded with this texture's usage, bindings, shape and flags
    pub fn clone_builder(&self, copy_data: bool) -> Texture1DBuilder<T> {
        Self::builder_from(self, copy_data.then(|| self.base.copy_source()))
    }
}

impl<T: Texel> Resource for Texture1D<T> {
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

impl<T: Texel> Texture for Texture1D<T> {
    type TexelType = T;

    fn base(&self) -> &TextureBase<T> {
        &self.base
    }
}

impl<T: Texel> ArrayElement for Texture1D<T> {
    type Builder = Texture1DBuilder<T>;

    fn from_base(base: TextureBase<T>) -> Self {
        Self { base }
    }

    fn builder_from(element: &Self, copy_source: Option<TextureCopySource>) -> Texture1DBuilder<T> {
        let core = element.base.core();
        Texture1DBuilder {
            module: Arc::clone(core.module()),
            params: TextureParams::cloned_from(core.usage(), core.permitted_bindings(), element.base.shape(), copy_source),
            memo: Memo::new(),
        }
    }
}

impl<T: Texel> fmt::Display for Texture1D<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.base.describe(f)
    }
}

// ===== BUILDER =====

/// Builder for [`Texture1D<T>`] and [`Texture1DArray<T>`]
#[derive(Clone)]
pub struct Texture1DBuilder<T: Texel> {
    module: Arc<RenderingModule>,
    params: TextureParams<T>,
    memo: Memo<Texture1D<T>>,
}

impl<T: Texel> Texture1DBuilder<T> {
    texture_builder_setters!();

    /// Same shape and flags with another texel type; initial data is dropped
    pub fn with_texel_format<U: Texel>(&self) -> Texture1DBuilder<U> {
        Texture1DBuilder {
            module: Arc::clone(&self.module),
            params: self.params.with_texel_format::<U>(),
            memo: Memo::new(),
        }
    }

    fn check(&self, kind: &str, array_length: u32) -> Result<()> {
        check_support::<Texture1D<T>>(kind, self.params.usage, self.params.bindings)?;
        self.params.assure_valid(self.module.validation(), kind, array_length)
    }

    pub fn create(&self) -> Result<Texture1D<T>> {
        let kind = format!("Texture1D<{}>", short_type_name::<T>());
        self.check(&kind, 1)?;
        let core = create_texture_core(&self.module, TextureDimension::Tex1D, &self.params, 1, kind.clone())?;
        Ok(Texture1D {
            base: TextureBase::new(core, kind, TextureDimension::Tex1D, self.params.shape(), None),
        })
    }

    /// Array of `length` textures sharing this builder's parameters
    pub fn create_array(&self, length: u32) -> Result<Texture1DArray<T>> {
        let element_kind = format!("Texture1D<{}>", short_type_name::<T>());
        let kind = format!("Texture1DArray<{}>", short_type_name::<T>());
        self.check(&kind, length)?;
        self.module.validation().assure(self.params.usage != ResourceUsage::DiscardWrite, || {
            format!("{}: can not create an array of discard-write textures.", kind)
        })?;
        let core = create_texture_core(&self.module, TextureDimension::Tex1D, &self.params, length, kind)?;
        Ok(TextureArray::from_core(core, &element_kind, TextureDimension::Tex1D, self.params.shape(), length))
    }

    pub fn get_or_create(&self) -> Result<Arc<Texture1D<T>>> {
        self.memo.get_or_try_init(|| self.create())
    }
}

impl<T: Texel> TryFrom<&Texture1DBuilder<T>> for Arc<Texture1D<T>> {
    type Error = Error;

    fn try_from(builder: &Texture1DBuilder<T>) -> Result<Self> {
        builder.get_or_create()
    }
}

impl RenderingModule {
    /// Builder for a 1D texture (Immutable, readable shader resource, width 0)
    pub fn new_texture_1d<T: Texel>(self: &Arc<Self>) -> Texture1DBuilder<T> {
        Texture1DBuilder {
            module: Arc::clone(self),
            params: TextureParams::new(TextureDimension::Tex1D),
            memo: Memo::new(),
        }
    }
}
