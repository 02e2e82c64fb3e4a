/// Volume textures

use std::fmt;
use std::sync::Arc;
use crate::backend::TextureDimension;
use crate::device::RenderingModule;
use crate::error::{Error, Result};
use crate::resource::{
    Resource, ResourceCore, ResourceSupport, ResourceUsage, GpuBindings, SubresourceBox, Texel, TexelArray3D,
};
use crate::resource::memo::Memo;
use crate::resource::resource::{check_support, short_type_name};
use crate::resource::texture::{Texture, TextureBase};
use crate::resource::texture::texture_params::{TextureParams, create_texture_core, texture_builder_setters};
use crate::view::UnorderedAccessView;

/// 3D texture of `T` texels
pub struct Texture3D<T: Texel> {
    base: TextureBase<T>,
}

impl<T: Texel> ResourceSupport for Texture3D<T> {
    const SUPPORTED_USAGES: &'static [ResourceUsage] = &ResourceUsage::ALL;
    const SUPPORTED_BINDINGS: GpuBindings = GpuBindings::READABLE_SHADER_RESOURCE
        .union(GpuBindings::WRITABLE_SHADER_RESOURCE)
        .union(GpuBindings::RENDER_TARGET);
}

impl<T: Texel> Texture3D<T> {
    /// Texels of one mip, indexable by `(u, v, w)`
    pub fn read(&self, mip_index: u32) -> Result<TexelArray3D<T>> {
        let texels = self.base.read_mip(mip_index)?;
        let (width, height, _) = self.base.mip_extent(mip_index);
        Ok(TexelArray3D::new(texels, width, height))
    }

    /// Write `data` (slice by slice, row by row) into `region` of a mip
    pub fn write(&self, data: &[T], mip_index: u32, region: &SubresourceBox) -> Result<()> {
        self.base.write_region(data, mip_index, region)
    }

    /// Unordered-access view over every depth slice of a mip
    pub fn create_unordered_access_view(&self, mip_index: u32) -> Result<UnorderedAccessView> {
        self.base.create_unordered_access_view(mip_index, self.to_string())
    }

    /// Unordered-access view over `num_slices` depth slices of a mip
    pub fn create_unordered_access_view_slices(
        &self,
        mip_index: u32,
        first_slice: u32,
        num_slices: u32,
    ) -> Result<UnorderedAccessView> {
        self.base.create_volume_unordered_access_view(mip_index, first_slice, num_slices, self.to_string())
    }

    pub fn clone_builder(&self, copy_data: bool) -> Texture3DBuilder<T> {
        let core = self.base.core();
        Texture3DBuilder {
            module: Arc::clone(core.module()),
            params: TextureParams::cloned_from(
                core.usage(),
                core.permitted_bindings(),
                self.base.shape(),
                copy_data.then(|| self.base.copy_source()),
            ),
            memo: Memo::new(),
        }
    }
}

impl<T: Texel> Resource for Texture3D<T> {
    fn core(&self) -> &Arc<ResourceCore> {
        self.base.core()
    }
}

impl<T: Texel> Texture for Texture3D<T> {
    type TexelType = T;

    fn base(&self) -> &TextureBase<T> {
        &self.base
    }
}

impl<T: Texel> fmt::Display for Texture3D<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.base.describe(f)
    }
}

// ===== BUILDER =====

/// Builder for [`Texture3D<T>`]
#[derive(Clone)]
pub struct Texture3DBuilder<T: Texel> {
    module: Arc<RenderingModule>,
    params: TextureParams<T>,
    memo: Memo<Texture3D<T>>,
}

impl<T: Texel> Texture3DBuilder<T> {
    texture_builder_setters!();

    pub fn height(&self) -> u32 {
        self.params.height
    }

    pub fn depth(&self) -> u32 {
        self.params.depth
    }

    pub fn with_height(&self, height: u32) -> Self {
        self.with_params(TextureParams { height, ..self.params.clone() })
    }

    pub fn with_depth(&self, depth: u32) -> Self {
        self.with_params(TextureParams { depth, ..self.params.clone() })
    }

    pub fn with_texel_format<U: Texel>(&self) -> Texture3DBuilder<U> {
        Texture3DBuilder {
            module: Arc::clone(&self.module),
            params: self.params.with_texel_format::<U>(),
            memo: Memo::new(),
        }
    }

    pub fn create(&self) -> Result<Texture3D<T>> {
        let kind = format!("Texture3D<{}>", short_type_name::<T>());
        check_support::<Texture3D<T>>(&kind, self.params.usage, self.params.bindings)?;
        self.params.assure_valid(self.module.validation(), &kind, 1)?;
        let core = create_texture_core(&self.module, TextureDimension::Tex3D, &self.params, 1, kind.clone())?;
        Ok(Texture3D {
            base: TextureBase::new(core, kind, TextureDimension::Tex3D, self.params.shape(), None),
        })
    }

    pub fn get_or_create(&self) -> Result<Arc<Texture3D<T>>> {
        self.memo.get_or_try_init(|| self.create())
    }
}

impl<T: Texel> TryFrom<&Texture3DBuilder<T>> for Arc<Texture3D<T>> {
    type Error = Error;

    fn try_from(builder: &Texture3DBuilder<T>) -> Result<Self> {
        builder.get_or_create()
    }
}

impl RenderingModule {
    /// Builder for a 3D texture (Immutable, readable shader resource, 0x0x0)
    pub fn new_texture_3d<T: Texel>(self: &Arc<Self>) -> Texture3DBuilder<T> {
        Texture3DBuilder {
            module: Arc::clone(self),
            params: TextureParams::new(TextureDimension::Tex3D),
            memo: Memo::new(),
        }
    }
}
