/// Texture arrays: one native resource, one texture object per slice

use std::fmt;
use std::ops::Index;
use std::sync::Arc;
use crate::backend::{ShaderResourceRange, TextureDimension, UnorderedAccessRange};
use crate::error::Result;
use crate::resource::{Resource, ResourceCore, GpuBindings};
use crate::resource::texture::{Texture, TextureBase};
use crate::resource::texture::texture_base::ArraySlot;
use crate::resource::texture::texture_params::{TextureCopySource, TextureShape};
use crate::view::{ShaderResourceView, UnorderedAccessView};

const LOG_SOURCE: &str = "losgap::TextureArray";

/// Texture type that can be an element of a [`TextureArray`]
pub trait ArrayElement: Texture + Sized {
    /// Builder returned by [`TextureArray::clone_builder`]
    type Builder;

    #[doc(hidden)]
    fn from_base(base: TextureBase<Self::TexelType>) -> Self;

    #[doc(hidden)]
    fn builder_from(element: &Self, copy_source: Option<TextureCopySource>) -> Self::Builder;
}

/// Array of same-shaped textures sharing one native resource
///
/// Elements can not be disposed individually; disposing the array disposes
/// every element.
pub struct TextureArray<E: ArrayElement> {
    core: Arc<ResourceCore>,
    elements: Vec<E>,
    num_mips: u32,
}

impl<E: ArrayElement> TextureArray<E> {
    pub(crate) fn from_core(
        core: Arc<ResourceCore>,
        element_kind: &str,
        dimension: TextureDimension,
        shape: TextureShape,
        length: u32,
    ) -> Self {
        let elements: Vec<E> = (0..length)
            .map(|index| {
                E::from_base(TextureBase::new(
                    Arc::clone(&core),
                    element_kind.to_string(),
                    dimension,
                    shape,
                    Some(ArraySlot { index, length }),
                ))
            })
            .collect();
        let num_mips = elements.first().map_or(1, |element| element.num_mips());
        Self { core, elements, num_mips }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&E> {
        self.elements.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.elements.iter()
    }

    /// Mips per element
    pub fn num_mips(&self) -> u32 {
        self.num_mips
    }

    /// Builder for a single texture shaped like the elements
    ///
    /// With `copy_data`, the copy source is the whole array, so only arrays of
    /// the same length can be created from it.
    pub fn clone_builder(&self, copy_data: bool) -> Option<E::Builder> {
        let copy_source = copy_data.then(|| TextureCopySource { core: Arc::clone(&self.core), slot: None, num_mips: self.num_mips });
        self.elements.first().map(|first| E::builder_from(first, copy_source))
    }

    /// Shader-resource view over `num_mips` mips of `count` elements
    pub fn create_view(&self, first_mip: u32, num_mips: u32, first_index: u32, count: u32) -> Result<ShaderResourceView> {
        self.core.require_binding(GpuBindings::READABLE_SHADER_RESOURCE, "shader resource view")?;
        let validation = self.core.validation();
        validation.assure(num_mips > 0 && count > 0, || "A view must cover at least one mip of one element.".to_string())?;
        validation.assure_range(first_mip as u64, num_mips as u64, self.num_mips as u64, "View mips")?;
        validation.assure_range(first_index as u64, count as u64, self.len() as u64, "View elements")?;
        ShaderResourceView::create(
            &self.core,
            self.to_string(),
            ShaderResourceRange::TextureArray {
                first_mip,
                num_mips,
                first_array_index: first_index,
                num_array_elements: count,
            },
        )
    }

    pub fn create_default_view(&self) -> Result<ShaderResourceView> {
        self.create_view(0, self.num_mips, 0, self.len() as u32)
    }

    /// Unordered-access view over one mip of `count` elements
    pub fn create_unordered_access_view(&self, mip_index: u32, first_index: u32, count: u32) -> Result<UnorderedAccessView> {
        self.core.require_binding(GpuBindings::WRITABLE_SHADER_RESOURCE, "unordered access view")?;
        let validation = self.core.validation();
        validation.assure_index(mip_index, self.num_mips, "Mip index")?;
        validation.assure(count > 0, || "A view must cover at least one element.".to_string())?;
        validation.assure_range(first_index as u64, count as u64, self.len() as u64, "View elements")?;
        UnorderedAccessView::create(
            &self.core,
            self.to_string(),
            UnorderedAccessRange::TextureArray { mip_index, first_array_index: first_index, num_array_elements: count },
        )
    }
}

impl<E: ArrayElement> Resource for TextureArray<E> {
    fn core(&self) -> &Arc<ResourceCore> {
        &self.core
    }

    fn dispose(&self) -> Result<()> {
        crate::losgap_trace!(LOG_SOURCE, "Disposing {} and its {} element(s)", self.core.kind(), self.len());
        self.core.dispose()
    }
}

impl<E: ArrayElement> Index<usize> for TextureArray<E> {
    type Output = E;

    fn index(&self, index: usize) -> &E {
        &self.elements[index]
    }
}

impl<'a, E: ArrayElement> IntoIterator for &'a TextureArray<E> {
    type Item = &'a E;
    type IntoIter = std::slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl<E: ArrayElement> fmt::Display for TextureArray<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [Usage: {}, Length: {}", self.core.kind(), self.core.usage(), self.len())?;
        if let Some(first) = self.elements.first() {
            write!(f, ", Width: {}, Height: {}, Mips: {}", first.width(), first.height(), first.num_mips())?;
        }
        write!(f, "]")
    }
}
