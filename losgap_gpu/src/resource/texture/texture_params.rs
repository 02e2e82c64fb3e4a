/// Texture builder parameters, construction assurances and native allocation

use std::mem::size_of;
use std::sync::Arc;
use crate::backend::{SubresourceCopy, TextureDesc, TextureDimension, TextureInitialData};
use crate::device::RenderingModule;
use crate::error::Result;
use crate::resource::{
    ResourceCore, ResourceUsage, GpuBindings, InitialResourceDataDesc, Texel, texture_utils,
};
use crate::resource::SubresourceBox;
use crate::resource::resource::{copy_endpoints_disposed, copy_initial_contents};
use crate::resource::texture::texture_base::ArraySlot;
use crate::validation::Validation;

const LOG_SOURCE: &str = "losgap::Texture";

/// Builder state shared by the 1D, 2D and 3D texture builders
pub(crate) struct TextureParams<T> {
    pub usage: ResourceUsage,
    pub bindings: GpuBindings,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub mip_allocation: bool,
    pub mip_generation_target: bool,
    pub dynamic_detail: bool,
    pub multisampled: bool,
    pub initial_data: Option<Arc<[T]>>,
    pub copy_source: Option<TextureCopySource>,
}

/// Texture a clone builder copies its initial contents from
///
/// For an array element only that element's slice is copied.
#[doc(hidden)]
#[derive(Clone)]
pub struct TextureCopySource {
    pub(crate) core: Arc<ResourceCore>,
    pub(crate) slot: Option<ArraySlot>,
    pub(crate) num_mips: u32,
}

impl TextureCopySource {
    /// Bytes of the source texture alone (one slice for array elements)
    fn size_bytes(&self) -> u64 {
        match self.slot {
            Some(slot) => self.core.size_bytes() / slot.length.max(1) as u64,
            None => self.core.size_bytes(),
        }
    }
}

impl<T> Clone for TextureParams<T> {
    fn clone(&self) -> Self {
        Self {
            usage: self.usage,
            bindings: self.bindings,
            width: self.width,
            height: self.height,
            depth: self.depth,
            mip_allocation: self.mip_allocation,
            mip_generation_target: self.mip_generation_target,
            dynamic_detail: self.dynamic_detail,
            multisampled: self.multisampled,
            initial_data: self.initial_data.clone(),
            copy_source: self.copy_source.clone(),
        }
    }
}

/// Shape and flags of an existing texture, used to seed clone builders
#[derive(Debug, Clone, Copy)]
pub(crate) struct TextureShape {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub mip_allocation: bool,
    pub mip_generation_target: bool,
    pub dynamic_detail: bool,
    pub multisampled: bool,
}

impl<T: Texel> TextureParams<T> {
    /// Defaults: Immutable, readable shader resource, zero-sized on every used axis
    pub fn new(dimension: TextureDimension) -> Self {
        Self {
            usage: ResourceUsage::Immutable,
            bindings: GpuBindings::READABLE_SHADER_RESOURCE,
            width: 0,
            height: if dimension == TextureDimension::Tex1D { 1 } else { 0 },
            depth: if dimension == TextureDimension::Tex3D { 0 } else { 1 },
            mip_allocation: false,
            mip_generation_target: false,
            dynamic_detail: false,
            multisampled: false,
            initial_data: None,
            copy_source: None,
        }
    }

    pub fn cloned_from(
        usage: ResourceUsage,
        bindings: GpuBindings,
        shape: TextureShape,
        copy_source: Option<TextureCopySource>,
    ) -> Self {
        Self {
            usage,
            bindings,
            width: shape.width,
            height: shape.height,
            depth: shape.depth,
            mip_allocation: shape.mip_allocation,
            mip_generation_target: shape.mip_generation_target,
            dynamic_detail: shape.dynamic_detail,
            multisampled: shape.multisampled,
            initial_data: None,
            copy_source,
        }
    }

    /// Same shape and flags, different texel type, no initial data
    pub fn with_texel_format<U: Texel>(&self) -> TextureParams<U> {
        TextureParams {
            usage: self.usage,
            bindings: self.bindings,
            width: self.width,
            height: self.height,
            depth: self.depth,
            mip_allocation: self.mip_allocation,
            mip_generation_target: self.mip_generation_target,
            dynamic_detail: self.dynamic_detail,
            multisampled: self.multisampled,
            initial_data: None,
            copy_source: self.copy_source.clone(),
        }
    }

    /// Reinterpret raw bytes as texels; a trailing partial texel is ignored
    pub fn texels_from_bytes(bytes: &[u8]) -> Vec<T> {
        let texel_count = bytes.len() / size_of::<T>();
        bytemuck::pod_collect_to_vec(&bytes[..texel_count * size_of::<T>()])
    }

    pub fn shape(&self) -> TextureShape {
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

    pub fn num_mips(&self) -> u32 {
        if self.mip_allocation {
            texture_utils::num_mips(self.width, self.height, self.depth)
        } else {
            1
        }
    }

    /// Texels of one texture, including the mip chain when allocated
    pub fn texels_per_texture(&self) -> u64 {
        texture_utils::size_texels(self.mip_allocation, self.width, self.height, self.depth)
    }

    /// Construction assurances shared by every texture dimensionality
    pub fn assure_valid(&self, validation: Validation, kind: &str, array_length: u32) -> Result<()> {
        let is_static = matches!(self.usage, ResourceUsage::Immutable | ResourceUsage::DiscardWrite);
        let bindings = self.bindings;

        validation.assure(
            self.usage != ResourceUsage::Immutable || self.initial_data.is_some() || self.copy_source.is_some(),
            || format!("{}: immutable resources require initial data.", kind),
        )?;
        validation.assure(!(is_static && bindings.is_none()), || {
            format!("{}: {} resources without GPU bindings are useless.", kind, self.usage)
        })?;
        validation.assure(!self.usage.is_staging() || bindings.is_none(), || {
            format!("{}: staging resources can not be bound to the pipeline ({:?}).", kind, bindings)
        })?;
        validation.assure(!is_static || !bindings.intersects(GpuBindings::GPU_WRITABLE), || {
            format!(
                "{}: can not bind a {} texture as a render target, depth stencil target or GPU-writable shader resource.",
                kind, self.usage
            )
        })?;

        validation.assure(array_length > 0, || format!("{}: can not create an array of 0 textures.", kind))?;
        validation.assure(self.width > 0 && self.height > 0 && self.depth > 0, || {
            format!("{}: every dimension must be greater than zero ({}x{}x{}).", kind, self.width, self.height, self.depth)
        })?;

        validation.assure(
            !self.mip_allocation
                || (self.width.is_power_of_two() && self.height.is_power_of_two() && self.depth.is_power_of_two()),
            || format!(
                "{}: can not allocate mips with a non-power-of-two dimension ({}x{}x{}).",
                kind, self.width, self.height, self.depth
            ),
        )?;
        validation.assure(!(self.mip_allocation && self.usage == ResourceUsage::DiscardWrite), || {
            format!("{}: can not allocate mips on a discard-write texture.", kind)
        })?;
        validation.assure(!self.mip_generation_target || self.mip_allocation, || {
            format!("{}: can not generate mips without allocating space for them.", kind)
        })?;
        validation.assure(
            !self.mip_generation_target
                || bindings.contains(GpuBindings::RENDER_TARGET | GpuBindings::READABLE_SHADER_RESOURCE),
            || format!(
                "{}: mip generation targets need the RenderTarget and ReadableShaderResource bindings.",
                kind
            ),
        )?;
        validation.assure(!(self.mip_generation_target && self.initial_data.is_some()), || {
            format!("{}: can not supply initial data to a mip generation target.", kind)
        })?;

        if let Some(data) = &self.initial_data {
            let expected = self.texels_per_texture() * array_length as u64;
            validation.assure(data.len() as u64 == expected, || {
                format!("{}: initial data has {} texels, expected {}.", kind, data.len(), expected)
            })?;
        }

        validation.assure(!(self.dynamic_detail && self.usage.is_staging()), || {
            format!("{}: can not create a dynamic-detail staging texture.", kind)
        })?;
        validation.assure(!(self.multisampled && self.mip_allocation), || {
            format!("{}: can not create a mipmapped multisampled texture.", kind)
        })?;
        validation.assure(!(self.multisampled && self.initial_data.is_some()), || {
            format!("{}: can not supply initial data to a multisampled texture.", kind)
        })?;
        Ok(())
    }
}

/// Allocate the native texture (or texture array), upload initial data and run
/// the pending copy
pub(crate) fn create_texture_core<T: Texel>(
    module: &Arc<RenderingModule>,
    dimension: TextureDimension,
    params: &TextureParams<T>,
    array_length: u32,
    kind: String,
) -> Result<Arc<ResourceCore>> {
    let num_mips = params.num_mips();
    let texel_size = size_of::<T>() as u32;
    let desc = TextureDesc {
        dimension,
        width: params.width,
        height: params.height,
        depth: params.depth,
        array_size: array_length,
        num_mips,
        format: T::FORMAT,
        usage: params.usage,
        bindings: params.bindings,
        multisampled: params.multisampled,
        mip_generation_target: params.mip_generation_target,
    };

    let device = module.device()?;
    let subresources = match params.initial_data {
        Some(_) => InitialResourceDataDesc::create_data_descs(
            array_length,
            num_mips,
            params.width,
            params.height,
            params.depth,
            texel_size,
        ),
        None => Vec::new(),
    };
    let initial_data = params.initial_data.as_deref().map(|data| TextureInitialData {
        bytes: bytemuck::cast_slice(data),
        subresources: &subresources,
    });
    let handle = module.backend().create_texture(device, &desc, initial_data)?;

    let size_bytes = params.texels_per_texture() * texel_size as u64 * array_length as u64;
    let core = ResourceCore::new(Arc::clone(module), handle, params.usage, size_bytes, params.bindings, kind);

    if let Some(source) = &params.copy_source {
        if let Err(e) = copy_from_source(source, &core, params, array_length) {
            crate::losgap_error!(LOG_SOURCE, "Initial copy into {} failed: {}", core.kind(), e);
            let _ = core.dispose();
            return Err(e);
        }
    }
    if params.dynamic_detail {
        module.register_dynamic_detail_texture(&core);
    }
    Ok(core)
}

/// Initialization copy from a clone source; array elements are copied mip by mip
fn copy_from_source<T: Texel>(
    source: &TextureCopySource,
    destination: &ResourceCore,
    params: &TextureParams<T>,
    array_length: u32,
) -> Result<()> {
    let Some(slot) = source.slot else {
        return copy_initial_contents(&source.core, destination);
    };
    if copy_endpoints_disposed(&source.core, destination) {
        return Ok(());
    }
    let num_mips = params.num_mips();
    source.core.validation().assure(
        array_length == 1 && source.num_mips == num_mips && source.size_bytes() == destination.size_bytes(),
        || format!(
            "Can not initialize {} ({} bytes) from element {} of {} ({} bytes): shapes differ.",
            destination.kind(), destination.size_bytes(), slot.index, source.core.kind(), source.size_bytes()
        ),
    )?;

    let context = destination.context()?;
    for mip_index in 0..num_mips {
        let copy = SubresourceCopy {
            source: source.core.handle(),
            source_subresource: texture_utils::subresource_index(num_mips, mip_index, slot.index),
            region: SubresourceBox::whole(
                texture_utils::mip_dimension(params.width, mip_index),
                texture_utils::mip_dimension(params.height, mip_index),
                texture_utils::mip_dimension(params.depth, mip_index),
            ),
            destination: destination.handle(),
            destination_subresource: mip_index,
            destination_offset: [0, 0, 0],
        };
        destination.backend().copy_subresource_region(context, &copy)?;
    }
    Ok(())
}

/// Accessors and `with_*` setters shared by the texture builders
///
/// Expects a builder with `module`, `params: TextureParams<T>` and `memo` fields.
macro_rules! texture_builder_setters {
    () => {
        fn with_params(&self, params: TextureParams<T>) -> Self {
            Self { module: Arc::clone(&self.module), params, memo: Memo::new() }
        }

        pub fn usage(&self) -> ResourceUsage {
            self.params.usage
        }

        pub fn permitted_bindings(&self) -> GpuBindings {
            self.params.bindings
        }

        pub fn width(&self) -> u32 {
            self.params.width
        }

        pub fn mip_allocation(&self) -> bool {
            self.params.mip_allocation
        }

        pub fn initial_data(&self) -> Option<&[T]> {
            self.params.initial_data.as_deref()
        }

        pub fn with_usage(&self, usage: ResourceUsage) -> Self {
            self.with_params(TextureParams { usage, ..self.params.clone() })
        }

        pub fn with_permitted_bindings(&self, bindings: GpuBindings) -> Self {
            self.with_params(TextureParams { bindings, ..self.params.clone() })
        }

        pub fn with_width(&self, width: u32) -> Self {
            self.with_params(TextureParams { width, ..self.params.clone() })
        }

        /// Allocate a full mip chain (power-of-two dimensions only)
        pub fn with_mip_allocation(&self, mip_allocation: bool) -> Self {
            self.with_params(TextureParams { mip_allocation, ..self.params.clone() })
        }

        /// Allow `generate_mips`; needs mip allocation and the RenderTarget plus
        /// ReadableShaderResource bindings
        pub fn with_mip_generation_target(&self, mip_generation_target: bool) -> Self {
            self.with_params(TextureParams { mip_generation_target, ..self.params.clone() })
        }

        /// Register the texture for global detail adjustment
        pub fn with_dynamic_detail(&self, dynamic_detail: bool) -> Self {
            self.with_params(TextureParams { dynamic_detail, ..self.params.clone() })
        }

        /// Initial texels: every mip of the first texture, then every mip of the next
        pub fn with_initial_data(&self, data: &[T]) -> Self {
            self.with_params(TextureParams { initial_data: Some(Arc::from(data)), ..self.params.clone() })
        }

        /// Initial data given as raw bytes in the texel layout
        pub fn with_initial_data_raw(&self, bytes: &[u8]) -> Self {
            let texels = TextureParams::<T>::texels_from_bytes(bytes);
            self.with_params(TextureParams { initial_data: Some(Arc::from(texels)), ..self.params.clone() })
        }
    };
}

pub(crate) use texture_builder_setters;
