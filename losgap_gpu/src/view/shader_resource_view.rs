/// Shader-resource views

use std::fmt;
use std::sync::Arc;
use crate::backend::{ShaderResourceRange, ViewDesc};
use crate::error::Result;
use crate::resource::ResourceCore;
use crate::view::{ResourceView, ViewCore};

/// Read-only shader binding over a range of elements or mips
pub struct ShaderResourceView {
    core: ViewCore,
    range: ShaderResourceRange,
}

impl ShaderResourceView {
    pub(crate) fn create(resource: &Arc<ResourceCore>, resource_description: String, range: ShaderResourceRange) -> Result<Self> {
        let core = ViewCore::create(resource, resource_description, ViewDesc::ShaderResource(range))?;
        Ok(Self { core, range })
    }

    pub fn range(&self) -> ShaderResourceRange {
        self.range
    }
}

impl ResourceView for ShaderResourceView {
    fn view_core(&self) -> &ViewCore {
        &self.core
    }
}

impl fmt::Display for ShaderResourceView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SRV for {} ", self.core.resource_description())?;
        match self.range {
            ShaderResourceRange::Buffer { first_element, num_elements } => {
                write!(f, "(Elements {}..{})", first_element, first_element + num_elements)
            }
            ShaderResourceRange::Texture { first_mip, num_mips } => {
                write!(f, "(Mips {}..{})", first_mip, first_mip + num_mips)
            }
            ShaderResourceRange::TextureArray { first_mip, num_mips, first_array_index, num_array_elements } => write!(
                f,
                "(Mips {}..{}, Elements {}..{})",
                first_mip,
                first_mip + num_mips,
                first_array_index,
                first_array_index + num_array_elements
            ),
        }
    }
}

impl fmt::Debug for ShaderResourceView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderResourceView")
            .field("core", &self.core)
            .field("range", &self.range)
            .finish()
    }
}
