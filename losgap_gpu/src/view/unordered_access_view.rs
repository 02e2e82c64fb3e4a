/// Unordered-access views

use std::fmt;
use std::sync::Arc;
use crate::backend::{UnorderedAccessRange, ViewDesc};
use crate::error::Result;
use crate::resource::ResourceCore;
use crate::view::{ResourceView, ViewCore};

/// Read/write shader binding
pub struct UnorderedAccessView {
    core: ViewCore,
    range: UnorderedAccessRange,
}

impl UnorderedAccessView {
    pub(crate) fn create(resource: &Arc<ResourceCore>, resource_description: String, range: UnorderedAccessRange) -> Result<Self> {
        let core = ViewCore::create(resource, resource_description, ViewDesc::UnorderedAccess(range))?;
        Ok(Self { core, range })
    }

    pub fn range(&self) -> UnorderedAccessRange {
        self.range
    }

    /// True for byte-addressed views over buffers of natively formatted elements
    pub fn is_raw_access_view(&self) -> bool {
        matches!(self.range, UnorderedAccessRange::Buffer { raw: true, .. })
    }

    pub fn append_consume_support(&self) -> bool {
        matches!(self.range, UnorderedAccessRange::Buffer { append_consume: true, .. })
    }

    pub fn includes_counter(&self) -> bool {
        matches!(self.range, UnorderedAccessRange::Buffer { include_counter: true, .. })
    }
}

impl ResourceView for UnorderedAccessView {
    fn view_core(&self) -> &ViewCore {
        &self.core
    }
}

impl fmt::Display for UnorderedAccessView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UAV for {} ", self.core.resource_description())?;
        match self.range {
            UnorderedAccessRange::Buffer { first_element, num_elements, append_consume, include_counter, raw } => {
                write!(f, "(Elements {}..{}", first_element, first_element + num_elements)?;
                if raw {
                    write!(f, ", Raw")?;
                }
                if append_consume {
                    write!(f, ", AppendConsume")?;
                }
                if include_counter {
                    write!(f, ", Counter")?;
                }
                write!(f, ")")
            }
            UnorderedAccessRange::Texture { mip_index } => write!(f, "(Mip {})", mip_index),
            UnorderedAccessRange::TextureArray { mip_index, first_array_index, num_array_elements } => write!(
                f,
                "(Mip {}, Elements {}..{})",
                mip_index,
                first_array_index,
                first_array_index + num_array_elements
            ),
            UnorderedAccessRange::VolumeSlices { mip_index, first_slice, num_slices } => write!(
                f,
                "(Mip {}, Slices {}..{})",
                mip_index,
                first_slice,
                first_slice + num_slices
            ),
        }
    }
}
