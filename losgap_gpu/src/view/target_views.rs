/// Render-target and depth-stencil views

use std::fmt;
use std::sync::Arc;
use crate::backend::ViewDesc;
use crate::error::Result;
use crate::resource::ResourceCore;
use crate::view::{ResourceView, ViewCore};

/// Output binding over one mip of one texture (or one array slice)
pub struct RenderTargetView {
    core: ViewCore,
    mip_index: u32,
    array_index: Option<u32>,
}

impl RenderTargetView {
    pub(crate) fn create(
        resource: &Arc<ResourceCore>,
        resource_description: String,
        mip_index: u32,
        array_index: Option<u32>,
    ) -> Result<Self> {
        let core = ViewCore::create(resource, resource_description, ViewDesc::RenderTarget { mip_index, array_index })?;
        Ok(Self { core, mip_index, array_index })
    }

    pub fn mip_index(&self) -> u32 {
        self.mip_index
    }

    /// Array slice, for views over an array element
    pub fn array_index(&self) -> Option<u32> {
        self.array_index
    }
}

impl ResourceView for RenderTargetView {
    fn view_core(&self) -> &ViewCore {
        &self.core
    }
}

impl fmt::Display for RenderTargetView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RTV for {} (Mip {}", self.core.resource_description(), self.mip_index)?;
        if let Some(index) = self.array_index {
            write!(f, ", Element {}", index)?;
        }
        write!(f, ")")
    }
}

/// Depth-stencil binding over one mip of one 2D texture (or one array slice)
pub struct DepthStencilView {
    core: ViewCore,
    mip_index: u32,
    array_index: Option<u32>,
}

impl DepthStencilView {
    pub(crate) fn create(
        resource: &Arc<ResourceCore>,
        resource_description: String,
        mip_index: u32,
        array_index: Option<u32>,
    ) -> Result<Self> {
        let core = ViewCore::create(resource, resource_description, ViewDesc::DepthStencil { mip_index, array_index })?;
        Ok(Self { core, mip_index, array_index })
    }

    pub fn mip_index(&self) -> u32 {
        self.mip_index
    }

    pub fn array_index(&self) -> Option<u32> {
        self.array_index
    }
}

impl ResourceView for DepthStencilView {
    fn view_core(&self) -> &ViewCore {
        &self.core
    }
}

impl fmt::Display for DepthStencilView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DSV for {} (Mip {}", self.core.resource_description(), self.mip_index)?;
        if let Some(index) = self.array_index {
            write!(f, ", Element {}", index)?;
        }
        write!(f, ")")
    }
}
