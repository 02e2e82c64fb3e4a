/// View state shared by every view type

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use crate::backend::{ResourceViewHandle, ViewDesc};
use crate::error::Result;
use crate::resource::ResourceCore;

const LOG_SOURCE: &str = "losgap::ResourceView";

/// Native view plus a non-owning link to the viewed resource's state
pub struct ViewCore {
    handle: ResourceViewHandle,
    resource: Arc<ResourceCore>,
    /// Resource description at creation time
    resource_description: String,
    disposed: AtomicBool,
}

impl ViewCore {
    pub(crate) fn create(resource: &Arc<ResourceCore>, resource_description: String, desc: ViewDesc) -> Result<Self> {
        resource.require_live()?;
        let device = resource.module().device()?;
        let handle = resource.backend().create_view(device, resource.handle(), &desc)?;
        crate::losgap_trace!(LOG_SOURCE, "Created view {} over {}", handle, resource_description);
        Ok(Self {
            handle,
            resource: Arc::clone(resource),
            resource_description,
            disposed: AtomicBool::new(false),
        })
    }

    pub(crate) fn handle(&self) -> ResourceViewHandle {
        self.handle
    }

    pub(crate) fn resource(&self) -> &Arc<ResourceCore> {
        &self.resource
    }

    pub(crate) fn resource_description(&self) -> &str {
        &self.resource_description
    }

    pub(crate) fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    pub(crate) fn dispose(&self) -> Result<()> {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.resource.backend().release_view(self.handle)
    }
}

impl Drop for ViewCore {
    fn drop(&mut self) {
        if *self.disposed.get_mut() {
            return;
        }
        if let Err(e) = self.resource.backend().release_view(self.handle) {
            crate::losgap_error!(LOG_SOURCE, "Failed to release view {}: {}", self.handle, e);
        }
    }
}

impl fmt::Debug for ViewCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewCore")
            .field("handle", &self.handle)
            .field("resource", &self.resource_description)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// Behaviour common to SRVs, UAVs, RTVs and DSVs
pub trait ResourceView: fmt::Display {
    #[doc(hidden)]
    fn view_core(&self) -> &ViewCore;

    fn handle(&self) -> ResourceViewHandle {
        self.view_core().handle()
    }

    /// State of the viewed resource
    fn resource(&self) -> &Arc<ResourceCore> {
        self.view_core().resource()
    }

    /// True once either this view or its resource has been disposed
    fn resource_or_view_disposed(&self) -> bool {
        self.view_core().is_disposed() || self.view_core().resource().is_disposed()
    }

    /// Release the native view; later calls do nothing
    fn dispose(&self) -> Result<()> {
        self.view_core().dispose()
    }
}
