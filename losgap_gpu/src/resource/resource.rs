/// Common resource state and the `Resource` trait

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use crate::backend::{ResourceHandle, DeviceContextHandle, GraphicsBackend, MapMode, MappedSubresource};
use crate::device::RenderingModule;
use crate::error::{Error, Result};
use crate::resource::{ResourceUsage, GpuBindings};
use crate::validation::Validation;

const LOG_SOURCE: &str = "losgap::Resource";

/// State shared by a resource and every view or array element referring to it
///
/// The disposed flag lives here so that views observe disposal of their
/// resource without holding a reference to the resource object itself.
pub struct ResourceCore {
    module: Arc<RenderingModule>,
    handle: ResourceHandle,
    usage: ResourceUsage,
    size_bytes: u64,
    bindings: GpuBindings,
    /// Type description, e.g. "Buffer<u32>"
    kind: String,
    disposed: AtomicBool,
}

impl ResourceCore {
    pub(crate) fn new(
        module: Arc<RenderingModule>,
        handle: ResourceHandle,
        usage: ResourceUsage,
        size_bytes: u64,
        bindings: GpuBindings,
        kind: String,
    ) -> Arc<Self> {
        crate::losgap_trace!(LOG_SOURCE, "Created {} ({}, {} bytes)", kind, handle, size_bytes);
        Arc::new(Self {
            module,
            handle,
            usage,
            size_bytes,
            bindings,
            kind,
            disposed: AtomicBool::new(false),
        })
    }

    pub fn handle(&self) -> ResourceHandle {
        self.handle
    }

    pub fn usage(&self) -> ResourceUsage {
        self.usage
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn permitted_bindings(&self) -> GpuBindings {
        self.bindings
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    pub fn module(&self) -> &Arc<RenderingModule> {
        &self.module
    }

    pub(crate) fn backend(&self) -> &dyn GraphicsBackend {
        self.module.backend()
    }

    pub(crate) fn validation(&self) -> Validation {
        self.module.validation()
    }

    /// Context of the calling thread
    pub(crate) fn context(&self) -> Result<DeviceContextHandle> {
        self.module.device_context()
    }

    /// Release the native resource; later calls do nothing
    pub fn dispose(&self) -> Result<()> {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        crate::losgap_trace!(LOG_SOURCE, "Disposing {} ({})", self.kind, self.handle);
        self.backend().release_resource(self.handle)
    }

    /// Map one subresource on the calling thread's context and run `access` on it
    pub(crate) fn map<F>(&self, subresource: u32, mode: MapMode, access: F) -> Result<()>
    where
        F: FnOnce(MappedSubresource<'_>),
    {
        let context = self.context()?;
        let mut access = Some(access);
        self.backend().map_subresource(context, self.handle, subresource, mode, &mut |mapped| {
            if let Some(access) = access.take() {
                access(mapped);
            }
        })
    }

    /// Map for writing and copy `bytes` at `byte_offset` of the subresource
    pub(crate) fn map_and_write(&self, subresource: u32, mode: MapMode, byte_offset: usize, bytes: &[u8]) -> Result<()> {
        let mut copied = false;
        self.map(subresource, mode, |mapped| {
            if let Some(target) = mapped.data.get_mut(byte_offset..byte_offset + bytes.len()) {
                target.copy_from_slice(bytes);
                copied = true;
            }
        })?;
        if !copied {
            crate::losgap_bail!(
                LOG_SOURCE,
                "Mapped memory of {} too small for {} bytes at offset {}",
                self.kind,
                bytes.len(),
                byte_offset
            );
        }
        Ok(())
    }

    /// Map for reading and copy out `len` bytes from `byte_offset`
    pub(crate) fn map_and_read(&self, subresource: u32, byte_offset: usize, len: usize) -> Result<Vec<u8>> {
        let mut out = None;
        self.map(subresource, MapMode::Read, |mapped| {
            out = mapped.data.get(byte_offset..byte_offset + len).map(<[u8]>::to_vec);
        })?;
        match out {
            Some(bytes) => Ok(bytes),
            None => Err(crate::losgap_err!(
                LOG_SOURCE,
                "Mapped memory of {} too small to read {} bytes at offset {}",
                self.kind,
                len,
                byte_offset
            )),
        }
    }

    /// Mapping mode for a CPU write with this resource's usage
    pub(crate) fn write_map_mode(&self) -> MapMode {
        match self.usage {
            ResourceUsage::DiscardWrite => MapMode::WriteDiscard,
            usage if usage.can_read() => MapMode::ReadWrite,
            _ => MapMode::Write,
        }
    }

    /// Fail with a usage violation unless `allowed`
    pub(crate) fn require_usage(&self, allowed: bool, operation: &str) -> Result<()> {
        if allowed {
            return Ok(());
        }
        let error = Error::usage_violation(operation, self.usage);
        crate::losgap_error!(LOG_SOURCE, "{} on {}", error, self.kind);
        Err(error)
    }

    /// Fail unless the resource is still alive
    pub(crate) fn require_live(&self) -> Result<()> {
        if self.is_disposed() {
            return Err(Error::InvalidOperation(format!("{} has been disposed.", self.kind)));
        }
        Ok(())
    }

    /// Fail unless the resource permits `binding`
    pub(crate) fn require_binding(&self, binding: GpuBindings, view_kind: &str) -> Result<()> {
        if self.bindings.contains(binding) {
            return Ok(());
        }
        Err(Error::InvalidOperation(format!(
            "Can not create a {} over {}: binding {:?} is not permitted (bindings: {:?}).",
            view_kind, self.kind, binding, self.bindings
        )))
    }
}

/// Log and skip a copy whose source or destination was disposed
pub(crate) fn copy_endpoints_disposed(source: &ResourceCore, destination: &ResourceCore) -> bool {
    if source.is_disposed() || destination.is_disposed() {
        crate::losgap_warn!(
            LOG_SOURCE,
            "Skipping copy from {} to {}: resource disposed",
            source.kind,
            destination.kind
        );
        return true;
    }
    false
}

/// Copy the whole of `source` into `destination`
///
/// Both must have the same size and be distinct resources.
pub(crate) fn copy_whole_resource(source: &ResourceCore, destination: &ResourceCore) -> Result<()> {
    if copy_endpoints_disposed(source, destination) {
        return Ok(());
    }
    destination.require_usage(destination.usage.can_be_copy_destination(), "copy to")?;
    let validation = source.validation();
    validation.assure(source.handle != destination.handle, || {
        format!("Can not copy {} to itself.", source.kind)
    })?;
    validation.assure(source.size_bytes == destination.size_bytes, || {
        format!(
            "Can not copy {} ({} bytes) to {} ({} bytes): sizes differ.",
            source.kind, source.size_bytes, destination.kind, destination.size_bytes
        )
    })?;
    let context = source.context()?;
    source.backend().copy_resource(context, source.handle, destination.handle)
}

/// Initialization copy from a clone source
///
/// Unlike a regular copy this ignores the destination's usage: it stands in
/// for initial data.
pub(crate) fn copy_initial_contents(source: &ResourceCore, destination: &ResourceCore) -> Result<()> {
    if copy_endpoints_disposed(source, destination) {
        return Ok(());
    }
    source.validation().assure(source.size_bytes() == destination.size_bytes(), || {
        format!(
            "Can not initialize {} ({} bytes) from {} ({} bytes): sizes differ.",
            destination.kind(), destination.size_bytes(), source.kind(), source.size_bytes()
        )
    })?;
    let context = destination.context()?;
    destination.backend().copy_resource(context, source.handle(), destination.handle())
}

impl fmt::Debug for ResourceCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceCore")
            .field("kind", &self.kind)
            .field("handle", &self.handle)
            .field("usage", &self.usage)
            .field("size_bytes", &self.size_bytes)
            .field("bindings", &self.bindings)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

impl Drop for ResourceCore {
    fn drop(&mut self) {
        if *self.disposed.get_mut() {
            return;
        }
        if self.module.config().warn_on_undisposed_drop {
            crate::losgap_warn!(LOG_SOURCE, "{} ({}) dropped without being disposed", self.kind, self.handle);
        }
        if let Err(e) = self.module.backend().release_resource(self.handle) {
            crate::losgap_error!(LOG_SOURCE, "Failed to release {}: {}", self.kind, e);
        }
    }
}

/// Behaviour common to every buffer and texture
pub trait Resource: fmt::Display {
    /// Shared state of this resource
    fn core(&self) -> &Arc<ResourceCore>;

    fn handle(&self) -> ResourceHandle {
        self.core().handle()
    }

    fn usage(&self) -> ResourceUsage {
        self.core().usage()
    }

    /// Size in bytes
    fn size_bytes(&self) -> u64 {
        self.core().size_bytes()
    }

    fn permitted_bindings(&self) -> GpuBindings {
        self.core().permitted_bindings()
    }

    fn is_disposed(&self) -> bool {
        self.core().is_disposed()
    }

    /// Release the native resource
    fn dispose(&self) -> Result<()> {
        self.core().dispose()
    }

    fn can_discard_write(&self) -> bool {
        self.usage().can_discard_write()
    }

    fn can_write(&self) -> bool {
        self.usage().can_write()
    }

    fn can_read(&self) -> bool {
        self.usage().can_read()
    }

    fn can_read_write(&self) -> bool {
        self.usage().can_read_write()
    }

    fn can_be_copy_destination(&self) -> bool {
        self.usage().can_be_copy_destination()
    }
}

/// Usage and binding support declared by a resource type
pub trait ResourceSupport {
    /// Usages this resource type can be built with
    const SUPPORTED_USAGES: &'static [ResourceUsage];
    /// Bindings this resource type may carry
    const SUPPORTED_BINDINGS: GpuBindings;
}

/// Check a builder's usage and bindings against a resource type's support table
///
/// Both checks are always enforced.
pub(crate) fn check_support<R: ResourceSupport>(kind: &str, usage: ResourceUsage, bindings: GpuBindings) -> Result<()> {
    if !R::SUPPORTED_USAGES.contains(&usage) {
        let error = Error::ResourceOperationUnavailable(format!(
            "{} does not support usage '{}'.", kind, usage
        ));
        crate::losgap_error!(LOG_SOURCE, "{}", error);
        return Err(error);
    }
    if !R::SUPPORTED_BINDINGS.contains(bindings) {
        let error = Error::InvalidArgument(format!(
            "{} does not support GPU bindings {:?} (supported: {:?}).", kind, bindings, R::SUPPORTED_BINDINGS
        ));
        crate::losgap_error!(LOG_SOURCE, "{}", error);
        return Err(error);
    }
    Ok(())
}

/// Type name with module paths stripped, e.g. `Vec4` or `Option<Rgba8UNorm>`
pub(crate) fn short_type_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let mut name = String::with_capacity(full.len());
    let mut segment = String::new();
    let mut chars = full.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ':' && chars.peek() == Some(&':') {
            chars.next();
            segment.clear();
        } else if c.is_alphanumeric() || c == '_' {
            segment.push(c);
        } else {
            name.push_str(&segment);
            segment.clear();
            name.push(c);
        }
    }
    name.push_str(&segment);
    name
}
