/// SoftBackend - CPU-memory implementation of the GraphicsBackend trait
///
/// Every native object lives in a slot map behind one mutex. Handles are the
/// FFI form of slot keys, which are never zero, so `NULL` never names a live
/// object.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use losgap_gpu::losgap::{Error, Result};
use losgap_gpu::losgap::backend::{
    GraphicsBackend, CreatedDevice, DeviceHandle, DeviceContextHandle, ResourceHandle,
    ResourceViewHandle, CommandListHandle, BufferDesc, TextureDesc, TextureInitialData, ViewDesc,
    ShaderResourceRange, UnorderedAccessRange, MapMode, MappedSubresource, SubresourceCopy,
};
use losgap_gpu::losgap::hardware::{GraphicsProcessingUnit, HardwareSelection};
use losgap_gpu::losgap::resource::{ResourceUsage, SubresourceBox};
use losgap_gpu::{losgap_bail, losgap_debug, losgap_trace};
use slotmap::{new_key_type, Key, KeyData, SlotMap};

use crate::soft_commands::SoftCommand;
use crate::soft_config::SoftBackendConfig;
use crate::soft_storage::{ResourceKey, ResourceSlots, SoftResource, SoftResourceKind};

const LOG_SOURCE: &str = "losgap::soft";

new_key_type! {
    struct DeviceKey;
    struct ContextKey;
    struct ViewKey;
    struct CommandListKey;
}

fn to_raw<K: Key>(key: K) -> u64 {
    key.data().as_ffi()
}

fn from_raw<K: Key>(raw: u64) -> K {
    KeyData::from_ffi(raw).into()
}

struct SoftDevice {
    immediate_context: ContextKey,
    supports_multithreading: bool,
}

struct SoftContext {
    device: DeviceKey,
    deferred: bool,
    /// Commands recorded since the last `finish_command_list` (deferred only)
    recorded: Vec<SoftCommand>,
}

struct SoftView {
    resource: ResourceKey,
    desc: ViewDesc,
}

struct SoftCommandList {
    device: DeviceKey,
    commands: Vec<SoftCommand>,
}

#[derive(Default)]
struct SoftState {
    devices: SlotMap<DeviceKey, SoftDevice>,
    contexts: SlotMap<ContextKey, SoftContext>,
    resources: ResourceSlots,
    views: SlotMap<ViewKey, SoftView>,
    command_lists: SlotMap<CommandListKey, SoftCommandList>,
}

impl SoftState {
    fn context(&self, handle: DeviceContextHandle) -> Result<&SoftContext> {
        match self.contexts.get(from_raw(handle.0)) {
            Some(context) => Ok(context),
            None => losgap_bail!(LOG_SOURCE, "Unknown device context {}", handle),
        }
    }

    fn resource(&self, handle: ResourceHandle) -> Result<&SoftResource> {
        match self.resources.get(from_raw(handle.0)) {
            Some(resource) => Ok(resource),
            None => losgap_bail!(LOG_SOURCE, "Unknown resource {}", handle),
        }
    }

    fn require_device(&self, handle: DeviceHandle) -> Result<DeviceKey> {
        let key = from_raw(handle.0);
        if !self.devices.contains_key(key) {
            losgap_bail!(LOG_SOURCE, "Unknown device {}", handle);
        }
        Ok(key)
    }

    /// Apply `command` now on an immediate context, or record it on a deferred one
    fn submit(&mut self, handle: DeviceContextHandle, command: SoftCommand) -> Result<()> {
        let SoftState { contexts, resources, .. } = self;
        let Some(context) = contexts.get_mut(from_raw(handle.0)) else {
            losgap_bail!(LOG_SOURCE, "Unknown device context {}", handle);
        };
        if context.deferred {
            losgap_trace!(LOG_SOURCE, "Recording {} on {}", command.name(), handle);
            context.recorded.push(command);
            return Ok(());
        }
        command.apply(resources)
    }
}

/// Whether a resource with `usage` may be mapped with `mode`
fn map_allowed(usage: ResourceUsage, mode: MapMode) -> bool {
    match mode {
        MapMode::Read => usage.can_read(),
        MapMode::Write => usage.is_staging() && usage.can_write(),
        MapMode::ReadWrite => usage.can_read_write(),
        MapMode::WriteDiscard => usage.can_discard_write(),
    }
}

/// Software graphics backend
///
/// Resources are plain byte vectors in system memory, so everything the
/// resource layer writes can be read back and compared. Deferred contexts
/// record commands that `execute_command_list` replays in order.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use losgap_gpu::losgap::{RenderingConfig, RenderingModule};
/// use losgap_gpu_backend_soft::{SoftBackend, SoftBackendConfig};
///
/// let backend = Arc::new(SoftBackend::new(SoftBackendConfig::default()));
/// let module = RenderingModule::new(backend, RenderingConfig::default())?;
/// # Ok::<(), losgap_gpu::losgap::Error>(())
/// ```
pub struct SoftBackend {
    config: SoftBackendConfig,
    state: Mutex<SoftState>,
    fail_next_device_creation: AtomicBool,
}

impl SoftBackend {
    pub fn new(config: SoftBackendConfig) -> Self {
        Self {
            config,
            state: Mutex::new(SoftState::default()),
            fail_next_device_creation: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &SoftBackendConfig {
        &self.config
    }

    /// Make the next `create_device` call fail
    pub fn fail_next_device_creation(&self) {
        self.fail_next_device_creation.store(true, Ordering::Release);
    }

    /// Raw contents of one subresource, bypassing usage restrictions
    pub fn subresource_contents(&self, resource: ResourceHandle, subresource: u32) -> Result<Vec<u8>> {
        let state = self.state();
        Ok(state.resource(resource)?.subresource(subresource)?.data.clone())
    }

    /// Number of live devices
    pub fn live_device_count(&self) -> usize {
        self.state().devices.len()
    }

    /// Number of live contexts, immediate ones included
    pub fn live_context_count(&self) -> usize {
        self.state().contexts.len()
    }

    pub fn live_view_count(&self) -> usize {
        self.state().views.len()
    }

    fn state(&self) -> MutexGuard<'_, SoftState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_selection(&self, selection: &HardwareSelection) -> Result<()> {
        let gpus = &self.config.gpus;
        if selection.gpu_index >= gpus.len() {
            return Err(Error::InvalidArgument(format!(
                "GPU index {} out of range ({} GPUs).", selection.gpu_index, gpus.len()
            )));
        }
        let has_output = gpus
            .get(selection.output_gpu_index)
            .is_some_and(|gpu| selection.output_index < gpu.outputs.len());
        if !has_output {
            return Err(Error::InvalidArgument(format!(
                "Output {} of GPU {} does not exist.", selection.output_index, selection.output_gpu_index
            )));
        }
        Ok(())
    }
}

impl Default for SoftBackend {
    fn default() -> Self {
        Self::new(SoftBackendConfig::default())
    }
}

impl GraphicsBackend for SoftBackend {
    fn name(&self) -> &str {
        "Software"
    }

    // ===== HARDWARE & DEVICE =====

    fn enumerate_hardware(&self) -> Result<Vec<GraphicsProcessingUnit>> {
        Ok(self.config.gpus.clone())
    }

    fn create_device(&self, selection: &HardwareSelection) -> Result<CreatedDevice> {
        if self.fail_next_device_creation.swap(false, Ordering::AcqRel) {
            losgap_bail!(LOG_SOURCE, "Simulated device creation failure");
        }
        self.check_selection(selection)?;

        let supports_multithreading = self.config.supports_multithreading;
        let mut state = self.state();
        let device = state.devices.insert(SoftDevice {
            immediate_context: ContextKey::null(),
            supports_multithreading,
        });
        let immediate_context = state.contexts.insert(SoftContext {
            device,
            deferred: false,
            recorded: Vec::new(),
        });
        if let Some(created) = state.devices.get_mut(device) {
            created.immediate_context = immediate_context;
        }

        losgap_debug!(
            LOG_SOURCE,
            "Created device on GPU {} (output {} of GPU {}, multithreading: {})",
            selection.gpu_index,
            selection.output_index,
            selection.output_gpu_index,
            supports_multithreading
        );
        Ok(CreatedDevice { device: DeviceHandle(to_raw(device)), supports_multithreading })
    }

    fn release_device(&self, device: DeviceHandle) -> Result<()> {
        let mut state = self.state();
        let key = state.require_device(device)?;
        state.devices.remove(key);
        state.contexts.retain(|_, context| context.device != key);
        state.command_lists.retain(|_, list| list.device != key);
        losgap_debug!(
            LOG_SOURCE,
            "Released device {} ({} resources still alive)",
            device,
            state.resources.len()
        );
        Ok(())
    }

    // ===== CONTEXTS =====

    fn immediate_context(&self, device: DeviceHandle) -> Result<DeviceContextHandle> {
        let state = self.state();
        let key = state.require_device(device)?;
        let context = state.devices[key].immediate_context;
        Ok(DeviceContextHandle(to_raw(context)))
    }

    fn create_deferred_context(&self, device: DeviceHandle) -> Result<DeviceContextHandle> {
        let mut state = self.state();
        let key = state.require_device(device)?;
        if !state.devices[key].supports_multithreading {
            losgap_bail!(LOG_SOURCE, "Device {} does not support deferred contexts", device);
        }
        let context = state.contexts.insert(SoftContext { device: key, deferred: true, recorded: Vec::new() });
        let handle = DeviceContextHandle(to_raw(context));
        losgap_debug!(LOG_SOURCE, "Created deferred context {}", handle);
        Ok(handle)
    }

    fn release_context(&self, context: DeviceContextHandle) -> Result<()> {
        let mut state = self.state();
        match state.contexts.remove(from_raw(context.0)) {
            Some(released) => {
                if !released.recorded.is_empty() {
                    losgap_debug!(
                        LOG_SOURCE,
                        "Dropping {} unfinished commands of {}",
                        released.recorded.len(),
                        context
                    );
                }
                Ok(())
            }
            None => losgap_bail!(LOG_SOURCE, "Unknown device context {}", context),
        }
    }

    fn finish_command_list(&self, context: DeviceContextHandle) -> Result<CommandListHandle> {
        let mut state = self.state();
        let Some(deferred) = state.contexts.get_mut(from_raw(context.0)) else {
            losgap_bail!(LOG_SOURCE, "Unknown device context {}", context);
        };
        if !deferred.deferred {
            losgap_bail!(LOG_SOURCE, "Can not finish a command list on immediate context {}", context);
        }
        let commands = std::mem::take(&mut deferred.recorded);
        let device = deferred.device;
        let count = commands.len();
        let list = state.command_lists.insert(SoftCommandList { device, commands });
        let handle = CommandListHandle(to_raw(list));
        losgap_trace!(LOG_SOURCE, "Finished {} with {} commands", handle, count);
        Ok(handle)
    }

    fn execute_command_list(
        &self,
        immediate_context: DeviceContextHandle,
        command_list: CommandListHandle,
    ) -> Result<()> {
        let mut state = self.state();
        let context = state.context(immediate_context)?;
        if context.deferred {
            losgap_bail!(LOG_SOURCE, "Command lists execute on the immediate context, not {}", immediate_context);
        }
        let device = context.device;
        let Some(list) = state.command_lists.remove(from_raw(command_list.0)) else {
            losgap_bail!(LOG_SOURCE, "Unknown command list {}", command_list);
        };
        if list.device != device {
            losgap_bail!(LOG_SOURCE, "{} was recorded for another device", command_list);
        }
        losgap_trace!(LOG_SOURCE, "Executing {} ({} commands)", command_list, list.commands.len());
        for command in &list.commands {
            command.apply(&mut state.resources)?;
        }
        Ok(())
    }

    // ===== RESOURCES =====

    fn create_buffer(
        &self,
        device: DeviceHandle,
        desc: &BufferDesc,
        initial_data: Option<&[u8]>,
    ) -> Result<ResourceHandle> {
        let resource = SoftResource::new_buffer(desc, initial_data)?;
        let mut state = self.state();
        state.require_device(device)?;
        let handle = ResourceHandle(to_raw(state.resources.insert(resource)));
        losgap_trace!(LOG_SOURCE, "Created {:?} buffer {} ({} bytes)", desc.kind, handle, desc.size_bytes);
        Ok(handle)
    }

    fn create_texture(
        &self,
        device: DeviceHandle,
        desc: &TextureDesc,
        initial_data: Option<TextureInitialData<'_>>,
    ) -> Result<ResourceHandle> {
        let resource = SoftResource::new_texture(desc, initial_data)?;
        let mut state = self.state();
        state.require_device(device)?;
        let handle = ResourceHandle(to_raw(state.resources.insert(resource)));
        losgap_trace!(
            LOG_SOURCE,
            "Created {:?} texture {} ({}x{}x{}, {} slices, {} mips, {})",
            desc.dimension,
            handle,
            desc.width,
            desc.height,
            desc.depth,
            desc.array_size,
            desc.num_mips,
            desc.format
        );
        Ok(handle)
    }

    fn release_resource(&self, resource: ResourceHandle) -> Result<()> {
        let mut state = self.state();
        if state.resources.remove(from_raw(resource.0)).is_none() {
            losgap_bail!(LOG_SOURCE, "Unknown resource {}", resource);
        }
        losgap_trace!(LOG_SOURCE, "Released resource {}", resource);
        Ok(())
    }

    fn live_resource_count(&self) -> usize {
        self.state().resources.len()
    }

    // ===== DATA TRANSFER =====

    fn map_subresource(
        &self,
        context: DeviceContextHandle,
        resource: ResourceHandle,
        subresource: u32,
        mode: MapMode,
        access: &mut dyn FnMut(MappedSubresource<'_>),
    ) -> Result<()> {
        // Work on a copy so the callback runs without holding the state lock
        let (deferred, mut snapshot) = {
            let state = self.state();
            let deferred = state.context(context)?.deferred;
            let target = state.resource(resource)?;
            if !map_allowed(target.usage, mode) {
                losgap_bail!(LOG_SOURCE, "Can not map {} ({:?}) with {:?}", resource, target.usage, mode);
            }
            if deferred && mode != MapMode::WriteDiscard {
                losgap_bail!(LOG_SOURCE, "Deferred context {} only supports write-discard maps", context);
            }
            (deferred, target.subresource(subresource)?.clone())
        };

        let (row_pitch, depth_pitch) = (snapshot.row_pitch(), snapshot.depth_pitch());
        access(MappedSubresource { data: &mut snapshot.data, row_pitch, depth_pitch });

        if mode == MapMode::Read {
            return Ok(());
        }
        let command = SoftCommand::ReplaceSubresource {
            resource: from_raw(resource.0),
            subresource,
            data: snapshot.data,
        };
        let mut state = self.state();
        if deferred {
            state.submit(context, command)
        } else {
            command.apply(&mut state.resources)
        }
    }

    fn update_subresource_region(
        &self,
        context: DeviceContextHandle,
        resource: ResourceHandle,
        subresource: u32,
        region: &SubresourceBox,
        data: &[u8],
        row_pitch: u32,
        depth_pitch: u32,
    ) -> Result<()> {
        let mut state = self.state();
        let target = state.resource(resource)?;
        if target.usage != ResourceUsage::Write {
            losgap_bail!(LOG_SOURCE, "Can not update {} with usage {:?}", resource, target.usage);
        }
        let extent = target.subresource(subresource)?;
        if !region.fits_within(extent.width, extent.height, extent.depth) {
            return Err(Error::InvalidArgument(format!(
                "Update region {} outside of subresource {} of {}.", region, subresource, resource
            )));
        }
        state.submit(context, SoftCommand::UpdateRegion {
            resource: from_raw(resource.0),
            subresource,
            region: *region,
            data: data.to_vec(),
            row_pitch,
            depth_pitch,
        })
    }

    fn copy_resource(
        &self,
        context: DeviceContextHandle,
        source: ResourceHandle,
        destination: ResourceHandle,
    ) -> Result<()> {
        let mut state = self.state();
        if source == destination {
            losgap_bail!(LOG_SOURCE, "Can not copy {} onto itself", source);
        }
        if !state.resource(source)?.layout_matches(state.resource(destination)?) {
            losgap_bail!(LOG_SOURCE, "Can not copy {} to {}: layouts differ", source, destination);
        }
        state.submit(context, SoftCommand::CopyResource {
            source: from_raw(source.0),
            destination: from_raw(destination.0),
        })
    }

    fn copy_subresource_region(&self, context: DeviceContextHandle, copy: &SubresourceCopy) -> Result<()> {
        let mut state = self.state();
        let source = state.resource(copy.source)?;
        let destination = state.resource(copy.destination)?;
        if source.texel_size() != destination.texel_size() {
            losgap_bail!(
                LOG_SOURCE,
                "Can not copy between {} and {}: texel sizes differ",
                copy.source,
                copy.destination
            );
        }
        source.subresource(copy.source_subresource)?;
        destination.subresource(copy.destination_subresource)?;
        state.submit(context, SoftCommand::CopySubresourceRegion {
            source: from_raw(copy.source.0),
            source_subresource: copy.source_subresource,
            region: copy.region,
            destination: from_raw(copy.destination.0),
            destination_subresource: copy.destination_subresource,
            destination_offset: copy.destination_offset,
        })
    }

    // ===== VIEWS =====

    fn create_view(
        &self,
        device: DeviceHandle,
        resource: ResourceHandle,
        desc: &ViewDesc,
    ) -> Result<ResourceViewHandle> {
        let mut state = self.state();
        state.require_device(device)?;
        let is_buffer = state.resource(resource)?.kind == SoftResourceKind::Buffer;
        let buffer_view = matches!(
            desc,
            ViewDesc::ShaderResource(ShaderResourceRange::Buffer { .. })
                | ViewDesc::UnorderedAccess(UnorderedAccessRange::Buffer { .. })
        );
        if is_buffer != buffer_view {
            losgap_bail!(LOG_SOURCE, "View {:?} does not fit resource {}", desc, resource);
        }
        let view = state.views.insert(SoftView { resource: from_raw(resource.0), desc: *desc });
        Ok(ResourceViewHandle(to_raw(view)))
    }

    fn release_view(&self, view: ResourceViewHandle) -> Result<()> {
        let mut state = self.state();
        if state.views.remove(from_raw(view.0)).is_none() {
            losgap_bail!(LOG_SOURCE, "Unknown view {}", view);
        }
        Ok(())
    }

    fn generate_mips(&self, context: DeviceContextHandle, view: ResourceViewHandle) -> Result<()> {
        let mut state = self.state();
        let Some(target) = state.views.get(from_raw(view.0)) else {
            losgap_bail!(LOG_SOURCE, "Unknown view {}", view);
        };
        let (resource, desc) = (target.resource, target.desc);
        let (mip_generation_target, array_size) = match state.resources.get(resource).map(|texture| texture.kind) {
            Some(SoftResourceKind::Texture { mip_generation_target, array_size, .. }) => {
                (mip_generation_target, array_size)
            }
            _ => losgap_bail!(LOG_SOURCE, "{} does not view a live texture", view),
        };
        if !mip_generation_target {
            losgap_bail!(LOG_SOURCE, "{} views a texture that is not a mip generation target", view);
        }

        let command = match desc {
            ViewDesc::ShaderResource(ShaderResourceRange::Texture { first_mip, num_mips }) => SoftCommand::GenerateMips {
                resource,
                first_mip,
                num_mips,
                first_slice: 0,
                num_slices: array_size,
            },
            ViewDesc::ShaderResource(ShaderResourceRange::TextureArray {
                first_mip,
                num_mips,
                first_array_index,
                num_array_elements,
            }) => SoftCommand::GenerateMips {
                resource,
                first_mip,
                num_mips,
                first_slice: first_array_index,
                num_slices: num_array_elements,
            },
            _ => losgap_bail!(LOG_SOURCE, "Mips are generated through a texture shader resource view, not {}", view),
        };
        state.submit(context, command)
    }
}

#[cfg(test)]
#[path = "soft_backend_tests.rs"]
mod tests;
