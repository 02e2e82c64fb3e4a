/// GraphicsBackend trait: the native driver boundary

use crate::error::Result;
use crate::backend::{
    DeviceHandle, DeviceContextHandle, ResourceHandle, ResourceViewHandle, CommandListHandle,
    BufferDesc, TextureDesc, TextureInitialData, ViewDesc, MapMode, MappedSubresource,
    SubresourceCopy,
};
use crate::hardware::{GraphicsProcessingUnit, HardwareSelection};
use crate::resource::SubresourceBox;

/// Result of a successful device creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatedDevice {
    pub device: DeviceHandle,
    /// Whether deferred contexts and command lists are supported natively
    pub supports_multithreading: bool,
}

/// Native graphics backend
///
/// Implemented by concrete drivers (and by the software backend). The
/// rendering module guarantees that:
/// - device-level calls (creation, release) only happen on the master thread
///   under a mutation permit
/// - each context handle is only used from the thread it was handed to
/// - descriptors and regions have already been validated
///
/// Backends must nevertheless be internally thread safe: resources are
/// created from any thread.
pub trait GraphicsBackend: Send + Sync {
    /// Backend name, for logs
    fn name(&self) -> &str;

    // ===== HARDWARE & DEVICE =====

    /// Snapshot of the installed GPUs and their outputs
    fn enumerate_hardware(&self) -> Result<Vec<GraphicsProcessingUnit>>;

    fn create_device(&self, selection: &HardwareSelection) -> Result<CreatedDevice>;

    fn release_device(&self, device: DeviceHandle) -> Result<()>;

    // ===== CONTEXTS =====

    /// The device's single immediate context
    fn immediate_context(&self, device: DeviceHandle) -> Result<DeviceContextHandle>;

    fn create_deferred_context(&self, device: DeviceHandle) -> Result<DeviceContextHandle>;

    fn release_context(&self, context: DeviceContextHandle) -> Result<()>;

    /// Close the commands recorded so far on a deferred context into a command list
    fn finish_command_list(&self, context: DeviceContextHandle) -> Result<CommandListHandle>;

    /// Execute (and consume) a command list on the immediate context
    fn execute_command_list(
        &self,
        immediate_context: DeviceContextHandle,
        command_list: CommandListHandle,
    ) -> Result<()>;

    // ===== RESOURCES =====

    fn create_buffer(
        &self,
        device: DeviceHandle,
        desc: &BufferDesc,
        initial_data: Option<&[u8]>,
    ) -> Result<ResourceHandle>;

    fn create_texture(
        &self,
        device: DeviceHandle,
        desc: &TextureDesc,
        initial_data: Option<TextureInitialData<'_>>,
    ) -> Result<ResourceHandle>;

    fn release_resource(&self, resource: ResourceHandle) -> Result<()>;

    /// Number of resources created and not yet released
    fn live_resource_count(&self) -> usize;

    // ===== DATA TRANSFER =====

    /// Map a subresource, hand its memory to `access`, then unmap
    fn map_subresource(
        &self,
        context: DeviceContextHandle,
        resource: ResourceHandle,
        subresource: u32,
        mode: MapMode,
        access: &mut dyn FnMut(MappedSubresource<'_>),
    ) -> Result<()>;

    /// Overwrite `region` of a subresource with tightly pitched `data`
    fn update_subresource_region(
        &self,
        context: DeviceContextHandle,
        resource: ResourceHandle,
        subresource: u32,
        region: &SubresourceBox,
        data: &[u8],
        row_pitch: u32,
        depth_pitch: u32,
    ) -> Result<()>;

    /// Copy every subresource of `source` into `destination`
    fn copy_resource(
        &self,
        context: DeviceContextHandle,
        source: ResourceHandle,
        destination: ResourceHandle,
    ) -> Result<()>;

    fn copy_subresource_region(&self, context: DeviceContextHandle, copy: &SubresourceCopy) -> Result<()>;

    // ===== VIEWS =====

    fn create_view(
        &self,
        device: DeviceHandle,
        resource: ResourceHandle,
        desc: &ViewDesc,
    ) -> Result<ResourceViewHandle>;

    fn release_view(&self, view: ResourceViewHandle) -> Result<()>;

    /// Regenerate mips 1..N of the viewed texture from mip 0
    fn generate_mips(&self, context: DeviceContextHandle, view: ResourceViewHandle) -> Result<()>;
}
