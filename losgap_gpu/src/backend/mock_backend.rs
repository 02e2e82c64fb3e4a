/// Mock graphics backend for unit tests (no GPU required)
///
/// Records every backend call by name and hands out fresh handles. It keeps no
/// resource contents: mapped memory is zero-filled on every map.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use rustc_hash::FxHashMap;
use crate::backend::{
    GraphicsBackend, CreatedDevice, DeviceHandle, DeviceContextHandle, ResourceHandle,
    ResourceViewHandle, CommandListHandle, BufferDesc, TextureDesc, TextureInitialData, ViewDesc,
    MapMode, MappedSubresource, SubresourceCopy,
};
use crate::error::Result;
use crate::hardware::{GraphicsProcessingUnit, OutputDisplay, NativeOutputResolution, HardwareSelection};
use crate::resource::{SubresourceBox, texture_utils};
use crate::config::RenderingConfig;
use crate::device::{RenderingModule, OutputWindow};
use std::sync::Arc;

/// Pitches and size of one subresource
#[derive(Debug, Clone, Copy)]
struct SubresourceLayout {
    row_pitch: u32,
    depth_pitch: u32,
    size: usize,
}

pub struct MockBackend {
    calls: Mutex<Vec<String>>,
    next_handle: AtomicU64,
    gpus: Vec<GraphicsProcessingUnit>,
    supports_multithreading: bool,
    fail_next_device_creation: AtomicBool,
    resources: Mutex<FxHashMap<u64, Vec<SubresourceLayout>>>,
    /// Last map mode per resource, for assertions
    map_modes: Mutex<Vec<MapMode>>,
}

impl MockBackend {
    /// One GPU with one primary 1920x1080 output, multithreading supported
    pub fn new() -> Self {
        Self::with_hardware(Self::single_gpu(), true)
    }

    pub fn with_hardware(gpus: Vec<GraphicsProcessingUnit>, supports_multithreading: bool) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            next_handle: AtomicU64::new(1),
            gpus,
            supports_multithreading,
            fail_next_device_creation: AtomicBool::new(false),
            resources: Mutex::new(FxHashMap::default()),
            map_modes: Mutex::new(Vec::new()),
        }
    }

    pub fn single_gpu() -> Vec<GraphicsProcessingUnit> {
        vec![GraphicsProcessingUnit {
            index: 0,
            description: "Mock GPU".to_string(),
            dedicated_video_memory: 1024 * 1024 * 1024,
            dedicated_system_memory: 0,
            shared_system_memory: 0,
            outputs: vec![OutputDisplay {
                index: 0,
                name: "Mock Display".to_string(),
                is_primary_output: true,
                native_resolutions: vec![NativeOutputResolution {
                    index: 0,
                    width: 1920,
                    height: 1080,
                    refresh_rate_numerator: 60,
                    refresh_rate_denominator: 1,
                }],
            }],
        }]
    }

    /// Every call recorded so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|call| call.as_str() == name).count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn map_modes(&self) -> Vec<MapMode> {
        self.map_modes.lock().unwrap().clone()
    }

    pub fn fail_next_device_creation(&self) {
        self.fail_next_device_creation.store(true, Ordering::SeqCst);
    }

    /// Record a call made outside the backend (windows, tests)
    pub fn record(&self, name: &str) {
        self.calls.lock().unwrap().push(name.to_string());
    }

    fn next(&self) -> u64 {
        self.next_handle.fetch_add(1, Ordering::SeqCst)
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    fn enumerate_hardware(&self) -> Result<Vec<GraphicsProcessingUnit>> {
        self.record("enumerate_hardware");
        Ok(self.gpus.clone())
    }

    fn create_device(&self, _selection: &HardwareSelection) -> Result<CreatedDevice> {
        self.record("create_device");
        if self.fail_next_device_creation.swap(false, Ordering::SeqCst) {
            crate::losgap_bail!("losgap::mock", "Injected device creation failure");
        }
        Ok(CreatedDevice {
            device: DeviceHandle(self.next()),
            supports_multithreading: self.supports_multithreading,
        })
    }

    fn release_device(&self, _device: DeviceHandle) -> Result<()> {
        self.record("release_device");
        Ok(())
    }

    fn immediate_context(&self, _device: DeviceHandle) -> Result<DeviceContextHandle> {
        self.record("immediate_context");
        Ok(DeviceContextHandle(self.next()))
    }

    fn create_deferred_context(&self, _device: DeviceHandle) -> Result<DeviceContextHandle> {
        self.record("create_deferred_context");
        Ok(DeviceContextHandle(self.next()))
    }

    fn release_context(&self, _context: DeviceContextHandle) -> Result<()> {
        self.record("release_context");
        Ok(())
    }

    fn finish_command_list(&self, _context: DeviceContextHandle) -> Result<CommandListHandle> {
        self.record("finish_command_list");
        Ok(CommandListHandle(self.next()))
    }

    fn execute_command_list(&self, _immediate: DeviceContextHandle, _list: CommandListHandle) -> Result<()> {
        self.record("execute_command_list");
        Ok(())
    }

    fn create_buffer(&self, _device: DeviceHandle, desc: &BufferDesc, _initial_data: Option<&[u8]>) -> Result<ResourceHandle> {
        self.record("create_buffer");
        let handle = self.next();
        let size = desc.size_bytes as usize;
        let layout = SubresourceLayout { row_pitch: size as u32, depth_pitch: size as u32, size };
        self.resources.lock().unwrap().insert(handle, vec![layout]);
        Ok(ResourceHandle(handle))
    }

    fn create_texture(
        &self,
        _device: DeviceHandle,
        desc: &TextureDesc,
        _initial_data: Option<TextureInitialData<'_>>,
    ) -> Result<ResourceHandle> {
        self.record("create_texture");
        let handle = self.next();
        let texel_size = desc.format.size_bytes();
        let mut layouts = Vec::new();
        for _ in 0..desc.array_size {
            for mip in 0..desc.num_mips.max(1) {
                let width = texture_utils::mip_dimension(desc.width, mip);
                let height = texture_utils::mip_dimension(desc.height, mip);
                let depth = texture_utils::mip_dimension(desc.depth, mip);
                let row_pitch = width * texel_size;
                let depth_pitch = row_pitch * height;
                layouts.push(SubresourceLayout { row_pitch, depth_pitch, size: (depth_pitch * depth) as usize });
            }
        }
        self.resources.lock().unwrap().insert(handle, layouts);
        Ok(ResourceHandle(handle))
    }

    fn release_resource(&self, resource: ResourceHandle) -> Result<()> {
        self.record("release_resource");
        self.resources.lock().unwrap().remove(&resource.0);
        Ok(())
    }

    fn live_resource_count(&self) -> usize {
        self.resources.lock().unwrap().len()
    }

    fn map_subresource(
        &self,
        _context: DeviceContextHandle,
        resource: ResourceHandle,
        subresource: u32,
        mode: MapMode,
        access: &mut dyn FnMut(MappedSubresource<'_>),
    ) -> Result<()> {
        self.record("map_subresource");
        self.map_modes.lock().unwrap().push(mode);
        let layout = self.resources
            .lock()
            .unwrap()
            .get(&resource.0)
            .and_then(|layouts| layouts.get(subresource as usize).copied());
        let Some(layout) = layout else {
            crate::losgap_bail!("losgap::mock", "Unknown subresource {} of {}", subresource, resource);
        };
        let mut memory = vec![0u8; layout.size];
        access(MappedSubresource { data: &mut memory, row_pitch: layout.row_pitch, depth_pitch: layout.depth_pitch });
        Ok(())
    }

    fn update_subresource_region(
        &self,
        _context: DeviceContextHandle,
        _resource: ResourceHandle,
        _subresource: u32,
        _region: &SubresourceBox,
        _data: &[u8],
        _row_pitch: u32,
        _depth_pitch: u32,
    ) -> Result<()> {
        self.record("update_subresource_region");
        Ok(())
    }

    fn copy_resource(&self, _context: DeviceContextHandle, _source: ResourceHandle, _destination: ResourceHandle) -> Result<()> {
        self.record("copy_resource");
        Ok(())
    }

    fn copy_subresource_region(&self, _context: DeviceContextHandle, _copy: &SubresourceCopy) -> Result<()> {
        self.record("copy_subresource_region");
        Ok(())
    }

    fn create_view(&self, _device: DeviceHandle, _resource: ResourceHandle, _desc: &ViewDesc) -> Result<ResourceViewHandle> {
        self.record("create_view");
        Ok(ResourceViewHandle(self.next()))
    }

    fn release_view(&self, _view: ResourceViewHandle) -> Result<()> {
        self.record("release_view");
        Ok(())
    }

    fn generate_mips(&self, _context: DeviceContextHandle, _view: ResourceViewHandle) -> Result<()> {
        self.record("generate_mips");
        Ok(())
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

/// Rendering module over a fresh mock backend, assurances enabled
pub fn test_module() -> (Arc<MockBackend>, Arc<RenderingModule>) {
    test_module_with(MockBackend::new())
}

pub fn test_module_with(backend: MockBackend) -> (Arc<MockBackend>, Arc<RenderingModule>) {
    let backend = Arc::new(backend);
    let config = RenderingConfig {
        enable_assurances: true,
        app_name: "Mock App".to_string(),
        warn_on_undisposed_drop: false,
    };
    let module = RenderingModule::new(backend.clone(), config).unwrap();
    (backend, module)
}

/// Window that records its closing into the backend call log
pub struct MockWindow {
    pub backend: Arc<MockBackend>,
}

impl OutputWindow for MockWindow {
    fn title(&self) -> String {
        "Mock Window".to_string()
    }

    fn close(&self) {
        self.backend.record("close_window");
    }
}
