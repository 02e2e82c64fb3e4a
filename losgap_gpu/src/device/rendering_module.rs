/// Rendering module: device lifecycle and per-thread context assignment
///
/// The module owns the native device (created lazily), the hardware selection,
/// the immediate context used by the master thread and one deferred context per
/// worker thread. Every shared-state mutation goes through the module's
/// [`StateMutationBarrier`].

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, Weak};
use std::thread::{self, ThreadId};
use rustc_hash::FxHashMap;
use crate::backend::{GraphicsBackend, DeviceHandle, DeviceContextHandle, CommandListHandle, ResourceHandle};
use crate::config::RenderingConfig;
use crate::device::{StateMutationBarrier, OutputWindow};
use crate::error::{Error, Result};
use crate::hardware::{GraphicsProcessingUnit, OutputDisplay, HardwareSelection, recommended_hardware};
use crate::resource::ResourceCore;
use crate::validation::Validation;

const LOG_SOURCE: &str = "losgap::RenderingModule";

/// Lifecycle of the rendering module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleState {
    /// No device yet
    Uninitialized,
    /// Device created, system not started
    DeviceCreated,
    Running,
    ShuttingDown,
    /// Device and contexts released; terminal
    Disposed,
}

impl fmt::Display for ModuleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy)]
struct LiveDevice {
    device: DeviceHandle,
    immediate_context: DeviceContextHandle,
    supports_multithreading: bool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owner of the native device and its contexts
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use losgap_gpu::losgap::{RenderingModule, RenderingConfig, backend::GraphicsBackend};
/// use losgap_gpu::losgap::resource::Resource;
///
/// fn run(backend: Arc<dyn GraphicsBackend>) -> losgap_gpu::losgap::Result<()> {
///     let module = RenderingModule::new(backend, RenderingConfig::default())?;
///     module.start()?;
///     let buffer = module.new_buffer::<u32>().with_initial_data(&[1, 2, 3]).create()?;
///     buffer.dispose()?;
///     module.shutdown()
/// }
/// ```
pub struct RenderingModule {
    backend: Arc<dyn GraphicsBackend>,
    config: RenderingConfig,
    validation: Validation,
    master_thread: ThreadId,
    installed_gpus: Vec<GraphicsProcessingUnit>,
    barrier: StateMutationBarrier,
    state: Mutex<ModuleState>,
    /// Hardware selection; also the lock combined with device-creation permits
    selection: Mutex<Option<HardwareSelection>>,
    device: RwLock<Option<LiveDevice>>,
    /// Deferred context of every worker thread that asked for one
    thread_contexts: RwLock<FxHashMap<ThreadId, DeviceContextHandle>>,
    /// Every context ever handed out, released at shutdown
    all_contexts: Mutex<Vec<DeviceContextHandle>>,
    windows: Mutex<Vec<Arc<dyn OutputWindow>>>,
    dynamic_detail_textures: Mutex<Vec<Weak<ResourceCore>>>,
}

impl RenderingModule {
    /// Create the module and take the hardware snapshot
    ///
    /// The calling thread becomes the master thread. No device is created yet.
    pub fn new(backend: Arc<dyn GraphicsBackend>, config: RenderingConfig) -> Result<Arc<Self>> {
        let installed_gpus = backend.enumerate_hardware().map_err(|e| {
            crate::losgap_error!(LOG_SOURCE, "Hardware enumeration failed: {}", e);
            e
        })?;

        crate::losgap_info!(
            LOG_SOURCE,
            "Backend '{}' reports {} GPU(s)",
            backend.name(),
            installed_gpus.len()
        );
        for gpu in &installed_gpus {
            crate::losgap_debug!(LOG_SOURCE, "GPU {}: {}", gpu.index, gpu);
            for output in &gpu.outputs {
                crate::losgap_debug!(LOG_SOURCE, "    Output {}: {}", output.index, output);
            }
        }

        Ok(Arc::new(Self {
            backend,
            validation: Validation::new(config.enable_assurances),
            config,
            master_thread: thread::current().id(),
            installed_gpus,
            barrier: StateMutationBarrier::new(),
            state: Mutex::new(ModuleState::Uninitialized),
            selection: Mutex::new(None),
            device: RwLock::new(None),
            thread_contexts: RwLock::new(FxHashMap::default()),
            all_contexts: Mutex::new(Vec::new()),
            windows: Mutex::new(Vec::new()),
            dynamic_detail_textures: Mutex::new(Vec::new()),
        }))
    }

    // ===== ACCESSORS =====

    pub fn config(&self) -> &RenderingConfig {
        &self.config
    }

    pub fn validation(&self) -> Validation {
        self.validation
    }

    pub fn backend(&self) -> &dyn GraphicsBackend {
        self.backend.as_ref()
    }

    pub fn barrier(&self) -> &StateMutationBarrier {
        &self.barrier
    }

    pub fn state(&self) -> ModuleState {
        *lock(&self.state)
    }

    pub fn is_running(&self) -> bool {
        self.state() == ModuleState::Running
    }

    pub fn master_thread(&self) -> ThreadId {
        self.master_thread
    }

    pub fn is_master_thread(&self) -> bool {
        thread::current().id() == self.master_thread
    }

    pub fn installed_gpus(&self) -> &[GraphicsProcessingUnit] {
        &self.installed_gpus
    }

    /// Resources created through the backend and not yet released
    pub fn live_resource_count(&self) -> usize {
        self.backend.live_resource_count()
    }

    fn require_master(&self, operation: &str) -> Result<()> {
        if self.is_master_thread() {
            return Ok(());
        }
        Err(Error::InvalidOperation(format!("Only the master thread may {}.", operation)))
    }

    fn require_not_torn_down(&self) -> Result<()> {
        match self.state() {
            ModuleState::ShuttingDown | ModuleState::Disposed => Err(Error::InvalidOperation(
                "The rendering module has been shut down.".to_string()
            )),
            _ => Ok(()),
        }
    }

    // ===== HARDWARE SELECTION =====

    /// Select the rendering GPU and the display output
    ///
    /// Only legal while the module is not running. The selection applies the
    /// next time the device is created.
    pub fn set_hardware(&self, gpu_index: usize, output_gpu_index: usize, output_index: usize) -> Result<()> {
        if self.is_running() {
            return Err(Error::InvalidOperation(
                "Can not set hardware while the system is running.".to_string()
            ));
        }
        self.require_not_torn_down()?;

        let gpu = self.installed_gpus.get(gpu_index).ok_or_else(|| Error::InvalidArgument(
            format!("GPU index {} out of range ({} installed).", gpu_index, self.installed_gpus.len())
        ))?;
        let output_gpu = self.installed_gpus.get(output_gpu_index).ok_or_else(|| Error::InvalidArgument(
            format!("Output GPU index {} out of range ({} installed).", output_gpu_index, self.installed_gpus.len())
        ))?;
        let output = output_gpu.outputs.get(output_index).ok_or_else(|| Error::InvalidArgument(
            format!("Output index {} out of range ({} outputs on '{}').", output_index, output_gpu.outputs.len(), output_gpu.description)
        ))?;

        let mut selection = self.barrier.acquire_permit_with_lock(&self.selection)?;
        *selection = Some(HardwareSelection { gpu_index, output_gpu_index, output_index });

        crate::losgap_info!(
            LOG_SOURCE,
            "Hardware set: rendering on '{}', displaying on '{}' via '{}'",
            gpu.description,
            output.name,
            output_gpu.description
        );
        Ok(())
    }

    /// Current selection, computing the recommended one on first use
    ///
    /// The first resolution stores the selection, so it holds a mutation permit.
    pub fn hardware_selection(&self) -> Result<HardwareSelection> {
        let mut selection = self.barrier.acquire_permit_with_lock(&self.selection)?;
        Self::resolve_selection(&mut selection, &self.installed_gpus)
    }

    fn resolve_selection(
        selection: &mut Option<HardwareSelection>,
        gpus: &[GraphicsProcessingUnit],
    ) -> Result<HardwareSelection> {
        if let Some(current) = *selection {
            return Ok(current);
        }
        let recommended = recommended_hardware(gpus)?;
        *selection = Some(recommended);
        Ok(recommended)
    }

    fn gpu_at(&self, index: usize) -> Result<&GraphicsProcessingUnit> {
        self.installed_gpus.get(index).ok_or_else(|| Error::HardwareEnumeration(
            format!("GPU index {} does not match the hardware snapshot.", index)
        ))
    }

    pub fn selected_gpu(&self) -> Result<&GraphicsProcessingUnit> {
        self.gpu_at(self.hardware_selection()?.gpu_index)
    }

    pub fn selected_output_gpu(&self) -> Result<&GraphicsProcessingUnit> {
        self.gpu_at(self.hardware_selection()?.output_gpu_index)
    }

    pub fn selected_output_display(&self) -> Result<&OutputDisplay> {
        let selection = self.hardware_selection()?;
        self.gpu_at(selection.output_gpu_index)?
            .outputs
            .get(selection.output_index)
            .ok_or_else(|| Error::HardwareEnumeration(
                format!("Output index {} does not match the hardware snapshot.", selection.output_index)
            ))
    }

    // ===== DEVICE =====

    fn live_device(&self) -> Result<LiveDevice> {
        if let Some(live) = *self.device.read().unwrap_or_else(PoisonError::into_inner) {
            return Ok(live);
        }
        self.require_not_torn_down()?;

        let mut selection = self.barrier.acquire_permit_with_lock(&self.selection)?;
        let mut device = self.device.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(live) = *device {
            return Ok(live);
        }

        let selection = Self::resolve_selection(&mut selection, &self.installed_gpus)?;
        crate::losgap_debug!(
            LOG_SOURCE,
            "Creating device on GPU {} (output {} of GPU {})",
            selection.gpu_index,
            selection.output_index,
            selection.output_gpu_index
        );

        let created = self.backend.create_device(&selection).map_err(|e| {
            crate::losgap_error!(LOG_SOURCE, "Device creation failed: {}", e);
            e
        })?;
        let immediate_context = match self.backend.immediate_context(created.device) {
            Ok(context) => context,
            Err(e) => {
                crate::losgap_error!(LOG_SOURCE, "Could not acquire the immediate context: {}", e);
                let _ = self.backend.release_device(created.device);
                return Err(e);
            }
        };

        if !created.supports_multithreading {
            crate::losgap_warn!(
                LOG_SOURCE,
                "Device does not support multithreaded command lists; rendering performance will be degraded"
            );
        }

        let live = LiveDevice {
            device: created.device,
            immediate_context,
            supports_multithreading: created.supports_multithreading,
        };
        *device = Some(live);
        lock(&self.all_contexts).push(immediate_context);

        let mut state = lock(&self.state);
        if *state == ModuleState::Uninitialized {
            *state = ModuleState::DeviceCreated;
        }
        crate::losgap_info!(LOG_SOURCE, "Device {} created", created.device);

        Ok(live)
    }

    /// The native device, created on first access
    pub fn device(&self) -> Result<DeviceHandle> {
        Ok(self.live_device()?.device)
    }

    /// Whether the device supports deferred contexts (creates the device if needed)
    pub fn supports_multithreaded_rendering(&self) -> Result<bool> {
        Ok(self.live_device()?.supports_multithreading)
    }

    /// Context for the calling thread
    ///
    /// The master thread always receives the immediate context. Other threads
    /// receive their own deferred context, created on first request and kept
    /// until shutdown.
    pub fn device_context(&self) -> Result<DeviceContextHandle> {
        let live = self.live_device()?;
        if self.is_master_thread() {
            return Ok(live.immediate_context);
        }

        let current = thread::current().id();
        if let Some(context) = self.thread_contexts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&current)
        {
            return Ok(*context);
        }

        if !live.supports_multithreading {
            return Err(Error::InvalidOperation(
                "Deferred contexts are unavailable: the device does not support multithreaded rendering.".to_string()
            ));
        }
        self.require_not_torn_down()?;

        let _permit = self.barrier.acquire_permit()?;
        let mut contexts = self.thread_contexts.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(context) = contexts.get(&current) {
            return Ok(*context);
        }

        let context = self.backend.create_deferred_context(live.device)?;
        contexts.insert(current, context);
        lock(&self.all_contexts).push(context);
        crate::losgap_debug!(LOG_SOURCE, "Created deferred context {} for thread {:?}", context, current);

        Ok(context)
    }

    // ===== COMMAND LISTS =====

    /// Close the calling worker thread's recorded commands into a command list
    pub fn finish_command_list(&self) -> Result<CommandListHandle> {
        if self.is_master_thread() {
            return Err(Error::InvalidOperation(
                "The master thread records directly on the immediate context.".to_string()
            ));
        }
        let context = self.device_context()?;
        self.backend.finish_command_list(context)
    }

    /// Execute a worker's command list on the immediate context
    ///
    /// Mutations are frozen for the duration of the submission.
    pub fn execute_command_list(&self, command_list: CommandListHandle) -> Result<()> {
        self.require_master("execute command lists")?;
        let live = self.live_device()?;
        let _frozen = self.barrier.freeze_mutations()?;
        self.backend.execute_command_list(live.immediate_context, command_list)
    }

    // ===== LIFECYCLE =====

    /// Create the device if needed and enter the running state
    pub fn start(&self) -> Result<()> {
        self.require_master("start the rendering module")?;
        if self.is_running() {
            return Err(Error::InvalidOperation("The rendering module is already running.".to_string()));
        }
        self.require_not_torn_down()?;

        self.live_device()?;
        *lock(&self.state) = ModuleState::Running;

        let gpu = self.selected_gpu()?;
        crate::losgap_info!(LOG_SOURCE, "'{}' started rendering on '{}'", self.config.app_name, gpu.description);
        Ok(())
    }

    /// Register a window to close before the device is torn down
    pub fn track_window(&self, window: Arc<dyn OutputWindow>) {
        lock(&self.windows).push(window);
    }

    /// Tear down windows, contexts and the device, in that order
    ///
    /// Only the master thread may shut down. Repeated calls are no-ops.
    pub fn shutdown(&self) -> Result<()> {
        self.require_master("shut down the rendering module")?;
        {
            let mut state = lock(&self.state);
            if matches!(*state, ModuleState::ShuttingDown | ModuleState::Disposed) {
                return Ok(());
            }
            *state = ModuleState::ShuttingDown;
        }

        let frozen = self.barrier.freeze_mutations()?;
        let result = self.release_everything();
        drop(frozen);

        *lock(&self.state) = ModuleState::Disposed;
        crate::losgap_info!(LOG_SOURCE, "Rendering module shut down");
        result
    }

    /// Release windows, contexts and device; keeps going after failures and
    /// reports the first one
    fn release_everything(&self) -> Result<()> {
        let mut first_error: Option<Error> = None;

        let windows: Vec<_> = lock(&self.windows).drain(..).collect();
        crate::losgap_debug!(LOG_SOURCE, "Closing {} window(s)", windows.len());
        for window in windows {
            crate::losgap_debug!(LOG_SOURCE, "Closing window '{}'", window.title());
            window.close();
        }

        let contexts: Vec<_> = lock(&self.all_contexts).drain(..).collect();
        crate::losgap_debug!(LOG_SOURCE, "Releasing {} device context(s)", contexts.len());
        for context in contexts {
            if let Err(e) = self.backend.release_context(context) {
                crate::losgap_error!(LOG_SOURCE, "Failed to release context {}: {}", context, e);
                first_error.get_or_insert(e);
            }
        }
        self.thread_contexts.write().unwrap_or_else(PoisonError::into_inner).clear();

        let released = self.device.write().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(live) = released {
            crate::losgap_debug!(LOG_SOURCE, "Releasing device {}", live.device);
            if let Err(e) = self.backend.release_device(live.device) {
                crate::losgap_error!(LOG_SOURCE, "Failed to release device {}: {}", live.device, e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    // ===== DYNAMIC DETAIL =====

    pub(crate) fn register_dynamic_detail_texture(&self, core: &Arc<ResourceCore>) {
        let mut textures = lock(&self.dynamic_detail_textures);
        textures.retain(|weak| weak.strong_count() > 0);
        textures.push(Arc::downgrade(core));
    }

    /// Live (created and not disposed) textures flagged for dynamic detail
    pub fn dynamic_detail_textures(&self) -> Vec<ResourceHandle> {
        lock(&self.dynamic_detail_textures)
            .iter()
            .filter_map(Weak::upgrade)
            .filter(|core| !core.is_disposed())
            .map(|core| core.handle())
            .collect()
    }
}

impl Drop for RenderingModule {
    fn drop(&mut self) {
        let state = *lock(&self.state);
        if state != ModuleState::Disposed && self.device.get_mut().map_or(false, |d| d.is_some()) {
            crate::losgap_warn!(LOG_SOURCE, "Rendering module dropped without shutdown; releasing device");
            let _ = self.release_everything();
        }
    }
}

#[cfg(test)]
#[path = "rendering_module_tests.rs"]
mod tests;
