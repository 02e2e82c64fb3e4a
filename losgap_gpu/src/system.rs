/// LOSGAP system singleton
///
/// Global access point for the current rendering module and the logger. The
/// rendering module itself is an ordinary value; the system only keeps the
/// process-wide instance so that subsystems can find it.

use std::sync::{Arc, OnceLock, RwLock};
use std::time::SystemTime;
use crate::backend::GraphicsBackend;
use crate::config::RenderingConfig;
use crate::device::RenderingModule;
use crate::error::{Error, Result};
use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};

// ===== INTERNAL STATE =====

/// Global system state storage
static SYSTEM_STATE: OnceLock<SystemState> = OnceLock::new();

/// Global logger (initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

struct SystemState {
    rendering_module: RwLock<Option<Arc<RenderingModule>>>,
}

impl SystemState {
    fn new() -> Self {
        Self {
            rendering_module: RwLock::new(None),
        }
    }
}

fn logger() -> &'static RwLock<Box<dyn Logger>> {
    LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)))
}

// ===== PUBLIC API =====

/// Process-wide system manager
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use losgap_gpu::losgap::{LosgapSystem, RenderingConfig, backend::GraphicsBackend};
///
/// fn boot(backend: Arc<dyn GraphicsBackend>) -> losgap_gpu::losgap::Result<()> {
///     LosgapSystem::initialize()?;
///     let module = LosgapSystem::create_rendering_module(backend, RenderingConfig::default())?;
///     module.start()?;
///     // ...
///     LosgapSystem::shutdown()
/// }
/// ```
pub struct LosgapSystem;

impl LosgapSystem {
    /// Log an error before handing it back to the caller
    fn log_and_return_error(error: Error) -> Error {
        crate::losgap_error!("losgap::System", "{}", error);
        error
    }

    fn state() -> Result<&'static SystemState> {
        SYSTEM_STATE.get().ok_or_else(|| Self::log_and_return_error(
            Error::InitializationFailed("System not initialized. Call LosgapSystem::initialize() first.".to_string())
        ))
    }

    /// Initialize the system (idempotent)
    pub fn initialize() -> Result<()> {
        SYSTEM_STATE.get_or_init(SystemState::new);
        Ok(())
    }

    /// Create the rendering module and register it as the global instance
    ///
    /// # Errors
    ///
    /// Fails if the system is not initialized, if a module is already
    /// registered, or if hardware enumeration fails.
    pub fn create_rendering_module(
        backend: Arc<dyn GraphicsBackend>,
        config: RenderingConfig,
    ) -> Result<Arc<RenderingModule>> {
        let state = Self::state()?;
        let mut slot = state.rendering_module.write().map_err(|_| Self::log_and_return_error(
            Error::BackendError("Rendering module lock poisoned".to_string())
        ))?;

        if slot.is_some() {
            return Err(Self::log_and_return_error(Error::InitializationFailed(
                "Rendering module already exists. Call LosgapSystem::shutdown() first.".to_string()
            )));
        }

        let module = RenderingModule::new(backend, config)?;
        *slot = Some(Arc::clone(&module));
        crate::losgap_info!("losgap::System", "Rendering module registered");
        Ok(module)
    }

    /// The registered rendering module
    pub fn rendering_module() -> Result<Arc<RenderingModule>> {
        let state = Self::state()?;
        let slot = state.rendering_module.read().map_err(|_| Self::log_and_return_error(
            Error::BackendError("Rendering module lock poisoned".to_string())
        ))?;
        slot.clone().ok_or_else(|| Self::log_and_return_error(Error::InitializationFailed(
            "Rendering module not created. Call LosgapSystem::create_rendering_module() first.".to_string()
        )))
    }

    /// Shut down and unregister the rendering module, if any
    pub fn shutdown() -> Result<()> {
        let Some(state) = SYSTEM_STATE.get() else {
            return Ok(());
        };
        let module = match state.rendering_module.write() {
            Ok(mut slot) => slot.take(),
            Err(_) => return Err(Self::log_and_return_error(
                Error::BackendError("Rendering module lock poisoned".to_string())
            )),
        };
        match module {
            Some(module) => module.shutdown(),
            None => Ok(()),
        }
    }

    /// Drop the registered module without shutting it down (test builds only)
    #[cfg(test)]
    pub fn reset_for_testing() {
        if let Some(state) = SYSTEM_STATE.get() {
            if let Ok(mut slot) = state.rendering_module.write() {
                *slot = None;
            }
        }
    }

    // ===== LOGGING API =====

    /// Replace the global logger
    pub fn set_logger<L: Logger + 'static>(logger_impl: L) {
        if let Ok(mut lock) = logger().write() {
            *lock = Box::new(logger_impl);
        }
    }

    /// Restore the default colored console logger
    pub fn reset_logger() {
        if let Ok(mut lock) = logger().write() {
            *lock = Box::new(DefaultLogger);
        }
    }

    /// Log without file:line (used by the `losgap_*!` macros)
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        if let Ok(lock) = logger().read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: None,
                line: None,
            });
        }
    }

    /// Log with file:line (used by `losgap_error!`)
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        if let Ok(lock) = logger().read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: Some(file),
                line: Some(line),
            });
        }
    }
}

#[cfg(test)]
#[path = "system_tests.rs"]
mod tests;
