//! Rendering module configuration

/// Configuration passed to [`RenderingModule::new`](crate::device::RenderingModule::new)
#[derive(Debug, Clone)]
pub struct RenderingConfig {
    /// Enable the validation layer (range and precondition assurances).
    ///
    /// Usage violations and invalid arguments are reported regardless of this flag.
    pub enable_assurances: bool,
    /// Application name (logged when the module starts)
    pub app_name: String,
    /// Log a warning when a resource is dropped without being disposed first
    pub warn_on_undisposed_drop: bool,
}

impl Default for RenderingConfig {
    fn default() -> Self {
        Self {
            enable_assurances: cfg!(debug_assertions),
            app_name: "LOSGAP Application".to_string(),
            warn_on_undisposed_drop: true,
        }
    }
}
