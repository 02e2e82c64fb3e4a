/// Windows presenting the module's output

/// A window that must be closed before the device is torn down
///
/// Window management itself lives outside this crate; the rendering module only
/// keeps track of open windows so it can close them first during shutdown.
pub trait OutputWindow: Send + Sync {
    /// Title used in shutdown logs
    fn title(&self) -> String;

    /// Close the window and release its swap chain
    fn close(&self);
}
