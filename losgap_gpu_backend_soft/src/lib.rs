/*!
# LOSGAP GPU - Software Backend

CPU-memory implementation of the `losgap_gpu` graphics backend.

Every buffer and texture is stored as plain bytes in system memory, so the
resource layer can be driven end to end (creation, mapping, copies, mip
generation, deferred command lists) on machines without a GPU.

The simulated hardware and multithreading support come from
[`SoftBackendConfig`].
*/

mod soft_config;
mod soft_storage;
mod soft_commands;
mod soft_mipgen;
mod soft_backend;

pub use soft_backend::SoftBackend;
pub use soft_config::{SoftBackendConfig, default_gpu};
