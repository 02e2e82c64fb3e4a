//! Buffer resources
//!
//! - [`Buffer<T>`]: general purpose, viewable as SRV/UAV
//! - [`ConstantBuffer<T>`]: one shader-constant element
//! - [`VertexBuffer<T>`] and [`IndexBuffer`]: input assembler data

mod buffer_resource;
mod buffer;
mod constant_buffer;
mod vertex_buffer;

pub use buffer_resource::{BufferElement, BufferResource};
pub use buffer::{Buffer, BufferBuilder};
pub use constant_buffer::{ConstantBuffer, ConstantBufferBuilder};
pub use vertex_buffer::{VertexBuffer, VertexBufferBuilder, IndexBuffer, IndexBufferBuilder};

#[cfg(test)]
#[path = "buffer_tests.rs"]
mod tests;
