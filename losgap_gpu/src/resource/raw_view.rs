/// Typed access to mapped subresource memory

use std::marker::PhantomData;
use bytemuck::Pod;

/// Mutable view over a mapped subresource
///
/// Handed to `read_write` callbacks. Mapped memory carries row and depth
/// pitches and no alignment guarantee for `T`, so elements are copied in and
/// out rather than borrowed.
pub struct RawResourceDataView<'a, T: Pod> {
    bytes: &'a mut [u8],
    width: u32,
    height: u32,
    depth: u32,
    row_pitch: usize,
    depth_pitch: usize,
    _marker: PhantomData<T>,
}

impl<'a, T: Pod> RawResourceDataView<'a, T> {
    pub fn new(
        bytes: &'a mut [u8],
        width: u32,
        height: u32,
        depth: u32,
        row_pitch: usize,
        depth_pitch: usize,
    ) -> Self {
        Self { bytes, width, height, depth, row_pitch, depth_pitch, _marker: PhantomData }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Number of addressable elements
    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize * self.depth as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn byte_offset(&self, u: u32, v: u32, w: u32) -> usize {
        assert!(
            u < self.width && v < self.height && w < self.depth,
            "({}, {}, {}) outside mapped region {}x{}x{}", u, v, w, self.width, self.height, self.depth
        );
        w as usize * self.depth_pitch + v as usize * self.row_pitch + u as usize * std::mem::size_of::<T>()
    }

    /// Element `u` of a one-dimensional view
    pub fn get(&self, u: u32) -> T {
        self.get_3d(u, 0, 0)
    }

    pub fn get_2d(&self, u: u32, v: u32) -> T {
        self.get_3d(u, v, 0)
    }

    pub fn get_3d(&self, u: u32, v: u32, w: u32) -> T {
        let offset = self.byte_offset(u, v, w);
        bytemuck::pod_read_unaligned(&self.bytes[offset..offset + std::mem::size_of::<T>()])
    }

    pub fn set(&mut self, u: u32, value: T) {
        self.set_3d(u, 0, 0, value)
    }

    pub fn set_2d(&mut self, u: u32, v: u32, value: T) {
        self.set_3d(u, v, 0, value)
    }

    pub fn set_3d(&mut self, u: u32, v: u32, w: u32, value: T) {
        let offset = self.byte_offset(u, v, w);
        self.bytes[offset..offset + std::mem::size_of::<T>()].copy_from_slice(bytemuck::bytes_of(&value));
    }
}
