//! Owned N-dimensional texel arrays returned by texture reads
//!
//! Indexing: `[u]` for 1D, `[(u, v)]` for 2D with flat index `v * width + u`,
//! `[(u, v, w)]` for 3D with flat index `w * width * height + v * width + u`.

use std::ops::{Index, IndexMut};

/// One-dimensional texel array
#[derive(Debug, Clone, PartialEq)]
pub struct TexelArray1D<T> {
    data: Vec<T>,
}

impl<T> TexelArray1D<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self { data }
    }

    pub fn width(&self) -> u32 {
        self.data.len() as u32
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}

impl<T> Index<u32> for TexelArray1D<T> {
    type Output = T;

    fn index(&self, u: u32) -> &T {
        &self.data[u as usize]
    }
}

impl<T> IndexMut<u32> for TexelArray1D<T> {
    fn index_mut(&mut self, u: u32) -> &mut T {
        &mut self.data[u as usize]
    }
}

/// Two-dimensional texel array, row-major
#[derive(Debug, Clone, PartialEq)]
pub struct TexelArray2D<T> {
    data: Vec<T>,
    width: u32,
    height: u32,
}

impl<T> TexelArray2D<T> {
    /// Wrap `data`; its length must be `width * height`
    pub fn new(data: Vec<T>, width: u32, height: u32) -> Self {
        assert_eq!(data.len(), width as usize * height as usize, "texel count does not match dimensions");
        Self { data, width, height }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn flat_index(&self, u: u32, v: u32) -> usize {
        debug_assert!(u < self.width && v < self.height, "({}, {}) outside {}x{}", u, v, self.width, self.height);
        v as usize * self.width as usize + u as usize
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}

impl<T> Index<(u32, u32)> for TexelArray2D<T> {
    type Output = T;

    fn index(&self, (u, v): (u32, u32)) -> &T {
        &self.data[self.flat_index(u, v)]
    }
}

impl<T> IndexMut<(u32, u32)> for TexelArray2D<T> {
    fn index_mut(&mut self, (u, v): (u32, u32)) -> &mut T {
        let index = self.flat_index(u, v);
        &mut self.data[index]
    }
}

/// Three-dimensional texel array, slice-major then row-major
#[derive(Debug, Clone, PartialEq)]
pub struct TexelArray3D<T> {
    data: Vec<T>,
    width: u32,
    height: u32,
    depth: u32,
}

impl<T> TexelArray3D<T> {
    /// Wrap `data`; its length must be a multiple of `width * height`
    pub fn new(data: Vec<T>, width: u32, height: u32) -> Self {
        let slice = width as usize * height as usize;
        assert!(slice > 0 && data.len() % slice == 0, "texel count does not match dimensions");
        let depth = (data.len() / slice) as u32;
        Self { data, width, height, depth }
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

    pub fn flat_index(&self, u: u32, v: u32, w: u32) -> usize {
        debug_assert!(
            u < self.width && v < self.height && w < self.depth,
            "({}, {}, {}) outside {}x{}x{}", u, v, w, self.width, self.height, self.depth
        );
        w as usize * (self.width as usize * self.height as usize)
            + v as usize * self.width as usize
            + u as usize
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}

impl<T> Index<(u32, u32, u32)> for TexelArray3D<T> {
    type Output = T;

    fn index(&self, (u, v, w): (u32, u32, u32)) -> &T {
        &self.data[self.flat_index(u, v, w)]
    }
}

impl<T> IndexMut<(u32, u32, u32)> for TexelArray3D<T> {
    fn index_mut(&mut self, (u, v, w): (u32, u32, u32)) -> &mut T {
        let index = self.flat_index(u, v, w);
        &mut self.data[index]
    }
}
