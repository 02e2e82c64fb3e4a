/// Subresource boxes: axis-aligned regions of a single subresource

use std::fmt;
use std::ops::Range;

/// Region of one subresource, with exclusive upper bounds on every axis.
///
/// For buffers, `u` is measured in bytes. For textures every axis is measured in
/// texels of the addressed mip level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubresourceBox {
    pub u_min: u32,
    pub u_max: u32,
    pub v_min: u32,
    pub v_max: u32,
    pub w_min: u32,
    pub w_max: u32,
}

impl SubresourceBox {
    /// One-dimensional box; `v` and `w` span `0..1`
    pub fn new(u_min: u32, u_max: u32) -> Self {
        Self::new_3d(u_min, u_max, 0, 1, 0, 1)
    }

    /// Two-dimensional box; `w` spans `0..1`
    pub fn new_2d(u_min: u32, u_max: u32, v_min: u32, v_max: u32) -> Self {
        Self::new_3d(u_min, u_max, v_min, v_max, 0, 1)
    }

    pub fn new_3d(u_min: u32, u_max: u32, v_min: u32, v_max: u32, w_min: u32, w_max: u32) -> Self {
        Self { u_min, u_max, v_min, v_max, w_min, w_max }
    }

    pub fn from_ranges(u: Range<u32>, v: Range<u32>, w: Range<u32>) -> Self {
        Self::new_3d(u.start, u.end, v.start, v.end, w.start, w.end)
    }

    /// Box covering a whole `width x height x depth` subresource
    pub fn whole(width: u32, height: u32, depth: u32) -> Self {
        Self::new_3d(0, width, 0, height, 0, depth)
    }

    pub fn width(&self) -> u32 {
        self.u_max.saturating_sub(self.u_min)
    }

    pub fn height(&self) -> u32 {
        self.v_max.saturating_sub(self.v_min)
    }

    pub fn depth(&self) -> u32 {
        self.w_max.saturating_sub(self.w_min)
    }

    pub fn volume(&self) -> u64 {
        self.width() as u64 * self.height() as u64 * self.depth() as u64
    }

    /// True when the box lies inside a `width x height x depth` extent
    /// and is well formed (min <= max on every axis)
    pub fn fits_within(&self, width: u32, height: u32, depth: u32) -> bool {
        self.u_min <= self.u_max && self.u_max <= width
            && self.v_min <= self.v_max && self.v_max <= height
            && self.w_min <= self.w_max && self.w_max <= depth
    }
}

impl fmt::Display for SubresourceBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Box [U {}..{}, V {}..{}, W {}..{}]",
            self.u_min, self.u_max, self.v_min, self.v_max, self.w_min, self.w_max
        )
    }
}
