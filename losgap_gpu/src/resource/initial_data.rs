/// Per-subresource initial data descriptors

use crate::resource::texture_utils::mip_dimension;

/// Location of one subresource's initial data inside a flat upload buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitialResourceDataDesc {
    /// Byte offset from the start of the upload buffer
    pub offset: usize,
    /// Bytes between two consecutive rows
    pub row_stride: u32,
    /// Bytes between two consecutive depth slices
    pub slice_stride: u32,
}

impl InitialResourceDataDesc {
    /// Descriptors for every (array slice, mip) pair, in subresource index order
    ///
    /// The upload buffer holds each slice's full mip chain back to back, mips
    /// packed tightly from largest to smallest.
    pub fn create_data_descs(
        num_textures: u32,
        num_mips: u32,
        width: u32,
        height: u32,
        depth: u32,
        texel_size_bytes: u32,
    ) -> Vec<InitialResourceDataDesc> {
        let num_mips = num_mips.max(1);
        let mut descs = Vec::with_capacity((num_textures * num_mips) as usize);
        let mut offset = 0usize;

        for _ in 0..num_textures {
            for mip in 0..num_mips {
                let mip_width = mip_dimension(width, mip);
                let mip_height = mip_dimension(height, mip);
                let mip_depth = mip_dimension(depth, mip);
                let row_stride = mip_width * texel_size_bytes;
                let slice_stride = row_stride * mip_height;

                descs.push(InitialResourceDataDesc { offset, row_stride, slice_stride });
                offset += slice_stride as usize * mip_depth as usize;
            }
        }

        descs
    }
}
