//! Mip and array addressing math
//!
//! These functions are pure and unchecked; callers apply the validation layer
//! before relying on their preconditions.

/// Largest shift applied when computing a mip dimension
const MAX_MIP_SHIFT: u32 = 31;

/// Dimension of `dim` at mip `level`: `max(1, dim >> level)`
///
/// Levels above 31 behave like level 31.
pub fn mip_dimension(dim: u32, level: u32) -> u32 {
    (dim >> level.min(MAX_MIP_SHIFT)).max(1)
}

/// Number of mips in a full chain for the given dimensions
///
/// Counts the halvings of the largest dimension down to 1, including the base
/// level. Dimensions that are not all powers of two have a single mip.
pub fn num_mips(width: u32, height: u32, depth: u32) -> u32 {
    if !(width.is_power_of_two() && height.is_power_of_two() && depth.is_power_of_two()) {
        return 1;
    }
    let largest = width.max(height).max(depth);
    u32::BITS - largest.leading_zeros()
}

/// Flat subresource index of (`mip_index`, `array_index`)
///
/// A `num_mips` of 0 counts as 1.
pub fn subresource_index(num_mips: u32, mip_index: u32, array_index: u32) -> u32 {
    mip_index + num_mips.max(1) * array_index
}

/// Texel count of a texture, summing the whole mip chain when `include_mips` is set
pub fn size_texels(include_mips: bool, width: u32, height: u32, depth: u32) -> u64 {
    let mip_count = if include_mips { num_mips(width, height, depth) } else { 1 };
    (0..mip_count)
        .map(|level| mip_texels(width, height, depth, level))
        .sum()
}

/// Texel count of a single mip level
pub fn mip_texels(width: u32, height: u32, depth: u32, level: u32) -> u64 {
    mip_dimension(width, level) as u64
        * mip_dimension(height, level) as u64
        * mip_dimension(depth, level) as u64
}

/// True when a nonzero mip level is addressable for `dim`
pub fn mip_level_addressable(dim: u32, level: u32) -> bool {
    level == 0 || dim.is_power_of_two()
}

#[cfg(test)]
#[path = "texture_utils_tests.rs"]
mod tests;
