//! Unit tests for texture_utils.rs

use super::*;

// ============================================================================
// MIP DIMENSION
// ============================================================================

#[test]
fn test_mip_dimension_matches_shift_formula() {
    for dim in [1u32, 2, 3, 7, 32, 140, 1024, 4096] {
        for level in 0..16 {
            assert_eq!(mip_dimension(dim, level), (dim >> level).max(1));
        }
    }
}

#[test]
fn test_mip_dimension_clamps_huge_levels() {
    assert_eq!(mip_dimension(u32::MAX, 31), 1);
    assert_eq!(mip_dimension(u32::MAX, 200), 1);
}

// ============================================================================
// NUM MIPS
// ============================================================================

#[test]
fn test_num_mips_known_values() {
    assert_eq!(num_mips(32, 1, 1), 6);
    assert_eq!(num_mips(1, 1, 1), 1);
    assert_eq!(num_mips(1, 32, 1), 6);
    assert_eq!(num_mips(64, 32, 128), 8);
}

#[test]
fn test_num_mips_non_power_of_two_has_single_mip() {
    assert_eq!(num_mips(140, 1, 1), 1);
    assert_eq!(num_mips(64, 48, 1), 1);
}

// ============================================================================
// SUBRESOURCE INDEX
// ============================================================================

#[test]
fn test_subresource_index_known_values() {
    assert_eq!(subresource_index(3, 2, 4), 14);
    assert_eq!(subresource_index(9, 3, 4), 39);
}

#[test]
fn test_subresource_index_zero_mips_counts_as_one() {
    assert_eq!(subresource_index(0, 0, 5), 5);
}

// ============================================================================
// SIZE IN TEXELS
// ============================================================================

#[test]
fn test_size_texels_without_mips() {
    assert_eq!(size_texels(false, 16, 8, 2), 256);
}

#[test]
fn test_size_texels_with_mips() {
    // 8x4: 32 + 8 + 2 + 1
    assert_eq!(size_texels(true, 8, 4, 1), 43);
    // 1D 32: 32 + 16 + 8 + 4 + 2 + 1
    assert_eq!(size_texels(true, 32, 1, 1), 63);
}

#[test]
fn test_mip_level_addressable() {
    assert!(mip_level_addressable(140, 0));
    assert!(!mip_level_addressable(140, 1));
    assert!(mip_level_addressable(128, 5));
}
