//! Unit tests for CPU-side resource storage

use super::*;
use losgap_gpu::losgap::backend::BufferKind;
use losgap_gpu::losgap::resource::{GpuBindings, InitialResourceDataDesc};

// ============================================================================
// TEST HELPERS
// ============================================================================

fn buffer_desc(size_bytes: u64) -> BufferDesc {
    BufferDesc {
        kind: BufferKind::Generic,
        size_bytes,
        element_size: 4,
        usage: ResourceUsage::StagingReadWrite,
        bindings: GpuBindings::empty(),
        structured: false,
        allow_raw_access: false,
        format: Some(TexelFormat::R32_UINT),
    }
}

fn texture_desc(width: u32, height: u32, array_size: u32, num_mips: u32) -> TextureDesc {
    TextureDesc {
        dimension: TextureDimension::Tex2D,
        width,
        height,
        depth: 1,
        array_size,
        num_mips,
        format: TexelFormat::R8_UINT,
        usage: ResourceUsage::Immutable,
        bindings: GpuBindings::READABLE_SHADER_RESOURCE,
        multisampled: false,
        mip_generation_target: false,
    }
}

// ============================================================================
// SUBRESOURCE TESTS
// ============================================================================

#[test]
fn test_pitches_are_tight() {
    let subresource = SoftSubresource::new(5, 3, 2, 4);
    assert_eq!(subresource.row_pitch(), 20);
    assert_eq!(subresource.depth_pitch(), 60);
    assert_eq!(subresource.data.len(), 120);
}

#[test]
fn test_write_then_read_region() {
    let mut subresource = SoftSubresource::new(4, 4, 1, 1);
    let region = SubresourceBox::new_2d(1, 3, 2, 4);
    subresource.write_region(&region, &[1, 2, 3, 4], 2, 4).unwrap();

    assert_eq!(subresource.read_region(&region).unwrap(), vec![1, 2, 3, 4]);
    assert_eq!(subresource.data[2 * 4 + 1], 1);
    assert_eq!(subresource.data[3 * 4 + 2], 4);
    assert_eq!(subresource.data[0], 0);
}

#[test]
fn test_write_honors_source_pitch() {
    let mut subresource = SoftSubresource::new(2, 2, 1, 1);
    // Rows padded to 4 bytes in the source
    subresource.write_region(&SubresourceBox::whole(2, 2, 1), &[1, 2, 0, 0, 3, 4, 0, 0], 4, 8).unwrap();
    assert_eq!(subresource.data, vec![1, 2, 3, 4]);
}

#[test]
fn test_region_outside_subresource_fails() {
    let mut subresource = SoftSubresource::new(2, 2, 1, 1);
    let region = SubresourceBox::new_2d(0, 3, 0, 1);
    assert!(matches!(subresource.write_region(&region, &[0; 3], 3, 3), Err(Error::InvalidArgument(_))));
    assert!(subresource.read_region(&region).is_err());
}

#[test]
fn test_short_source_fails() {
    let mut subresource = SoftSubresource::new(4, 1, 1, 1);
    let result = subresource.write_region(&SubresourceBox::new(0, 4), &[1, 2], 4, 4);
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
}

// ============================================================================
// RESOURCE TESTS
// ============================================================================

#[test]
fn test_buffer_is_one_byte_subresource() {
    let resource = SoftResource::new_buffer(&buffer_desc(16), Some(&[7; 16])).unwrap();
    assert_eq!(resource.kind, SoftResourceKind::Buffer);
    assert_eq!(resource.subresources.len(), 1);
    assert_eq!(resource.texel_size(), 1);
    assert_eq!(resource.subresources[0].data, vec![7; 16]);
}

#[test]
fn test_buffer_initial_data_size_mismatch() {
    assert!(SoftResource::new_buffer(&buffer_desc(16), Some(&[0; 8])).is_err());
}

#[test]
fn test_texture_subresources_slice_major() {
    let resource = SoftResource::new_texture(&texture_desc(4, 2, 2, 3), None).unwrap();
    assert_eq!(resource.subresources.len(), 6);
    let widths: Vec<u32> = resource.subresources.iter().map(|s| s.width).collect();
    assert_eq!(widths, vec![4, 2, 1, 4, 2, 1]);
}

#[test]
fn test_texture_initial_data_layout() {
    let desc = texture_desc(2, 2, 2, 2);
    let descs = InitialResourceDataDesc::create_data_descs(2, 2, 2, 2, 1, 1);
    let bytes: Vec<u8> = (0..10).collect();
    let initial = TextureInitialData { bytes: &bytes, subresources: &descs };
    let resource = SoftResource::new_texture(&desc, Some(initial)).unwrap();

    assert_eq!(resource.subresources[0].data, vec![0, 1, 2, 3]);
    assert_eq!(resource.subresources[1].data, vec![4]);
    assert_eq!(resource.subresources[2].data, vec![5, 6, 7, 8]);
    assert_eq!(resource.subresources[3].data, vec![9]);
}

#[test]
fn test_subresource_out_of_range() {
    let mut resource = SoftResource::new_texture(&texture_desc(2, 2, 1, 1), None).unwrap();
    assert!(resource.subresource(1).is_err());
    assert!(resource.subresource_mut(0).is_ok());
}

#[test]
fn test_layout_matches() {
    let a = SoftResource::new_buffer(&buffer_desc(16), None).unwrap();
    let b = SoftResource::new_buffer(&buffer_desc(16), None).unwrap();
    let c = SoftResource::new_buffer(&buffer_desc(32), None).unwrap();
    assert!(a.layout_matches(&b));
    assert!(!a.layout_matches(&c));
}
