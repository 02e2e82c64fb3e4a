//! Integration tests for textures on the software backend


use losgap_gpu::losgap::Error;
use losgap_gpu::losgap::backend::GraphicsBackend;
use losgap_gpu::losgap::resource::{
    GpuBindings, Resource, ResourceUsage, SubresourceBox, Texel, Texture, Texture2D, Rgba8UNorm,
};
use gpu_test_utils::soft_module;

// ============================================================================
// TEST HELPERS
// ============================================================================

const MIP_TARGET: GpuBindings = GpuBindings::RENDER_TARGET.union(GpuBindings::READABLE_SHADER_RESOURCE);

fn staging_clone<T: Texel>(texture: &Texture2D<T>) -> Texture2D<T> {
    texture
        .clone_builder(true)
        .with_usage(ResourceUsage::StagingRead)
        .with_permitted_bindings(GpuBindings::NONE)
        .with_mip_generation_target(false)
        .create()
        .unwrap()
}

// ============================================================================
// DATA ROUND TRIPS
// ============================================================================

#[test]
fn test_2d_initial_data_read_by_coordinates() {
    let (_, module) = soft_module();
    let data: Vec<u32> = (0..12).collect();
    let texture = module
        .new_texture_2d::<u32>()
        .with_usage(ResourceUsage::StagingRead)
        .with_permitted_bindings(GpuBindings::NONE)
        .with_width(4)
        .with_height(3)
        .with_initial_data(&data)
        .create()
        .unwrap();

    let texels = texture.read(0).unwrap();
    assert_eq!(texels[(0, 0)], 0);
    assert_eq!(texels[(3, 0)], 3);
    assert_eq!(texels[(1, 2)], 9);
}

#[test]
fn test_2d_region_write_then_copy_out() {
    let (_, module) = soft_module();
    let texture = module
        .new_texture_2d::<u32>()
        .with_usage(ResourceUsage::Write)
        .with_width(4)
        .with_height(4)
        .create()
        .unwrap();
    texture.write(&[1, 2, 3, 4], 0, 1..3, 2..4).unwrap();

    let texels = staging_clone(&texture).read(0).unwrap();
    assert_eq!(texels[(1, 2)], 1);
    assert_eq!(texels[(2, 2)], 2);
    assert_eq!(texels[(1, 3)], 3);
    assert_eq!(texels[(2, 3)], 4);
    assert_eq!(texels[(0, 0)], 0);
}

#[test]
fn test_mip_chain_initial_data() {
    let (_, module) = soft_module();
    // 4x2 chain: 8 + 2 + 1 texels
    let data: Vec<u32> = (0..11).collect();
    let texture = module
        .new_texture_2d::<u32>()
        .with_usage(ResourceUsage::StagingReadWrite)
        .with_permitted_bindings(GpuBindings::NONE)
        .with_width(4)
        .with_height(2)
        .with_mip_allocation(true)
        .with_initial_data(&data)
        .create()
        .unwrap();

    assert_eq!(texture.num_mips(), 3);
    assert_eq!(texture.read(1).unwrap().as_slice(), [8, 9]);
    assert_eq!(texture.read(2).unwrap().as_slice(), [10]);
    assert_eq!(texture.read_all().unwrap(), data);
}

#[test]
fn test_read_write_edits_one_mip() {
    let (_, module) = soft_module();
    let texture = module
        .new_texture_2d::<u32>()
        .with_usage(ResourceUsage::StagingReadWrite)
        .with_permitted_bindings(GpuBindings::NONE)
        .with_width(2)
        .with_height(2)
        .with_mip_allocation(true)
        .create()
        .unwrap();

    texture.read_write(|view| view.set_2d(0, 0, 42), 1).unwrap();
    assert_eq!(texture.read(1).unwrap().as_slice(), [42]);
    assert_eq!(texture.read(0).unwrap().as_slice(), [0, 0, 0, 0]);
}

#[test]
fn test_1d_and_3d_round_trips() {
    let (_, module) = soft_module();
    let line = module
        .new_texture_1d::<u16>()
        .with_usage(ResourceUsage::StagingReadWrite)
        .with_permitted_bindings(GpuBindings::NONE)
        .with_width(5)
        .create()
        .unwrap();
    line.write(&[7, 8], 0, 3..5).unwrap();
    assert_eq!(line.read(0).unwrap().as_slice(), [0, 0, 0, 7, 8]);

    let volume = module
        .new_texture_3d::<u32>()
        .with_usage(ResourceUsage::StagingReadWrite)
        .with_permitted_bindings(GpuBindings::NONE)
        .with_width(2)
        .with_height(2)
        .with_depth(2)
        .create()
        .unwrap();
    volume.write(&[5, 6], 0, &SubresourceBox::new_3d(1, 2, 1, 2, 0, 2)).unwrap();
    let texels = volume.read(0).unwrap();
    assert_eq!(texels[(1, 1, 0)], 5);
    assert_eq!(texels[(1, 1, 1)], 6);
    assert_eq!(texels[(0, 0, 1)], 0);
}

// ============================================================================
// COPIES
// ============================================================================

#[test]
fn test_copy_region_between_mips() {
    let (_, module) = soft_module();
    let data: Vec<u32> = (1..=16).collect();
    let source = module.new_texture_2d::<u32>().with_width(4).with_height(4).with_initial_data(&data).create().unwrap();
    let destination = module
        .new_texture_2d::<u32>()
        .with_usage(ResourceUsage::Write)
        .with_width(8)
        .with_height(8)
        .with_mip_allocation(true)
        .create()
        .unwrap();

    // Top-left 2x2 of the source into mip 1 (4x4) at (2, 2)
    source
        .copy_to_region(&destination, &SubresourceBox::new_2d(0, 2, 0, 2), 0, 1, [2, 2, 0])
        .unwrap();

    let mip = staging_clone(&destination).read(1).unwrap();
    assert_eq!(mip[(2, 2)], 1);
    assert_eq!(mip[(3, 2)], 2);
    assert_eq!(mip[(2, 3)], 5);
    assert_eq!(mip[(3, 3)], 6);
    assert_eq!(mip[(0, 0)], 0);
}

#[test]
fn test_clone_of_immutable_texture_keeps_texels() {
    let (_, module) = soft_module();
    let texels = [Rgba8UNorm::new(255, 0, 0, 255), Rgba8UNorm::new(0, 255, 0, 255)];
    let texture = module.new_texture_2d::<Rgba8UNorm>().with_width(2).with_height(1).with_initial_data(&texels).create().unwrap();
    let clone = texture.clone_builder(true).create().unwrap();
    assert_eq!(staging_clone(&clone).read(0).unwrap().as_slice(), texels);
}

// ============================================================================
// MIP GENERATION
// ============================================================================

#[test]
fn test_generate_mips_box_filters_chain() {
    let (backend, module) = soft_module();
    let texture = module
        .new_texture_2d::<u32>()
        .with_usage(ResourceUsage::Write)
        .with_permitted_bindings(MIP_TARGET)
        .with_width(4)
        .with_height(4)
        .with_mip_allocation(true)
        .with_mip_generation_target(true)
        .create()
        .unwrap();
    let base: Vec<u32> = (0..16).map(|i| i * 4).collect();
    texture.write(&base, 0, 0..4, 0..4).unwrap();

    texture.generate_mips().unwrap();
    assert_eq!(backend.live_view_count(), 0);

    let copy = staging_clone(&texture);
    assert_eq!(copy.read(1).unwrap().as_slice(), [10, 18, 42, 50]);
    assert_eq!(copy.read(2).unwrap().as_slice(), [30]);
}

#[test]
fn test_generate_mips_unorm_texels() {
    let (_, module) = soft_module();
    let texture = module
        .new_texture_2d::<Rgba8UNorm>()
        .with_usage(ResourceUsage::Write)
        .with_permitted_bindings(MIP_TARGET)
        .with_width(2)
        .with_height(2)
        .with_mip_allocation(true)
        .with_mip_generation_target(true)
        .create()
        .unwrap();
    let black = Rgba8UNorm::new(0, 0, 0, 255);
    let white = Rgba8UNorm::new(255, 255, 255, 255);
    texture.write(&[black, white, white, black], 0, 0..2, 0..2).unwrap();

    texture.generate_mips().unwrap();
    assert_eq!(staging_clone(&texture).read(1).unwrap().as_slice(), [Rgba8UNorm::new(128, 128, 128, 255)]);
}

// ============================================================================
// ARRAYS
// ============================================================================

#[test]
fn test_array_elements_address_their_own_slice() {
    let (_, module) = soft_module();
    let array = module
        .new_texture_2d::<u32>()
        .with_usage(ResourceUsage::StagingReadWrite)
        .with_permitted_bindings(GpuBindings::NONE)
        .with_width(2)
        .with_height(2)
        .with_mip_allocation(true)
        .create_array(3)
        .unwrap();

    array[1].write(&[1, 2, 3, 4], 0, 0..2, 0..2).unwrap();
    array[1].read_write(|view| view.set_2d(0, 0, 9), 1).unwrap();

    assert_eq!(array[0].read(0).unwrap().as_slice(), [0, 0, 0, 0]);
    assert_eq!(array[1].read(0).unwrap().as_slice(), [1, 2, 3, 4]);
    assert_eq!(array[1].read(1).unwrap().as_slice(), [9]);
    assert_eq!(array[2].read(1).unwrap().as_slice(), [0]);
}

#[test]
fn test_array_element_copy_between_slices() {
    let (_, module) = soft_module();
    let data: Vec<u32> = (0..15).collect();
    // Three 2x2 chains of 5 texels each
    let array = module
        .new_texture_2d::<u32>()
        .with_usage(ResourceUsage::StagingReadWrite)
        .with_permitted_bindings(GpuBindings::NONE)
        .with_width(2)
        .with_height(2)
        .with_mip_allocation(true)
        .with_initial_data(&data)
        .create_array(3)
        .unwrap();

    array[0].copy_to(&array[2]).unwrap();
    assert_eq!(array[2].read_all().unwrap(), vec![0, 1, 2, 3, 4]);
    assert_eq!(array[1].read_all().unwrap(), vec![5, 6, 7, 8, 9]);
}

#[test]
fn test_array_clone_copies_every_slice() {
    let (_, module) = soft_module();
    let data: Vec<u32> = (0..8).collect();
    let array = module
        .new_texture_2d::<u32>()
        .with_width(2)
        .with_height(2)
        .with_initial_data(&data)
        .create_array(2)
        .unwrap();

    let staging = array
        .clone_builder(true)
        .unwrap()
        .with_usage(ResourceUsage::StagingRead)
        .with_permitted_bindings(GpuBindings::NONE)
        .create_array(2)
        .unwrap();
    assert_eq!(staging[1].read(0).unwrap().as_slice(), [4, 5, 6, 7]);
}

#[test]
fn test_element_clone_copies_only_its_slice() {
    let (_, module) = soft_module();
    let data: Vec<u32> = (0..15).collect();
    let array = module
        .new_texture_2d::<u32>()
        .with_width(2)
        .with_height(2)
        .with_mip_allocation(true)
        .with_initial_data(&data)
        .create_array(3)
        .unwrap();

    let element = staging_clone(&array[1]);
    assert!(!element.is_array_texture());
    assert_eq!(element.read(0).unwrap().as_slice(), [5, 6, 7, 8]);
    assert_eq!(element.read(1).unwrap().as_slice(), [9]);

    // An element holds one slice, so it can not seed a whole array
    let result = array[1]
        .clone_builder(true)
        .with_usage(ResourceUsage::StagingRead)
        .with_permitted_bindings(GpuBindings::NONE)
        .create_array(2);
    assert!(matches!(result, Err(Error::AssuranceFailed(_))));
}

#[test]
fn test_1d_element_clone_copies_only_its_slice() {
    let (_, module) = soft_module();
    let array = module
        .new_texture_1d::<u16>()
        .with_width(4)
        .with_initial_data(&[1, 2, 3, 4, 5, 6, 7, 8])
        .create_array(2)
        .unwrap();

    let element = array[1]
        .clone_builder(true)
        .with_usage(ResourceUsage::StagingRead)
        .with_permitted_bindings(GpuBindings::NONE)
        .create()
        .unwrap();
    assert_eq!(element.read(0).unwrap().as_slice(), [5, 6, 7, 8]);
}

#[test]
fn test_disposing_array_releases_storage_once() {
    let (backend, module) = soft_module();
    let array = module
        .new_texture_2d::<u32>()
        .with_usage(ResourceUsage::Write)
        .with_width(2)
        .with_height(2)
        .create_array(4)
        .unwrap();
    assert_eq!(backend.live_resource_count(), 1);

    array[2].dispose().unwrap();
    assert_eq!(backend.live_resource_count(), 1);
    array.dispose().unwrap();
    assert_eq!(backend.live_resource_count(), 0);
    assert!(array[0].is_disposed());
}
