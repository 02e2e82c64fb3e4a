//! Unit tests for the software backend

use super::*;
use losgap_gpu::losgap::backend::{BufferKind, TextureDimension};
use losgap_gpu::losgap::resource::{GpuBindings, InitialResourceDataDesc, TexelFormat};

// ============================================================================
// TEST HELPERS
// ============================================================================

const SELECTION: HardwareSelection = HardwareSelection { gpu_index: 0, output_gpu_index: 0, output_index: 0 };

fn device(backend: &SoftBackend) -> (DeviceHandle, DeviceContextHandle) {
    let created = backend.create_device(&SELECTION).unwrap();
    let immediate = backend.immediate_context(created.device).unwrap();
    (created.device, immediate)
}

fn buffer_desc(size_bytes: u64, usage: ResourceUsage) -> BufferDesc {
    BufferDesc {
        kind: BufferKind::Generic,
        size_bytes,
        element_size: 1,
        usage,
        bindings: if usage.is_staging() { GpuBindings::empty() } else { GpuBindings::READABLE_SHADER_RESOURCE },
        structured: false,
        allow_raw_access: false,
        format: Some(TexelFormat::R8_UINT),
    }
}

fn mipmapped_desc(width: u32, height: u32, array_size: u32) -> TextureDesc {
    TextureDesc {
        dimension: TextureDimension::Tex2D,
        width,
        height,
        depth: 1,
        array_size,
        num_mips: losgap_gpu::losgap::resource::texture_utils::num_mips(width, height, 1),
        format: TexelFormat::R8_UINT,
        usage: ResourceUsage::Write,
        bindings: GpuBindings::READABLE_SHADER_RESOURCE | GpuBindings::RENDER_TARGET,
        multisampled: false,
        mip_generation_target: true,
    }
}

fn read_buffer(backend: &SoftBackend, context: DeviceContextHandle, resource: ResourceHandle) -> Vec<u8> {
    let mut out = Vec::new();
    backend
        .map_subresource(context, resource, 0, MapMode::Read, &mut |mapped| out = mapped.data.to_vec())
        .unwrap();
    out
}

// ============================================================================
// DEVICE TESTS
// ============================================================================

#[test]
fn test_handles_are_never_null() {
    let backend = SoftBackend::default();
    let (device, immediate) = device(&backend);
    assert!(!device.is_null());
    assert!(!immediate.is_null());
}

#[test]
fn test_reports_configured_hardware() {
    let backend = SoftBackend::default();
    let gpus = backend.enumerate_hardware().unwrap();
    assert_eq!(gpus.len(), 1);
    assert_eq!(gpus[0].description, "LOSGAP Software Adapter");
    assert!(gpus[0].primary_output().is_some());
}

#[test]
fn test_invalid_selection_rejected() {
    let backend = SoftBackend::default();
    let selection = HardwareSelection { gpu_index: 0, output_gpu_index: 0, output_index: 4 };
    assert!(matches!(backend.create_device(&selection), Err(Error::InvalidArgument(_))));
}

#[test]
fn test_injected_device_failure_happens_once() {
    let backend = SoftBackend::default();
    backend.fail_next_device_creation();
    assert!(matches!(backend.create_device(&SELECTION), Err(Error::BackendError(_))));
    assert!(backend.create_device(&SELECTION).is_ok());
}

#[test]
fn test_release_device_drops_its_contexts() {
    let backend = SoftBackend::default();
    let (device, _) = device(&backend);
    backend.create_deferred_context(device).unwrap();
    assert_eq!(backend.live_context_count(), 2);

    backend.release_device(device).unwrap();
    assert_eq!(backend.live_device_count(), 0);
    assert_eq!(backend.live_context_count(), 0);
    assert!(backend.immediate_context(device).is_err());
}

#[test]
fn test_deferred_context_needs_multithreading() {
    let backend = SoftBackend::new(SoftBackendConfig::default().with_multithreading(false));
    let (device, _) = device(&backend);
    assert!(backend.create_deferred_context(device).is_err());
}

// ============================================================================
// RESOURCE TESTS
// ============================================================================

#[test]
fn test_buffer_initial_data_and_release() {
    let backend = SoftBackend::default();
    let (device, _) = device(&backend);
    let buffer = backend.create_buffer(device, &buffer_desc(4, ResourceUsage::Immutable), Some(&[1, 2, 3, 4])).unwrap();
    assert_eq!(backend.live_resource_count(), 1);
    assert_eq!(backend.subresource_contents(buffer, 0).unwrap(), vec![1, 2, 3, 4]);

    backend.release_resource(buffer).unwrap();
    assert_eq!(backend.live_resource_count(), 0);
    assert!(backend.release_resource(buffer).is_err());
}

#[test]
fn test_map_modes_follow_usage() {
    let backend = SoftBackend::default();
    let (device, immediate) = device(&backend);
    let staging_read = backend.create_buffer(device, &buffer_desc(4, ResourceUsage::StagingRead), None).unwrap();
    let dynamic = backend.create_buffer(device, &buffer_desc(4, ResourceUsage::DiscardWrite), None).unwrap();

    assert!(backend.map_subresource(immediate, staging_read, 0, MapMode::Read, &mut |_| {}).is_ok());
    assert!(backend.map_subresource(immediate, staging_read, 0, MapMode::Write, &mut |_| {}).is_err());
    assert!(backend.map_subresource(immediate, dynamic, 0, MapMode::WriteDiscard, &mut |_| {}).is_ok());
    assert!(backend.map_subresource(immediate, dynamic, 0, MapMode::Read, &mut |_| {}).is_err());
}

#[test]
fn test_mapped_writes_persist() {
    let backend = SoftBackend::default();
    let (device, immediate) = device(&backend);
    let staging = backend.create_buffer(device, &buffer_desc(4, ResourceUsage::StagingReadWrite), None).unwrap();

    backend
        .map_subresource(immediate, staging, 0, MapMode::ReadWrite, &mut |mapped| {
            mapped.data.copy_from_slice(&[9, 8, 7, 6]);
        })
        .unwrap();
    assert_eq!(read_buffer(&backend, immediate, staging), vec![9, 8, 7, 6]);
}

#[test]
fn test_discard_map_keeps_previous_contents() {
    let backend = SoftBackend::default();
    let (device, immediate) = device(&backend);
    let dynamic = backend.create_buffer(device, &buffer_desc(4, ResourceUsage::DiscardWrite), Some(&[1, 2, 3, 4])).unwrap();

    backend
        .map_subresource(immediate, dynamic, 0, MapMode::WriteDiscard, &mut |mapped| mapped.data[0] = 5)
        .unwrap();
    assert_eq!(backend.subresource_contents(dynamic, 0).unwrap(), vec![5, 2, 3, 4]);
}

#[test]
fn test_update_region_requires_write_usage() {
    let backend = SoftBackend::default();
    let (device, immediate) = device(&backend);
    let writable = backend.create_buffer(device, &buffer_desc(8, ResourceUsage::Write), None).unwrap();
    let staging = backend.create_buffer(device, &buffer_desc(8, ResourceUsage::StagingWrite), None).unwrap();
    let region = SubresourceBox::new(2, 5);

    backend.update_subresource_region(immediate, writable, 0, &region, &[1, 2, 3], 3, 3).unwrap();
    assert_eq!(backend.subresource_contents(writable, 0).unwrap(), vec![0, 0, 1, 2, 3, 0, 0, 0]);
    assert!(backend.update_subresource_region(immediate, staging, 0, &region, &[1, 2, 3], 3, 3).is_err());

    let outside = SubresourceBox::new(6, 10);
    assert!(matches!(
        backend.update_subresource_region(immediate, writable, 0, &outside, &[0; 4], 4, 4),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn test_copy_resource_requires_matching_layout() {
    let backend = SoftBackend::default();
    let (device, immediate) = device(&backend);
    let source = backend.create_buffer(device, &buffer_desc(4, ResourceUsage::Immutable), Some(&[4, 3, 2, 1])).unwrap();
    let destination = backend.create_buffer(device, &buffer_desc(4, ResourceUsage::StagingRead), None).unwrap();
    let larger = backend.create_buffer(device, &buffer_desc(8, ResourceUsage::StagingRead), None).unwrap();

    backend.copy_resource(immediate, source, destination).unwrap();
    assert_eq!(read_buffer(&backend, immediate, destination), vec![4, 3, 2, 1]);
    assert!(backend.copy_resource(immediate, source, larger).is_err());
    assert!(backend.copy_resource(immediate, source, source).is_err());
}

#[test]
fn test_copy_subresource_region_between_mips() {
    let backend = SoftBackend::default();
    let (device, immediate) = device(&backend);
    let bytes: Vec<u8> = (1..=5).collect();
    let descs = InitialResourceDataDesc::create_data_descs(1, 2, 2, 2, 1, 1);
    let mut desc = mipmapped_desc(2, 2, 1);
    desc.usage = ResourceUsage::Immutable;
    let texture = backend
        .create_texture(device, &desc, Some(TextureInitialData { bytes: &bytes, subresources: &descs }))
        .unwrap();
    let target = backend.create_texture(device, &mipmapped_desc(2, 2, 1), None).unwrap();

    let copy = SubresourceCopy {
        source: texture,
        source_subresource: 0,
        region: SubresourceBox::new_2d(1, 2, 0, 2),
        destination: target,
        destination_subresource: 0,
        destination_offset: [0, 0, 0],
    };
    backend.copy_subresource_region(immediate, &copy).unwrap();
    assert_eq!(backend.subresource_contents(target, 0).unwrap(), vec![2, 0, 4, 0]);
}

// ============================================================================
// DEFERRED CONTEXT TESTS
// ============================================================================

#[test]
fn test_deferred_commands_wait_for_execution() {
    let backend = SoftBackend::default();
    let (device, immediate) = device(&backend);
    let deferred = backend.create_deferred_context(device).unwrap();
    let buffer = backend.create_buffer(device, &buffer_desc(4, ResourceUsage::Write), None).unwrap();

    backend.update_subresource_region(deferred, buffer, 0, &SubresourceBox::new(0, 4), &[1, 1, 1, 1], 4, 4).unwrap();
    assert_eq!(backend.subresource_contents(buffer, 0).unwrap(), vec![0; 4]);

    let list = backend.finish_command_list(deferred).unwrap();
    backend.execute_command_list(immediate, list).unwrap();
    assert_eq!(backend.subresource_contents(buffer, 0).unwrap(), vec![1; 4]);
    assert!(backend.execute_command_list(immediate, list).is_err());
}

#[test]
fn test_deferred_maps_only_discard() {
    let backend = SoftBackend::default();
    let (device, immediate) = device(&backend);
    let deferred = backend.create_deferred_context(device).unwrap();
    let dynamic = backend.create_buffer(device, &buffer_desc(2, ResourceUsage::DiscardWrite), None).unwrap();
    let staging = backend.create_buffer(device, &buffer_desc(2, ResourceUsage::StagingRead), None).unwrap();

    assert!(backend.map_subresource(deferred, staging, 0, MapMode::Read, &mut |_| {}).is_err());
    backend
        .map_subresource(deferred, dynamic, 0, MapMode::WriteDiscard, &mut |mapped| mapped.data.copy_from_slice(&[3, 4]))
        .unwrap();
    assert_eq!(backend.subresource_contents(dynamic, 0).unwrap(), vec![0, 0]);

    let list = backend.finish_command_list(deferred).unwrap();
    backend.execute_command_list(immediate, list).unwrap();
    assert_eq!(backend.subresource_contents(dynamic, 0).unwrap(), vec![3, 4]);
}

#[test]
fn test_command_lists_roles() {
    let backend = SoftBackend::default();
    let (device, immediate) = device(&backend);
    let deferred = backend.create_deferred_context(device).unwrap();

    assert!(backend.finish_command_list(immediate).is_err());
    let list = backend.finish_command_list(deferred).unwrap();
    assert!(backend.execute_command_list(deferred, list).is_err());
    backend.execute_command_list(immediate, list).unwrap();
}

// ============================================================================
// VIEW TESTS
// ============================================================================

#[test]
fn test_view_must_fit_resource() {
    let backend = SoftBackend::default();
    let (device, _) = device(&backend);
    let buffer = backend.create_buffer(device, &buffer_desc(4, ResourceUsage::Immutable), Some(&[0; 4])).unwrap();
    let buffer_range = ViewDesc::ShaderResource(ShaderResourceRange::Buffer { first_element: 0, num_elements: 4 });
    let texture_range = ViewDesc::ShaderResource(ShaderResourceRange::Texture { first_mip: 0, num_mips: 1 });

    let view = backend.create_view(device, buffer, &buffer_range).unwrap();
    assert!(backend.create_view(device, buffer, &texture_range).is_err());
    assert_eq!(backend.live_view_count(), 1);
    backend.release_view(view).unwrap();
    assert_eq!(backend.live_view_count(), 0);
}

#[test]
fn test_generate_mips_filters_chain() {
    let backend = SoftBackend::default();
    let (device, immediate) = device(&backend);
    let texture = backend.create_texture(device, &mipmapped_desc(4, 4, 1), None).unwrap();
    let texels: Vec<u8> = vec![8; 16];
    backend
        .update_subresource_region(immediate, texture, 0, &SubresourceBox::whole(4, 4, 1), &texels, 4, 16)
        .unwrap();

    let view = backend
        .create_view(device, texture, &ViewDesc::ShaderResource(ShaderResourceRange::Texture { first_mip: 0, num_mips: 3 }))
        .unwrap();
    backend.generate_mips(immediate, view).unwrap();
    assert_eq!(backend.subresource_contents(texture, 1).unwrap(), vec![8; 4]);
    assert_eq!(backend.subresource_contents(texture, 2).unwrap(), vec![8]);
}

#[test]
fn test_generate_mips_on_one_array_slice() {
    let backend = SoftBackend::default();
    let (device, immediate) = device(&backend);
    let texture = backend.create_texture(device, &mipmapped_desc(2, 2, 2), None).unwrap();
    for slice in 0..2u32 {
        let value = [10u8, 20][slice as usize];
        backend
            .update_subresource_region(immediate, texture, slice * 2, &SubresourceBox::whole(2, 2, 1), &[value; 4], 2, 4)
            .unwrap();
    }

    let range = ShaderResourceRange::TextureArray { first_mip: 0, num_mips: 2, first_array_index: 1, num_array_elements: 1 };
    let view = backend.create_view(device, texture, &ViewDesc::ShaderResource(range)).unwrap();
    backend.generate_mips(immediate, view).unwrap();
    assert_eq!(backend.subresource_contents(texture, 1).unwrap(), vec![0]);
    assert_eq!(backend.subresource_contents(texture, 3).unwrap(), vec![20]);
}

#[test]
fn test_generate_mips_requires_target() {
    let backend = SoftBackend::default();
    let (device, immediate) = device(&backend);
    let mut desc = mipmapped_desc(4, 4, 1);
    desc.mip_generation_target = false;
    let texture = backend.create_texture(device, &desc, None).unwrap();
    let view = backend
        .create_view(device, texture, &ViewDesc::ShaderResource(ShaderResourceRange::Texture { first_mip: 0, num_mips: 3 }))
        .unwrap();
    assert!(backend.generate_mips(immediate, view).is_err());
}
