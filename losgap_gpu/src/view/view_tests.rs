//! Unit tests for resource views (shared behavior, display and lifetime)

use crate::backend::{ShaderResourceRange, UnorderedAccessRange};
use crate::backend::mock_backend::test_module;
use crate::resource::{Resource, ResourceUsage, GpuBindings, Texture};
use crate::view::ResourceView;

// ============================================================================
// ACCESSOR TESTS
// ============================================================================

#[test]
fn test_view_reports_resource_and_range() {
    let (_, module) = test_module();
    let buffer = module.new_buffer::<f32>().with_initial_data(&[0.0; 8]).create().unwrap();
    let view = buffer.create_view(1, 4).unwrap();

    assert!(!view.handle().is_null());
    assert_eq!(view.resource().handle(), buffer.handle());
    assert_eq!(view.range(), ShaderResourceRange::Buffer { first_element: 1, num_elements: 4 });
    assert!(!view.resource_or_view_disposed());
}

#[test]
fn test_unordered_access_view_display() {
    let (_, module) = test_module();
    let buffer = module
        .new_buffer::<u32>()
        .with_usage(ResourceUsage::Write)
        .with_permitted_bindings(GpuBindings::WRITABLE_SHADER_RESOURCE)
        .with_length(16)
        .create()
        .unwrap();
    let view = buffer.create_unordered_access_view(0, 16, false, false).unwrap();
    assert_eq!(
        view.to_string(),
        "UAV for Buffer<u32> [Usage: Write, Length: 16] (Elements 0..16, Raw)"
    );
    assert!(matches!(view.range(), UnorderedAccessRange::Buffer { raw: true, .. }));
}

#[test]
fn test_texture_view_display() {
    let (_, module) = test_module();
    let texture = module
        .new_texture_2d::<u32>()
        .with_usage(ResourceUsage::Write)
        .with_width(8)
        .with_height(8)
        .with_mip_allocation(true)
        .create()
        .unwrap();
    let view = texture.create_view(1, 2).unwrap();
    assert_eq!(
        view.to_string(),
        "SRV for Texture2D<u32> [Usage: Write, Width: 8, Height: 8, Mips: 4] (Mips 1..3)"
    );
}

// ============================================================================
// LIFETIME TESTS
// ============================================================================

#[test]
fn test_disposing_resource_is_visible_through_view() {
    let (backend, module) = test_module();
    let buffer = module.new_buffer::<u32>().with_initial_data(&[1, 2, 3]).create().unwrap();
    let view = buffer.create_default_view().unwrap();

    buffer.dispose().unwrap();
    assert!(view.resource_or_view_disposed());
    assert_eq!(backend.call_count("release_view"), 0);

    view.dispose().unwrap();
    assert_eq!(backend.call_count("release_view"), 1);
}

#[test]
fn test_view_keeps_undisposed_resource_alive() {
    let (backend, module) = test_module();
    let buffer = module.new_buffer::<u32>().with_initial_data(&[1, 2, 3]).create().unwrap();
    let view = buffer.create_default_view().unwrap();

    drop(buffer);
    assert_eq!(backend.call_count("release_resource"), 0);
    assert!(!view.resource_or_view_disposed());

    drop(view);
    let calls = backend.calls();
    assert_eq!(&calls[calls.len() - 2..], ["release_view", "release_resource"]);
}

#[test]
fn test_disposed_view_reports_disposed() {
    let (_, module) = test_module();
    let buffer = module.new_buffer::<u32>().with_initial_data(&[1]).create().unwrap();
    let view = buffer.create_default_view().unwrap();
    view.dispose().unwrap();
    assert!(view.resource_or_view_disposed());
    assert!(!buffer.is_disposed());
}
