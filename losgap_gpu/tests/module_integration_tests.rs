//! Integration tests for the rendering module lifecycle on the software backend
//!
//! Covers hardware selection, multithreaded recording through deferred
//! contexts, shutdown ordering and the global `LosgapSystem` registry.


use std::sync::Arc;
use std::thread;
use losgap_gpu::losgap::{Error, LosgapSystem, ModuleState};
use losgap_gpu::losgap::hardware::{GraphicsProcessingUnit, HardwareSelection, OutputDisplay};
use losgap_gpu::losgap::resource::{BufferResource, ResourceUsage};
use losgap_gpu_backend_soft::{default_gpu, SoftBackend, SoftBackendConfig};
use gpu_test_utils::{read_back, soft_module, soft_module_with, test_config, RecordingWindow};
use serial_test::serial;

// ============================================================================
// TEST HELPERS
// ============================================================================

/// Default GPU plus a larger one whose primary display is its second output
fn dual_gpu_config() -> SoftBackendConfig {
    let mut large = default_gpu();
    large.index = 1;
    large.description = "Large Software Adapter".to_string();
    large.dedicated_video_memory *= 8;
    let template = large.outputs[0].clone();
    large.outputs = vec![
        OutputDisplay { index: 0, is_primary_output: false, name: "Side Display".to_string(), ..template.clone() },
        OutputDisplay { index: 1, is_primary_output: true, name: "Main Display".to_string(), ..template },
    ];
    SoftBackendConfig::default().with_gpus(vec![default_gpu(), large])
}

// ============================================================================
// HARDWARE SELECTION
// ============================================================================

#[test]
fn test_recommended_hardware_prefers_largest_gpu() {
    let (_, module) = soft_module_with(dual_gpu_config());
    assert_eq!(
        module.hardware_selection().unwrap(),
        HardwareSelection { gpu_index: 1, output_gpu_index: 1, output_index: 1 }
    );
    assert_eq!(module.selected_output_display().unwrap().name, "Main Display");
}

#[test]
fn test_set_hardware_before_and_while_running() {
    let (_, module) = soft_module_with(dual_gpu_config());
    module.set_hardware(0, 1, 0).unwrap();
    assert_eq!(module.selected_gpu().unwrap().description, "LOSGAP Software Adapter");
    assert_eq!(module.selected_output_display().unwrap().name, "Side Display");

    module.start().unwrap();
    assert_eq!(module.state(), ModuleState::Running);
    assert!(matches!(module.set_hardware(1, 1, 1), Err(Error::InvalidOperation(_))));
}

#[test]
fn test_no_gpu_fails_at_device_creation() {
    let (_, module) = soft_module_with(SoftBackendConfig::default().with_gpus(Vec::<GraphicsProcessingUnit>::new()));
    assert!(matches!(module.device(), Err(Error::HardwareEnumeration(_))));
}

#[test]
fn test_device_creation_can_be_retried() {
    let (backend, module) = soft_module();
    backend.fail_next_device_creation();
    assert!(module.device().is_err());
    assert_eq!(backend.live_device_count(), 0);

    module.device().unwrap();
    assert_eq!(backend.live_device_count(), 1);
}

// ============================================================================
// MULTITHREADED RECORDING
// ============================================================================

#[test]
fn test_workers_record_and_master_executes() {
    let (_, module) = soft_module();
    let buffer = module.new_buffer::<u32>().with_usage(ResourceUsage::Write).with_length(12).create().unwrap();

    let command_lists: Vec<_> = thread::scope(|scope| {
        let workers: Vec<_> = (0..3u32)
            .map(|worker| {
                let (module, buffer) = (&module, &buffer);
                scope.spawn(move || {
                    buffer.write(&[worker + 1; 4], worker * 4).unwrap();
                    module.finish_command_list().unwrap()
                })
            })
            .collect();
        workers.into_iter().map(|worker| worker.join().unwrap()).collect()
    });

    // Nothing reaches the resource before submission
    assert_eq!(read_back(&buffer), vec![0; 12]);

    for command_list in command_lists {
        module.execute_command_list(command_list).unwrap();
    }
    assert_eq!(read_back(&buffer), vec![1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3]);
}

#[test]
fn test_worker_without_multithreading_support() {
    let (_, module) = soft_module_with(SoftBackendConfig::default().with_multithreading(false));
    assert!(!module.supports_multithreaded_rendering().unwrap());

    let worker_module = Arc::clone(&module);
    let result = thread::spawn(move || worker_module.device_context()).join().unwrap();
    assert!(matches!(result, Err(Error::InvalidOperation(_))));
}

#[test]
fn test_worker_can_not_execute_command_lists() {
    let (_, module) = soft_module();
    let worker_module = Arc::clone(&module);
    let result = thread::spawn(move || {
        let list = worker_module.finish_command_list()?;
        worker_module.execute_command_list(list)
    })
    .join()
    .unwrap();
    assert!(matches!(result, Err(Error::InvalidOperation(_))));
}

// ============================================================================
// SHUTDOWN
// ============================================================================

#[test]
fn test_shutdown_closes_windows_before_device() {
    let (backend, module) = soft_module();
    let window = RecordingWindow::new(Arc::clone(&backend));
    module.track_window(window.clone());

    let worker_module = Arc::clone(&module);
    thread::spawn(move || worker_module.device_context().unwrap()).join().unwrap();
    assert_eq!(backend.live_context_count(), 2);

    module.shutdown().unwrap();
    assert_eq!(window.devices_at_close(), Some(1));
    assert_eq!(backend.live_device_count(), 0);
    assert_eq!(backend.live_context_count(), 0);
    assert_eq!(module.state(), ModuleState::Disposed);
    assert!(module.device().is_err());
}

#[test]
fn test_resources_outliving_shutdown_are_still_released() {
    let (_, module) = soft_module();
    let buffer = module.new_buffer::<u32>().with_initial_data(&[1, 2, 3]).create().unwrap();
    module.shutdown().unwrap();
    assert_eq!(module.live_resource_count(), 1);

    drop(buffer);
    assert_eq!(module.live_resource_count(), 0);
}

// ============================================================================
// GLOBAL SYSTEM
// ============================================================================

#[test]
#[serial]
fn test_system_registers_single_module() {
    LosgapSystem::initialize().unwrap();
    LosgapSystem::shutdown().unwrap();

    let backend = Arc::new(SoftBackend::default());
    let module = LosgapSystem::create_rendering_module(backend.clone(), test_config()).unwrap();
    assert!(Arc::ptr_eq(&module, &LosgapSystem::rendering_module().unwrap()));
    assert!(matches!(
        LosgapSystem::create_rendering_module(backend.clone(), test_config()),
        Err(Error::InitializationFailed(_))
    ));

    module.device().unwrap();
    LosgapSystem::shutdown().unwrap();
    assert_eq!(backend.live_device_count(), 0);
    assert!(LosgapSystem::rendering_module().is_err());
}

#[test]
#[serial]
fn test_system_module_serves_resources() {
    LosgapSystem::initialize().unwrap();
    LosgapSystem::shutdown().unwrap();

    LosgapSystem::create_rendering_module(Arc::new(SoftBackend::default()), test_config()).unwrap();
    let module = LosgapSystem::rendering_module().unwrap();
    let buffer = module.new_buffer::<u32>().with_initial_data(&[4, 5]).create().unwrap();
    assert_eq!(read_back(&buffer), vec![4, 5]);

    drop(buffer);
    LosgapSystem::shutdown().unwrap();
}
