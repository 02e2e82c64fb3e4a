/// Software backend configuration and the simulated hardware it reports

use losgap_gpu::losgap::hardware::{GraphicsProcessingUnit, OutputDisplay, NativeOutputResolution};

const MIB: u64 = 1024 * 1024;

/// Configuration for [`SoftBackend`](crate::SoftBackend)
#[derive(Debug, Clone)]
pub struct SoftBackendConfig {
    /// Hardware reported by `enumerate_hardware`
    pub gpus: Vec<GraphicsProcessingUnit>,
    /// Whether created devices support deferred contexts
    pub supports_multithreading: bool,
}

impl Default for SoftBackendConfig {
    fn default() -> Self {
        Self {
            gpus: vec![default_gpu()],
            supports_multithreading: true,
        }
    }
}

impl SoftBackendConfig {
    pub fn with_gpus(mut self, gpus: Vec<GraphicsProcessingUnit>) -> Self {
        self.gpus = gpus;
        self
    }

    pub fn with_multithreading(mut self, supports_multithreading: bool) -> Self {
        self.supports_multithreading = supports_multithreading;
        self
    }
}

fn resolution(index: usize, width: u32, height: u32) -> NativeOutputResolution {
    NativeOutputResolution {
        index,
        width,
        height,
        refresh_rate_numerator: 60,
        refresh_rate_denominator: 1,
    }
}

/// One adapter with a single primary display
pub fn default_gpu() -> GraphicsProcessingUnit {
    GraphicsProcessingUnit {
        index: 0,
        description: "LOSGAP Software Adapter".to_string(),
        dedicated_video_memory: 256 * MIB,
        dedicated_system_memory: 0,
        shared_system_memory: 1024 * MIB,
        outputs: vec![OutputDisplay {
            index: 0,
            name: "Software Display".to_string(),
            is_primary_output: true,
            native_resolutions: vec![
                resolution(0, 1280, 720),
                resolution(1, 1920, 1080),
            ],
        }],
    }
}
