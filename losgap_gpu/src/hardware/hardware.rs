/// GPU, output display and resolution descriptors
///
/// These are immutable snapshots taken once when the rendering module starts.
/// Identity is the slot index: two descriptors are equal when their indices
/// are equal, whatever their other fields say.

use std::fmt;
use std::hash::{Hash, Hasher};
use crate::error::{Error, Result};

// ===== NATIVE OUTPUT RESOLUTION =====

/// A display mode natively supported by an output
#[derive(Debug, Clone)]
pub struct NativeOutputResolution {
    /// Slot index in the owning output's resolution list
    pub index: usize,
    pub width: u32,
    pub height: u32,
    pub refresh_rate_numerator: u32,
    pub refresh_rate_denominator: u32,
}

impl NativeOutputResolution {
    /// Refresh rate in Hz (0 when the denominator is 0)
    pub fn refresh_rate_hz(&self) -> f64 {
        if self.refresh_rate_denominator == 0 {
            return 0.0;
        }
        self.refresh_rate_numerator as f64 / self.refresh_rate_denominator as f64
    }

    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl PartialEq for NativeOutputResolution {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl Eq for NativeOutputResolution {}

impl Hash for NativeOutputResolution {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl fmt::Display for NativeOutputResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} @ {:.2}Hz", self.width, self.height, self.refresh_rate_hz())
    }
}

// ===== OUTPUT DISPLAY =====

/// A display connected to a GPU
#[derive(Debug, Clone)]
pub struct OutputDisplay {
    /// Slot index in the owning GPU's output list
    pub index: usize,
    pub name: String,
    pub is_primary_output: bool,
    pub native_resolutions: Vec<NativeOutputResolution>,
}

impl OutputDisplay {
    /// Resolution with the largest `width * height` (first one on ties)
    pub fn highest_resolution(&self) -> Option<&NativeOutputResolution> {
        self.native_resolutions
            .iter()
            .fold(None, |best: Option<&NativeOutputResolution>, res| match best {
                Some(b) if b.pixel_count() >= res.pixel_count() => Some(b),
                _ => Some(res),
            })
    }
}

impl PartialEq for OutputDisplay {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl Eq for OutputDisplay {}

impl Hash for OutputDisplay {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl fmt::Display for OutputDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if self.is_primary_output {
            write!(f, " (primary)")?;
        }
        if let Some(highest) = self.highest_resolution() {
            write!(f, ", up to {}", highest)?;
        }
        Ok(())
    }
}

// ===== GRAPHICS PROCESSING UNIT =====

/// An installed graphics adapter
#[derive(Debug, Clone)]
pub struct GraphicsProcessingUnit {
    /// Slot index in the installed GPU list
    pub index: usize,
    pub description: String,
    /// Video memory not shared with the CPU, in bytes
    pub dedicated_video_memory: u64,
    /// System memory reserved for the adapter, in bytes
    pub dedicated_system_memory: u64,
    /// System memory the adapter may share with the CPU, in bytes
    pub shared_system_memory: u64,
    pub outputs: Vec<OutputDisplay>,
}

impl GraphicsProcessingUnit {
    pub fn primary_output(&self) -> Option<&OutputDisplay> {
        self.outputs.iter().find(|output| output.is_primary_output)
    }
}

impl PartialEq for GraphicsProcessingUnit {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl Eq for GraphicsProcessingUnit {}

impl Hash for GraphicsProcessingUnit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl fmt::Display for GraphicsProcessingUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const MIB: u64 = 1024 * 1024;
        write!(
            f,
            "{} [VRAM: {}MB, Dedicated system: {}MB, Shared system: {}MB, Outputs: {}]",
            self.description,
            self.dedicated_video_memory / MIB,
            self.dedicated_system_memory / MIB,
            self.shared_system_memory / MIB,
            self.outputs.len()
        )
    }
}

// ===== SELECTION =====

/// Rendering GPU plus the output (and the GPU owning it) used for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HardwareSelection {
    pub gpu_index: usize,
    pub output_gpu_index: usize,
    pub output_index: usize,
}

/// Pick the recommended rendering GPU and display output
///
/// The GPU with the most dedicated video memory wins (the first one on ties).
/// Its primary output is used when it has one; otherwise the output with the
/// highest native resolution across every GPU is used.
pub fn recommended_hardware(gpus: &[GraphicsProcessingUnit]) -> Result<HardwareSelection> {
    let gpu = gpus
        .iter()
        .fold(None, |best: Option<&GraphicsProcessingUnit>, gpu| match best {
            Some(b) if b.dedicated_video_memory >= gpu.dedicated_video_memory => Some(b),
            _ => Some(gpu),
        })
        .ok_or_else(|| Error::HardwareEnumeration("No graphics device detected.".to_string()))?;

    if let Some(primary) = gpu.primary_output() {
        return Ok(HardwareSelection {
            gpu_index: gpu.index,
            output_gpu_index: gpu.index,
            output_index: primary.index,
        });
    }

    let mut best: Option<(&GraphicsProcessingUnit, &OutputDisplay, u64)> = None;
    for candidate_gpu in gpus {
        for output in &candidate_gpu.outputs {
            let pixels = output.highest_resolution().map_or(0, |res| res.pixel_count());
            if best.map_or(true, |(_, _, best_pixels)| pixels > best_pixels) {
                best = Some((candidate_gpu, output, pixels));
            }
        }
    }

    let (output_gpu, output, _) = best
        .ok_or_else(|| Error::HardwareEnumeration("No output detected.".to_string()))?;

    Ok(HardwareSelection {
        gpu_index: gpu.index,
        output_gpu_index: output_gpu.index,
        output_index: output.index,
    })
}

#[cfg(test)]
#[path = "hardware_tests.rs"]
mod tests;
