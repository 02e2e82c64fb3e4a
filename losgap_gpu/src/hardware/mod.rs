//! Hardware enumeration descriptors and recommended-hardware selection

mod hardware;

pub use hardware::{
    GraphicsProcessingUnit, OutputDisplay, NativeOutputResolution,
    HardwareSelection, recommended_hardware,
};
