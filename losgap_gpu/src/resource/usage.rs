/// Resource usage and the capability table derived from it

use std::fmt;

/// CPU access bit: the resource may be mapped for writing
const CPU_ACCESS_WRITE: u32 = 0x1_0000;
/// CPU access bit: the resource may be mapped for reading
const CPU_ACCESS_READ: u32 = 0x2_0000;
/// GPU usage value shared by every staging usage
const GPU_USAGE_STAGING: u32 = 0x3;

/// How a resource is used by the GPU and the CPU.
///
/// The discriminant packs the GPU usage in the low nibble and the CPU access
/// flags in bits 16..17.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ResourceUsage {
    /// Contents fixed at creation; GPU read-only
    Immutable = 0x1,
    /// CPU overwrites whole contents each time (write-discard mapping)
    DiscardWrite = 0x1_0002,
    /// GPU read/write; CPU updates through subresource region updates
    Write = 0x0,
    /// Transfer resource the CPU can read from
    StagingRead = 0x2_0003,
    /// Transfer resource the CPU can write to
    StagingWrite = 0x1_0003,
    /// Transfer resource the CPU can read and write
    StagingReadWrite = 0x3_0003,
}

impl ResourceUsage {
    /// Every usage, in declaration order
    pub const ALL: [ResourceUsage; 6] = [
        ResourceUsage::Immutable,
        ResourceUsage::DiscardWrite,
        ResourceUsage::Write,
        ResourceUsage::StagingRead,
        ResourceUsage::StagingWrite,
        ResourceUsage::StagingReadWrite,
    ];

    pub fn gpu_usage(self) -> u32 {
        self as u32 & 0xF
    }

    pub fn cpu_access(self) -> u32 {
        self as u32 & (CPU_ACCESS_WRITE | CPU_ACCESS_READ)
    }

    pub fn is_staging(self) -> bool {
        self.gpu_usage() == GPU_USAGE_STAGING
    }

    pub fn can_discard_write(self) -> bool {
        self == ResourceUsage::DiscardWrite
    }

    /// `Write` goes through region updates, staging usages through mapping.
    pub fn can_write(self) -> bool {
        matches!(
            self,
            ResourceUsage::Write | ResourceUsage::StagingWrite | ResourceUsage::StagingReadWrite
        )
    }

    pub fn can_read(self) -> bool {
        matches!(self, ResourceUsage::StagingRead | ResourceUsage::StagingReadWrite)
    }

    pub fn can_read_write(self) -> bool {
        self == ResourceUsage::StagingReadWrite
    }

    pub fn can_be_copy_destination(self) -> bool {
        self != ResourceUsage::Immutable
    }
}

impl fmt::Display for ResourceUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
#[path = "usage_tests.rs"]
mod tests;
