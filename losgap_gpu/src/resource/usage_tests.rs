//! Unit tests for usage.rs
//!
//! The capability predicates must reproduce the usage table exactly.

use super::ResourceUsage;

/// (usage, discard_write, write, read, read_write, copy_destination)
const CAPABILITY_TABLE: [(ResourceUsage, bool, bool, bool, bool, bool); 6] = [
    (ResourceUsage::Immutable,        false, false, false, false, false),
    (ResourceUsage::DiscardWrite,     true,  false, false, false, true),
    (ResourceUsage::Write,            false, true,  false, false, true),
    (ResourceUsage::StagingRead,      false, false, true,  false, true),
    (ResourceUsage::StagingWrite,     false, true,  false, false, true),
    (ResourceUsage::StagingReadWrite, false, true,  true,  true,  true),
];

#[test]
fn test_capability_table_matches_exactly() {
    for (usage, discard, write, read, read_write, copy_dest) in CAPABILITY_TABLE {
        assert_eq!(usage.can_discard_write(), discard, "{} discard", usage);
        assert_eq!(usage.can_write(), write, "{} write", usage);
        assert_eq!(usage.can_read(), read, "{} read", usage);
        assert_eq!(usage.can_read_write(), read_write, "{} read_write", usage);
        assert_eq!(usage.can_be_copy_destination(), copy_dest, "{} copy destination", usage);
    }
}

#[test]
fn test_table_covers_all_usages() {
    for usage in ResourceUsage::ALL {
        assert!(CAPABILITY_TABLE.iter().any(|row| row.0 == usage));
    }
}

#[test]
fn test_staging_detection() {
    assert!(ResourceUsage::StagingRead.is_staging());
    assert!(ResourceUsage::StagingWrite.is_staging());
    assert!(ResourceUsage::StagingReadWrite.is_staging());
    assert!(!ResourceUsage::Write.is_staging());
    assert!(!ResourceUsage::DiscardWrite.is_staging());
    assert!(!ResourceUsage::Immutable.is_staging());
}

#[test]
fn test_encoding_decomposition() {
    assert_eq!(ResourceUsage::DiscardWrite.gpu_usage(), 0x2);
    assert_eq!(ResourceUsage::DiscardWrite.cpu_access(), 0x1_0000);
    assert_eq!(ResourceUsage::StagingReadWrite.cpu_access(), 0x3_0000);
    assert_eq!(ResourceUsage::Write.cpu_access(), 0);
}

#[test]
fn test_display_uses_variant_name() {
    assert_eq!(ResourceUsage::StagingReadWrite.to_string(), "StagingReadWrite");
}
