//! Test utilities for format round-trip testing

use crate::RfFormat;
use crate::rf::{ResourceEntry, ResourceFlags};
use std::fmt::Debug;

/// Test round-trip serialization for a format instance
///
/// Verifies that a format can be serialized and deserialized back
/// to an equivalent value.
pub fn test_round_trip<T>(original: &T) -> Result<(), Box<dyn std::error::Error>>
where
    T: RfFormat + PartialEq + Debug,
{
    let data = original.build()?;
    let parsed = T::parse(&data)?;

    if original != &parsed {
        return Err(format!(
            "Round-trip verification failed:\nOriginal: {:?}\nParsed: {:?}",
            original, parsed
        )
        .into());
    }

    Ok(())
}

/// A small catalog: one section root, two directories, three files
pub fn sample_entries() -> Vec<ResourceEntry> {
    let dir = ResourceFlags::DIRECTORY;
    let file = ResourceFlags::PACKED | ResourceFlags::NO_LOCALIZATION;

    vec![
        ResourceEntry::directory("", 0),
        ResourceEntry {
            flags: ResourceFlags::new(dir | ResourceFlags::UNKNOWN_1000 | 1),
            ..ResourceEntry::directory("data/", 1)
        },
        ResourceEntry {
            pack_offset: 0x80,
            filename: "a.txt".to_string(),
            size_compressed: 12,
            size_uncompressed: 40,
            timestamp: 0x6000_0000,
            flags: ResourceFlags::new(file | 2),
        },
        ResourceEntry {
            pack_offset: 0x200,
            filename: "b.txt".to_string(),
            size_compressed: 9,
            size_uncompressed: 9,
            timestamp: 0x6000_0001,
            flags: ResourceFlags::new(file | ResourceFlags::UNKNOWN_8000 | 2),
        },
        ResourceEntry::directory("other/", 1),
        ResourceEntry {
            pack_offset: 0x400,
            filename: "a.txt".to_string(),
            size_compressed: 3,
            size_uncompressed: 5,
            timestamp: 7,
            flags: ResourceFlags::new(ResourceFlags::DEBUG | 2),
        },
    ]
}
