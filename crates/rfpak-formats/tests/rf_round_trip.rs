#![allow(clippy::unwrap_used, clippy::expect_used)]

use proptest::prelude::*;
use rfpak_formats::RfFormat;
use rfpak_formats::compression::inflate_exact;
use rfpak_formats::rf::{
    BLOCK_ALIGNMENT, HEADER_SIZE, NameInfo, ResourceEntry, ResourceFlags, RfArchive, RfHeader,
    align_up,
};

fn entry_strategy() -> impl Strategy<Value = ResourceEntry> {
    (
        any::<u32>(),
        "[a-z0-9_./()]{0,24}",
        any::<u32>(),
        any::<u32>(),
        any::<u32>(),
        any::<u32>(),
    )
        .prop_map(
            |(pack_offset, filename, size_compressed, size_uncompressed, timestamp, flags)| {
                ResourceEntry {
                    pack_offset,
                    filename,
                    size_compressed,
                    size_uncompressed,
                    timestamp,
                    flags: ResourceFlags::new(flags),
                }
            },
        )
}

fn header_of(bytes: &[u8]) -> RfHeader {
    RfArchive::parse(bytes).unwrap().header
}

proptest! {
    #[test]
    fn archive_round_trips(entries in prop::collection::vec(entry_strategy(), 0..80)) {
        let bytes = RfArchive::new(entries.clone()).build().unwrap();
        let parsed = RfArchive::parse(&bytes).unwrap();

        prop_assert_eq!(&parsed.entries, &entries);
        prop_assert!(RfArchive::verify_round_trip(&bytes).is_ok());

        let header = parsed.header;
        prop_assert_eq!(header.entries_block_size as usize, entries.len() * 24);
        prop_assert_eq!(
            header.string_block_offset as usize,
            align_up(HEADER_SIZE + entries.len() * 24, BLOCK_ALIGNMENT)
        );
    }

    #[test]
    fn identical_names_share_offsets(name in "[a-z]{1,12}", copies in 2usize..10) {
        let entries: Vec<_> = (0..copies)
            .map(|i| ResourceEntry::file(name.clone(), i as u32, ResourceFlags::new(1)))
            .collect();
        let bytes = RfArchive::new(entries).build().unwrap();
        let header = header_of(&bytes);

        let payload = inflate_exact(&bytes[HEADER_SIZE..], header.size_uncompressed as usize).unwrap();
        let offsets: Vec<u32> = payload[..copies * 24]
            .chunks_exact(24)
            .map(|record| NameInfo(u32::from_le_bytes(record[4..8].try_into().unwrap())).str_offset())
            .collect();

        prop_assert!(offsets.iter().all(|&o| o == offsets[0]));
        // empty extension string, then the one shared name
        prop_assert_eq!(header.string_block_size as usize, 1 + name.len() + 1);
    }
}
