//! Resource flags and the depth byte packed into them

use binrw::{BinRead, BinWrite};
use std::fmt;

/// Resource flags of an entry
///
/// The low byte is the entry's depth in the flattened pre-order sequence.
/// The remaining bits are independent attributes. Bits without a known
/// meaning are carried through untouched.
#[derive(BinRead, BinWrite, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[brw(little)]
pub struct ResourceFlags(pub u32);

impl ResourceFlags {
    /// Mask of the depth byte
    pub const DEPTH_MASK: u32 = 0x0000_00FF;

    /// Unknown (bit 8)
    pub const UNKNOWN_100: u32 = 0x0100;

    /// Entry is a directory (bit 9)
    pub const DIRECTORY: u32 = 0x0200;

    /// Payload bytes are stored in a shard (bit 10)
    pub const PACKED: u32 = 0x0400;

    /// Entry is not localized; its bytes live in the enclosing shard (bit 11)
    pub const NO_LOCALIZATION: u32 = 0x0800;

    /// Unknown (bit 12)
    pub const UNKNOWN_1000: u32 = 0x1000;

    /// Debug-only resource (bit 13)
    pub const DEBUG: u32 = 0x2000;

    /// Resource overridden by a workspace file (bit 14)
    pub const OVERRIDE: u32 = 0x4000;

    /// Unknown (bit 15)
    pub const UNKNOWN_8000: u32 = 0x8000;

    /// Create flags from a raw value
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Raw value
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Depth stored in the low byte
    pub const fn depth(self) -> u8 {
        (self.0 & Self::DEPTH_MASK) as u8
    }

    /// Same attributes with a different depth
    pub const fn with_depth(self, depth: u8) -> Self {
        Self((self.0 & !Self::DEPTH_MASK) | depth as u32)
    }

    /// Attribute bits without the depth byte
    pub const fn attributes(self) -> u32 {
        self.0 & !Self::DEPTH_MASK
    }

    /// Check if flag is set
    pub const fn has(self, flag: u32) -> bool {
        (self.0 & flag) != 0
    }

    /// Set flag
    pub fn set(&mut self, flag: u32) {
        self.0 |= flag & !Self::DEPTH_MASK;
    }

    /// Clear flag
    pub fn clear(&mut self, flag: u32) {
        self.0 &= !(flag & !Self::DEPTH_MASK);
    }

    /// Check if the entry is a directory
    pub const fn is_directory(self) -> bool {
        self.has(Self::DIRECTORY)
    }

    /// Check if the entry is marked not localized
    pub const fn is_no_localization(self) -> bool {
        self.has(Self::NO_LOCALIZATION)
    }

    /// Check if the entry is an override
    pub const fn is_override(self) -> bool {
        self.has(Self::OVERRIDE)
    }
}

/// Depth encoded in a flags word
pub const fn depth_of(flags: ResourceFlags) -> u8 {
    flags.depth()
}

/// Flags word with its depth byte replaced
pub const fn with_depth(flags: ResourceFlags, depth: u8) -> ResourceFlags {
    flags.with_depth(depth)
}

impl fmt::Display for ResourceFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(u32, &str); 5] = [
            (ResourceFlags::DIRECTORY, "DIR"),
            (ResourceFlags::PACKED, "PACKED"),
            (ResourceFlags::NO_LOCALIZATION, "NO_LOC"),
            (ResourceFlags::DEBUG, "DEBUG"),
            (ResourceFlags::OVERRIDE, "OVERRIDE"),
        ];

        write!(f, "depth={} [", self.depth())?;
        let mut first = true;
        for (bit, name) in NAMES {
            if self.has(bit) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        write!(f, "] 0x{:08X}", self.0)
    }
}

impl From<u32> for ResourceFlags {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl From<ResourceFlags> for u32 {
    fn from(flags: ResourceFlags) -> Self {
        flags.0
    }
}
