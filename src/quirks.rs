/// Where the 16 hex-digit glyphs live in the reserved interpreter area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontLocation {
    /// 0x000, as some interpreters place it
    Low,
    /// 0x050, the usual modern choice
    Common,
}

impl FontLocation {
    pub fn addr(self) -> u16 {
        match self {
            FontLocation::Low => 0x000,
            FontLocation::Common => 0x050,
        }
    }
}

/// Points where historical interpreters disagree. One run uses one set of
/// quirks; they never change mid-program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quirks {
    /// font table base address
    pub font: FontLocation,
    /// Fx55/Fx65 leave I pointing past the last register copied (I += x + 1)
    pub load_store_advances_index: bool,
    /// Fx1E sets VF to 1 when I + Vx leaves the 12-bit address space, else 0
    pub index_overflow_sets_flag: bool,
    /// 8xy6/8xyE shift Vy into Vx rather than shifting Vx in place
    pub shift_reads_vy: bool,
}

impl Quirks {
    /// behaviour of most interpreters written since the 1990s
    pub fn modern() -> Self {
        Quirks {
            font: FontLocation::Common,
            load_store_advances_index: false,
            index_overflow_sets_flag: false,
            shift_reads_vy: false,
        }
    }

    /// behaviour of the original COSMAC VIP interpreter
    pub fn cosmac_vip() -> Self {
        Quirks {
            font: FontLocation::Common,
            load_store_advances_index: true,
            index_overflow_sets_flag: false,
            shift_reads_vy: true,
        }
    }
}

impl Default for Quirks {
    fn default() -> Self {
        Quirks::modern()
    }
}
