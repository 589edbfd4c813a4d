/// A decoded CHIP-8 instruction. `x` and `y` are register indices (0-15),
/// `kk` an 8-bit immediate, `nnn` a 12-bit address and `n` a 4-bit count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 0nnn - call a native machine routine; ignored
    MachineCall(u16),
    /// 00E0
    ClearScreen,
    /// 00EE
    Return,
    /// 1nnn
    Jump(u16),
    /// 2nnn
    Call(u16),
    /// 3xkk
    SkipIfEqualImmediate { x: u8, kk: u8 },
    /// 4xkk
    SkipIfNotEqualImmediate { x: u8, kk: u8 },
    /// 5xy0
    SkipIfEqualRegisters { x: u8, y: u8 },
    /// 6xkk
    LoadImmediate { x: u8, kk: u8 },
    /// 7xkk
    AddImmediate { x: u8, kk: u8 },
    /// 8xy0
    Load { x: u8, y: u8 },
    /// 8xy1
    Or { x: u8, y: u8 },
    /// 8xy2
    And { x: u8, y: u8 },
    /// 8xy3
    Xor { x: u8, y: u8 },
    /// 8xy4
    Add { x: u8, y: u8 },
    /// 8xy5
    Sub { x: u8, y: u8 },
    /// 8xy6
    ShiftRight { x: u8, y: u8 },
    /// 8xy7
    SubN { x: u8, y: u8 },
    /// 8xyE
    ShiftLeft { x: u8, y: u8 },
    /// 9xy0
    SkipIfNotEqualRegisters { x: u8, y: u8 },
    /// Annn
    LoadIndex(u16),
    /// Bnnn
    JumpOffset(u16),
    /// Cxkk
    Random { x: u8, kk: u8 },
    /// Dxyn
    Draw { x: u8, y: u8, n: u8 },
    /// Ex9E
    SkipIfKeyPressed { x: u8 },
    /// ExA1
    SkipIfKeyNotPressed { x: u8 },
    /// Fx07
    LoadDelayTimer { x: u8 },
    /// Fx0A
    WaitForKey { x: u8 },
    /// Fx15
    SetDelayTimer { x: u8 },
    /// Fx18
    SetSoundTimer { x: u8 },
    /// Fx1E
    AddToIndex { x: u8 },
    /// Fx29
    LoadFontAddress { x: u8 },
    /// Fx33
    StoreBcd { x: u8 },
    /// Fx55
    StoreRegisters { x: u8 },
    /// Fx65
    LoadRegisters { x: u8 },
    /// anything else; executing it is a fault
    Unknown(u16),
}

impl Instruction {
    /// Split an instruction word into its fields and pick the operation.
    /// Never fails: unrecognised words come back as `Unknown`.
    pub fn decode(word: u16) -> Self {
        let group = (word >> 12) as u8;
        let x = ((word >> 8) & 0xf) as u8;
        let y = ((word >> 4) & 0xf) as u8;
        let n = (word & 0xf) as u8;
        let kk = (word & 0xff) as u8;
        let nnn = word & 0xfff;

        match (group, n) {
            (0x0, _) => match nnn {
                0x0e0 => Instruction::ClearScreen,
                0x0ee => Instruction::Return,
                _ => Instruction::MachineCall(nnn),
            },
            (0x1, _) => Instruction::Jump(nnn),
            (0x2, _) => Instruction::Call(nnn),
            (0x3, _) => Instruction::SkipIfEqualImmediate { x, kk },
            (0x4, _) => Instruction::SkipIfNotEqualImmediate { x, kk },
            (0x5, 0x0) => Instruction::SkipIfEqualRegisters { x, y },
            (0x6, _) => Instruction::LoadImmediate { x, kk },
            (0x7, _) => Instruction::AddImmediate { x, kk },
            (0x8, 0x0) => Instruction::Load { x, y },
            (0x8, 0x1) => Instruction::Or { x, y },
            (0x8, 0x2) => Instruction::And { x, y },
            (0x8, 0x3) => Instruction::Xor { x, y },
            (0x8, 0x4) => Instruction::Add { x, y },
            (0x8, 0x5) => Instruction::Sub { x, y },
            (0x8, 0x6) => Instruction::ShiftRight { x, y },
            (0x8, 0x7) => Instruction::SubN { x, y },
            (0x8, 0xe) => Instruction::ShiftLeft { x, y },
            (0x9, 0x0) => Instruction::SkipIfNotEqualRegisters { x, y },
            (0xa, _) => Instruction::LoadIndex(nnn),
            (0xb, _) => Instruction::JumpOffset(nnn),
            (0xc, _) => Instruction::Random { x, kk },
            (0xd, _) => Instruction::Draw { x, y, n },
            (0xe, _) => match kk {
                0x9e => Instruction::SkipIfKeyPressed { x },
                0xa1 => Instruction::SkipIfKeyNotPressed { x },
                _ => Instruction::Unknown(word),
            },
            (0xf, _) => match kk {
                0x07 => Instruction::LoadDelayTimer { x },
                0x0a => Instruction::WaitForKey { x },
                0x15 => Instruction::SetDelayTimer { x },
                0x18 => Instruction::SetSoundTimer { x },
                0x1e => Instruction::AddToIndex { x },
                0x29 => Instruction::LoadFontAddress { x },
                0x33 => Instruction::StoreBcd { x },
                0x55 => Instruction::StoreRegisters { x },
                0x65 => Instruction::LoadRegisters { x },
                _ => Instruction::Unknown(word),
            },
            _ => Instruction::Unknown(word),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_decode_group_0() {
        assert_eq!(Instruction::decode(0x00e0), Instruction::ClearScreen);
        assert_eq!(Instruction::decode(0x00ee), Instruction::Return);
        assert_eq!(Instruction::decode(0x0123), Instruction::MachineCall(0x123));
    }

    #[test]
    fn test_decode_address_fields() {
        assert_eq!(Instruction::decode(0x1a5f), Instruction::Jump(0xa5f));
        assert_eq!(Instruction::decode(0x2a5f), Instruction::Call(0xa5f));
        assert_eq!(Instruction::decode(0xa2c5), Instruction::LoadIndex(0x2c5));
        assert_eq!(Instruction::decode(0xbfff), Instruction::JumpOffset(0xfff));
    }

    #[test]
    fn test_decode_register_fields() {
        assert_eq!(
            Instruction::decode(0x62c5),
            Instruction::LoadImmediate { x: 2, kk: 0xc5 }
        );
        assert_eq!(
            Instruction::decode(0x8ab4),
            Instruction::Add { x: 0xa, y: 0xb }
        );
        assert_eq!(
            Instruction::decode(0x8abe),
            Instruction::ShiftLeft { x: 0xa, y: 0xb }
        );
        assert_eq!(
            Instruction::decode(0xd01f),
            Instruction::Draw { x: 0, y: 1, n: 0xf }
        );
    }

    #[test]
    fn test_decode_key_and_misc() {
        assert_eq!(
            Instruction::decode(0xe39e),
            Instruction::SkipIfKeyPressed { x: 3 }
        );
        assert_eq!(
            Instruction::decode(0xe3a1),
            Instruction::SkipIfKeyNotPressed { x: 3 }
        );
        assert_eq!(Instruction::decode(0xf40a), Instruction::WaitForKey { x: 4 });
        assert_eq!(Instruction::decode(0xf533), Instruction::StoreBcd { x: 5 });
        assert_eq!(
            Instruction::decode(0xff65),
            Instruction::LoadRegisters { x: 0xf }
        );
    }

    #[test]
    fn test_decode_unknown() {
        for word in [0x5121, 0x9ab1, 0x8ab8, 0x8abf, 0xe39f, 0xf0ff, 0xf000] {
            assert_eq!(Instruction::decode(word), Instruction::Unknown(word));
        }
    }

    proptest! {
        #[test]
        fn decode_never_panics(word in any::<u16>()) {
            let _ = Instruction::decode(word);
        }

        #[test]
        fn alu_group_keeps_operands(x in 0u8..16, y in 0u8..16) {
            let word = 0x8000 | (x as u16) << 8 | (y as u16) << 4 | 0x5;
            prop_assert_eq!(Instruction::decode(word), Instruction::Sub { x, y });
        }
    }
}
