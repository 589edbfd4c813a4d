use std::io;

/// Faults raised by the core. None of these terminate the process; the host
/// decides whether to halt, reset or freeze.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    #[error("unknown opcode {0:#06x}")]
    UnknownOpcode(u16),
    #[error("call stack overflow")]
    StackOverflow,
    #[error("return with an empty call stack")]
    StackUnderflow,
    #[error("memory access out of bounds at {0:#05x}")]
    OutOfBoundsAccess(usize),
    #[error("ROM is too large ({size} bytes), max size is {max} bytes")]
    RomTooLarge { size: usize, max: usize },
    #[error("key index {0:#04x} is not on the keypad")]
    InvalidKeyIndex(u8),
    #[error("no font glyph for digit {0:#04x}")]
    InvalidDigit(u8),
}

/// Errors surfaced by the host loop: either the machine faulted or one of the
/// attached devices failed.
#[derive(thiserror::Error, Debug)]
pub enum Chip8Error {
    #[error(transparent)]
    Fault(#[from] Fault),
    #[error("device i/o failed: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_messages() {
        assert_eq!(
            Fault::UnknownOpcode(0x5121).to_string(),
            "unknown opcode 0x5121"
        );
        assert_eq!(
            Fault::OutOfBoundsAccess(0x1000).to_string(),
            "memory access out of bounds at 0x1000"
        );
        assert_eq!(
            Fault::RomTooLarge { size: 4000, max: 3584 }.to_string(),
            "ROM is too large (4000 bytes), max size is 3584 bytes"
        );
    }

    #[test]
    fn test_fault_converts_to_host_error() {
        let err: Chip8Error = Fault::StackUnderflow.into();
        assert!(matches!(err, Chip8Error::Fault(Fault::StackUnderflow)));
    }
}
