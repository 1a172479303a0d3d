use thiserror::Error;

/// A single divergence from the documented post-boot machine state.
///
/// Produced by the machine's self-test when PC first reaches 0x0100 after the
/// boot ROM unmaps itself. Never fatal; see
/// [`GameBoy::post_boot_mismatches`](crate::gameboy::GameBoy::post_boot_mismatches).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostBootMismatch {
    /// Short name of the checked cell: a register pair (`"AF"`, `"SP"`) or an
    /// I/O address (`"FF40"`).
    pub location: &'static str,
    pub expected: u16,
    pub actual: u16,
}

/// Errors surfaced by the emulation core.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// The CPU fetched one of the eleven undefined opcode slots.
    #[error("illegal opcode {byte:#04x} at {pc:#06x}")]
    IllegalOpcode { pc: u16, byte: u8 },

    /// The cartridge header declares banking or RAM hardware this core does
    /// not emulate.
    #[error("unsupported cartridge type {kind:#04x} (only ROM-only cartridges are supported)")]
    UnsupportedCartridge { kind: u8 },

    #[error("unsupported ROM size code {code:#04x}")]
    UnsupportedRomSize { code: u8 },

    #[error("unsupported RAM size code {code:#04x}")]
    UnsupportedRamSize { code: u8 },

    /// The image length is not a whole 32/64 KiB image, or disagrees with the
    /// header's ROM size code.
    #[error("ROM image is {len} bytes, expected exactly 32 KiB or 64 KiB")]
    InvalidRomLength { len: usize },

    #[error("boot ROM is {len} bytes, expected exactly 256")]
    InvalidBootRom { len: usize },
}
