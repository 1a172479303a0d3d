use dotmatrix_core::gameboy::GameBoy;

/// Build a minimal 32 KiB ROM-only image with `program` placed at the entry
/// point (0x0100) and extra `patches` applied afterwards.
#[allow(dead_code)]
pub fn test_rom_with(program: &[u8], patches: &[(usize, &[u8])]) -> Vec<u8> {
    // The program must not spill into the header at 0x0134.
    assert!(program.len() <= 0x34, "test program too long");

    let mut rom = vec![0u8; 0x8000];
    rom[0x0100..0x0100 + program.len()].copy_from_slice(program);
    rom[0x0134..0x0138].copy_from_slice(b"TEST");
    rom[0x0147] = 0x00; // ROM only
    rom[0x0148] = 0x00; // 32 KiB
    rom[0x0149] = 0x00; // no cartridge RAM
    rom[0x014A] = 0x01; // overseas
    for (addr, bytes) in patches {
        rom[*addr..*addr + bytes.len()].copy_from_slice(bytes);
    }
    rom
}

#[allow(dead_code)]
pub fn test_rom(program: &[u8]) -> Vec<u8> {
    test_rom_with(program, &[])
}

/// Machine with `program` mapped at 0x0100 and PC pointing at it. No boot
/// ROM; the LCD stays disabled unless the program enables it.
#[allow(dead_code)]
pub fn machine_with_program(program: &[u8]) -> GameBoy {
    let mut gb = GameBoy::new();
    gb.load_rom(test_rom(program)).expect("test ROM should load");
    gb.cpu.pc = 0x0100;
    gb
}

/// Execute one instruction, panicking on decode errors.
#[allow(dead_code)]
pub fn step(gb: &mut GameBoy) -> u8 {
    gb.cpu.step(&mut gb.mmu).expect("instruction should decode")
}
