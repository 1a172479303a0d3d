use std::thread;
use std::time::{Duration, Instant};

use crate::{
    cartridge::Cartridge,
    cpu::Cpu,
    error::{CoreError, PostBootMismatch},
    lcd::{Lcd, SCREEN_HEIGHT, SCREEN_WIDTH},
    mmu::{BOOT_ROM_SIZE, Mmu},
};

/// Machine cycles in one full refresh (154 scanlines x 456 cycles).
pub const CYCLES_PER_FRAME: u32 = 70_224;

/// Wall-clock budget of one frame: 70 224 cycles at 4 194 304 Hz (59.7 Hz).
pub const FRAME_TIME: Duration = Duration::from_nanos(16_742_706);

/// Documented I/O state after the boot ROM hands over control.
const POST_BOOT_IO: &[(u16, u8, &str)] = &[
    (0xFF05, 0x00, "FF05"),
    (0xFF06, 0x00, "FF06"),
    (0xFF07, 0x00, "FF07"),
    (0xFF10, 0x80, "FF10"),
    (0xFF11, 0xBF, "FF11"),
    (0xFF12, 0xF3, "FF12"),
    (0xFF14, 0xBF, "FF14"),
    (0xFF16, 0x3F, "FF16"),
    (0xFF17, 0x00, "FF17"),
    (0xFF19, 0xBF, "FF19"),
    (0xFF1A, 0x7F, "FF1A"),
    (0xFF1B, 0xFF, "FF1B"),
    (0xFF1C, 0x9F, "FF1C"),
    (0xFF1E, 0xBF, "FF1E"),
    (0xFF20, 0xFF, "FF20"),
    (0xFF21, 0x00, "FF21"),
    (0xFF22, 0x00, "FF22"),
    (0xFF23, 0xBF, "FF23"),
    (0xFF24, 0x77, "FF24"),
    (0xFF25, 0xF3, "FF25"),
    (0xFF26, 0xF1, "FF26"),
    (0xFF40, 0x91, "FF40"),
    (0xFF42, 0x00, "FF42"),
    (0xFF43, 0x00, "FF43"),
    (0xFF45, 0x00, "FF45"),
    (0xFF47, 0xFC, "FF47"),
    (0xFF48, 0xFF, "FF48"),
    (0xFF49, 0xFF, "FF49"),
    (0xFF4A, 0x00, "FF4A"),
    (0xFF4B, 0x00, "FF4B"),
    (0xFFFF, 0x00, "FFFF"),
];

/// The whole machine: CPU, bus, LCD, and the frame/timing loop that binds
/// them.
pub struct GameBoy {
    pub cpu: Cpu,
    pub mmu: Mmu,
    pub lcd: Lcd,
    /// Cycles spent in the current frame; overshoot carries into the next.
    frame_cycles: u32,
    boot_rom_loaded: bool,
    post_boot_checked: bool,
    post_boot_mismatches: Vec<PostBootMismatch>,
    next_frame: Option<Instant>,
}

impl GameBoy {
    pub fn new() -> Self {
        Self {
            cpu: Cpu::new(),
            mmu: Mmu::new(),
            lcd: Lcd::new(),
            frame_cycles: 0,
            boot_rom_loaded: false,
            post_boot_checked: false,
            post_boot_mismatches: Vec::new(),
            next_frame: None,
        }
    }

    /// Reset to the power-on state while preserving the loaded cartridge and
    /// boot ROM. Components reset in leaf order: cartridge, bus, LCD, CPU.
    pub fn reset(&mut self) {
        let cart = self.mmu.cart.take();
        let boot = self.mmu.take_boot_rom();
        self.mmu = Mmu::new();
        if let Some(cart) = cart {
            self.mmu.load_cart(cart);
        }
        if let Some(boot) = boot {
            self.mmu.load_boot_rom(boot);
        }
        self.lcd = Lcd::new();
        self.cpu.reset();
        self.frame_cycles = 0;
        self.post_boot_checked = false;
        self.post_boot_mismatches.clear();
        self.next_frame = None;
    }

    /// Validate and map a cartridge image.
    pub fn load_rom(&mut self, data: Vec<u8>) -> Result<(), CoreError> {
        let cart = Cartridge::load(data)?;
        core_info!(
            GameBoy,
            "loaded \"{}\": {} KiB ROM, {}, {:?} destination",
            cart.title,
            cart.rom_size / 1024,
            if cart.ram_size == 0 {
                "no cartridge RAM".to_string()
            } else {
                format!("{} KiB RAM", cart.ram_size / 1024)
            },
            cart.destination
        );
        self.mmu.load_cart(cart);
        Ok(())
    }

    /// Map a 256-byte boot ROM at 0x0000. It unmaps itself by writing 0x01
    /// to 0xFF50.
    pub fn load_boot_rom(&mut self, data: &[u8]) -> Result<(), CoreError> {
        let image: [u8; BOOT_ROM_SIZE] = data
            .try_into()
            .map_err(|_| CoreError::InvalidBootRom { len: data.len() })?;
        self.mmu.load_boot_rom(image);
        self.boot_rom_loaded = true;
        Ok(())
    }

    /// Run the CPU and LCD in lock-step for one frame's worth of cycles.
    ///
    /// Surfaces the first CPU error and stops; the host decides whether to
    /// terminate or [`reset`](Self::reset).
    pub fn frame_step(&mut self) -> Result<(), CoreError> {
        while self.frame_cycles < CYCLES_PER_FRAME {
            let cycles = self.cpu.step(&mut self.mmu)? as u32;
            self.lcd.step(cycles, &mut self.mmu);
            self.frame_cycles += cycles;

            if !self.post_boot_checked
                && self.boot_rom_loaded
                && !self.mmu.boot_mapped
                && self.cpu.pc == 0x0100
            {
                self.run_post_boot_check();
            }
        }
        self.frame_cycles -= CYCLES_PER_FRAME;
        Ok(())
    }

    /// One paced frame: [`frame_step`](Self::frame_step), then sleep out the
    /// remainder of the 59.7 Hz budget. Pacing is soft: a frame that blew
    /// its budget accrues no debt, and the next deadline re-bases on now.
    pub fn run_frame(&mut self) -> Result<&[u8; SCREEN_WIDTH * SCREEN_HEIGHT], CoreError> {
        let target = self
            .next_frame
            .unwrap_or_else(|| Instant::now() + FRAME_TIME);

        self.frame_step()?;
        self.lcd.clear_frame_flag();

        let now = Instant::now();
        if now < target {
            thread::sleep(target - now);
            self.next_frame = Some(target + FRAME_TIME);
        } else {
            self.next_frame = Some(now + FRAME_TIME);
        }
        Ok(self.lcd.framebuffer())
    }

    /// The most recently completed 160x144 frame, as pixel indices 0-3.
    pub fn framebuffer(&self) -> &[u8; SCREEN_WIDTH * SCREEN_HEIGHT] {
        self.lcd.framebuffer()
    }

    /// Release a `STOP`ped CPU. The host calls this on a joypad edge.
    pub fn wake(&mut self) {
        self.cpu.stopped = false;
    }

    /// Divergences found by the post-boot self-test, once it has run (PC
    /// reached 0x0100 with the boot ROM unmapped). Empty means the boot ROM
    /// left the machine in the documented state.
    pub fn post_boot_mismatches(&self) -> Option<&[PostBootMismatch]> {
        self.post_boot_checked
            .then(|| self.post_boot_mismatches.as_slice())
    }

    fn run_post_boot_check(&mut self) {
        self.post_boot_checked = true;

        let mut mismatches = Vec::new();
        let regs: [(&'static str, u16, u16); 5] = [
            ("AF", 0x01B0, self.cpu.af()),
            ("BC", 0x0013, self.cpu.bc()),
            ("DE", 0x00D8, self.cpu.de()),
            ("HL", 0x014D, self.cpu.hl()),
            ("SP", 0xFFFE, self.cpu.sp),
        ];
        for (location, expected, actual) in regs {
            if expected != actual {
                mismatches.push(PostBootMismatch {
                    location,
                    expected,
                    actual,
                });
            }
        }
        for &(addr, expected, location) in POST_BOOT_IO {
            let actual = self.mmu.read_byte(addr);
            if actual != expected {
                mismatches.push(PostBootMismatch {
                    location,
                    expected: expected as u16,
                    actual: actual as u16,
                });
            }
        }

        for m in &mismatches {
            core_warn!(
                GameBoy,
                "post-boot state diverges at {}: expected {:#06x}, found {:#06x}",
                m.location,
                m.expected,
                m.actual
            );
        }
        self.post_boot_mismatches = mismatches;
    }
}

impl Default for GameBoy {
    fn default() -> Self {
        Self::new()
    }
}
