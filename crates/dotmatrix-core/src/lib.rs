//! Game Boy (DMG) emulation core.
//!
//! This crate contains the platform-agnostic emulator logic (CPU/MMU/LCD/
//! cartridge). Frontends own the window, input polling and audio, and drive
//! the core one frame at a time via the [`gameboy`] facade.

use std::fmt;
use std::io::Write;
use std::sync::OnceLock;

/// Where in the machine a trace record originated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraceSource {
    Cpu,
    Lcd,
    Mmu,
    Cartridge,
    GameBoy,
}

/// Verbosity of a trace record. `Step` is the per-instruction CPU state dump
/// and fires once per executed opcode; leave it filtered out unless you are
/// chasing a specific program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum TraceLevel {
    Step,
    Info,
    Warn,
}

/// One record handed to the host's sink. The message is only formatted if
/// the sink chooses to render it.
pub struct TraceEvent<'a> {
    pub level: TraceLevel,
    pub source: TraceSource,
    pub message: fmt::Arguments<'a>,
}

/// Receiver for trace records emitted by the core.
///
/// The core never links a logging framework. A host installs a sink once per
/// process and bridges events into whatever it uses (`log`, a file, a ring
/// buffer); with no sink installed every trace site is a cheap branch.
pub trait TraceSink: Send + Sync + 'static {
    fn record(&self, event: TraceEvent<'_>);
}

static TRACE_SINK: OnceLock<Box<dyn TraceSink>> = OnceLock::new();

/// Install the process-wide trace sink.
///
/// Returns the sink back if one was already installed.
pub fn install_trace_sink(sink: Box<dyn TraceSink>) -> Result<(), Box<dyn TraceSink>> {
    TRACE_SINK.set(sink)
}

pub fn trace_enabled() -> bool {
    TRACE_SINK.get().is_some()
}

pub(crate) fn emit_trace(level: TraceLevel, source: TraceSource, message: fmt::Arguments) {
    if let Some(sink) = TRACE_SINK.get() {
        sink.record(TraceEvent {
            level,
            source,
            message,
        });
    }
}

/// Sink that writes one line per record to standard error.
///
/// Convenience for tests and headless hosts:
/// `install_trace_sink(Box::new(StderrSink::new(TraceLevel::Info)))`.
pub struct StderrSink {
    min_level: TraceLevel,
}

impl StderrSink {
    pub fn new(min_level: TraceLevel) -> Self {
        Self { min_level }
    }
}

impl TraceSink for StderrSink {
    fn record(&self, event: TraceEvent<'_>) {
        if event.level >= self.min_level {
            // A torn line on a broken pipe is not worth panicking over.
            let _ = writeln!(
                std::io::stderr(),
                "[{:?}] {:?}: {}",
                event.level,
                event.source,
                event.message
            );
        }
    }
}

macro_rules! core_trace {
    ($source:ident, $($arg:tt)*) => {{
        if crate::trace_enabled() {
            crate::emit_trace(
                crate::TraceLevel::Step,
                crate::TraceSource::$source,
                format_args!($($arg)*),
            );
        }
    }};
}

macro_rules! core_info {
    ($source:ident, $($arg:tt)*) => {{
        if crate::trace_enabled() {
            crate::emit_trace(
                crate::TraceLevel::Info,
                crate::TraceSource::$source,
                format_args!($($arg)*),
            );
        }
    }};
}

macro_rules! core_warn {
    ($source:ident, $($arg:tt)*) => {{
        if crate::trace_enabled() {
            crate::emit_trace(
                crate::TraceLevel::Warn,
                crate::TraceSource::$source,
                format_args!($($arg)*),
            );
        }
    }};
}

/// Cartridge image handling (header parsing, ROM-only mapping).
pub mod cartridge;

/// Sharp LR35902 CPU core.
pub mod cpu;

/// Error types surfaced by the core.
pub mod error;

/// High-level facade that wires the CPU, bus and LCD into a single machine.
pub mod gameboy;

/// LCD controller: scanline schedule and background pixel pipeline.
pub mod lcd;

/// Memory map and hardware plumbing.
pub mod mmu;
