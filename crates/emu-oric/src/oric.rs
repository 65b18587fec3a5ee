//! Top-level Oric system.
//!
//! The ULA and the CPU share one 1 MHz clock. Each cycle the ULA scans
//! memory first, then the CPU gets the bus.
//!
//! # Frame loop
//!
//! `run_frame()` steps until the ULA signals frame complete. One frame is
//! 312 x 64 = 19,968 cycles at 50 Hz, or 264 x 64 = 16,896 at 60 Hz; the
//! program can switch between the two mid-frame.

use std::fs;

use emu_core::{Cpu, Observable, Tickable, Value, parse_address};
use log::info;
use oric_ula::{DoubleBufferSink, FrameReader, FrameSink, TimingProfile, Ula, double_buffer};

use crate::bus::OricBus;
use crate::config::{OricConfig, OricModel};
use crate::cpu::IdleCpu;
use crate::error::OricError;
use crate::memory::OricMemory;

/// Oric system.
pub struct Oric<C: Cpu = IdleCpu, S: FrameSink = DoubleBufferSink> {
    cpu: C,
    bus: OricBus,
    ula: Ula<S>,
    model: OricModel,
    /// Cycles since power-on.
    cycles: u64,
    /// Completed frames.
    frames: u64,
}

impl Oric {
    /// Build the machine described by `config`, reading its ROM file if it
    /// names one. Returns the machine and the reader for its frames.
    pub fn new(config: &OricConfig) -> Result<(Self, FrameReader), OricError> {
        let rom = config.rom.as_deref().map(fs::read).transpose()?;
        let ula_config = config.ula_config();
        let (sink, reader) = double_buffer(ula_config.geometry, ula_config.format);
        let oric = Self::with_sink(config, IdleCpu::new(), sink, rom.as_deref())?;
        Ok((oric, reader))
    }
}

impl<C: Cpu, S: FrameSink> Oric<C, S> {
    /// Build a machine around a given processor and frame sink.
    pub fn with_sink(
        config: &OricConfig,
        mut cpu: C,
        sink: S,
        rom: Option<&[u8]>,
    ) -> Result<Self, OricError> {
        let mut memory = OricMemory::new(config.ram);
        if let Some(rom) = rom {
            memory.install_rom(rom)?;
        }
        let mut bus = OricBus::new(memory);
        cpu.reset(&mut bus);

        info!(
            "{:?}: {:?} RAM, {} Hz, reset to ${:04X}",
            config.model,
            config.ram,
            config.timing.frames_per_second(),
            cpu.pc()
        );

        Ok(Self {
            cpu,
            bus,
            ula: Ula::new(config.timing, sink),
            model: config.model,
            cycles: 0,
            frames: 0,
        })
    }

    /// Run one 1 MHz cycle. Returns true if it completed a frame.
    pub fn step(&mut self) -> bool {
        let frame_done = self.ula.step(&self.bus);
        self.cpu.set_irq(self.bus.irq());
        self.cpu.tick(&mut self.bus);
        self.cycles += 1;
        if frame_done {
            self.frames += 1;
        }
        frame_done
    }

    /// Run until the ULA completes a frame. Returns the cycles taken.
    pub fn run_frame(&mut self) -> u64 {
        let start = self.cycles;
        while !self.step() {}
        self.cycles - start
    }

    /// Run `count` frames back to back with no pacing. Returns the cycles
    /// taken.
    pub fn run_frames_warp(&mut self, count: u32) -> u64 {
        (0..count).map(|_| self.run_frame()).sum()
    }

    /// Copy a raw image into RAM, as a tape or snapshot loader would.
    pub fn load_ram(&mut self, address: u16, data: &[u8]) -> Result<(), OricError> {
        self.bus.memory.load_ram(address, data)
    }

    #[must_use]
    pub fn cpu(&self) -> &C {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut C {
        &mut self.cpu
    }

    #[must_use]
    pub fn bus(&self) -> &OricBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut OricBus {
        &mut self.bus
    }

    #[must_use]
    pub fn ula(&self) -> &Ula<S> {
        &self.ula
    }

    #[must_use]
    pub fn model(&self) -> OricModel {
        self.model
    }

    /// Current frame timing; follows the program's mode attributes.
    #[must_use]
    pub fn timing(&self) -> TimingProfile {
        self.ula.timing()
    }

    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl<C: Cpu, S: FrameSink> Tickable for Oric<C, S> {
    fn tick(&mut self) {
        self.step();
    }
}

impl<C: Cpu, S: FrameSink> Observable for Oric<C, S> {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("ula.") {
            self.ula.query(rest)
        } else if let Some(rest) = path.strip_prefix("memory.") {
            parse_address(rest).map(|addr| Value::U8(self.bus.peek(addr)))
        } else {
            match path {
                "cpu.pc" => Some(self.cpu.pc().into()),
                "cycles" => Some(self.cycles.into()),
                "frames" => Some(self.frames.into()),
                _ => None,
            }
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "ula.<ula_paths>",
            "memory.<address>",
            "cpu.pc",
            "cycles",
            "frames",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{RamSize, ROM_SIZE};
    use oric_ula::{CallbackSink, WINDOW_PIXELS};

    fn make_oric() -> (Oric, FrameReader) {
        Oric::new(&OricConfig::default()).unwrap()
    }

    #[test]
    fn run_frame_returns_cycle_count() {
        let (mut oric, _reader) = make_oric();
        assert_eq!(oric.run_frame(), 19_968);
        assert_eq!(oric.frames(), 1);
        assert_eq!(oric.cpu().cycles(), 19_968, "CPU ticks once per cycle");
    }

    #[test]
    fn sixty_hz_config_shortens_frames() {
        let config = OricConfig {
            timing: TimingProfile::Hz60,
            ..OricConfig::default()
        };
        let (mut oric, _reader) = Oric::new(&config).unwrap();
        assert_eq!(oric.run_frame(), 16_896);
    }

    #[test]
    fn warp_runs_frames_back_to_back() {
        let (mut oric, mut reader) = make_oric();
        assert_eq!(oric.run_frames_warp(3), 3 * 19_968);
        assert_eq!(reader.frames_published(), 3);
        assert_eq!(reader.frames_dropped(), 2);
        assert_eq!(reader.poll_frame().map(<[u32]>::len), Some(WINDOW_PIXELS));
    }

    #[test]
    fn reset_vector_comes_from_rom() {
        let mut rom = vec![0u8; ROM_SIZE];
        rom[0x3FFC] = 0x00;
        rom[0x3FFD] = 0xF8;
        let sink = CallbackSink::new(|_, _| {}, || {});
        let oric =
            Oric::with_sink(&OricConfig::default(), IdleCpu::new(), sink, Some(rom.as_slice()))
                .unwrap();
        assert_eq!(oric.cpu().pc(), 0xF800);
        assert_eq!(oric.query("cpu.pc"), Some(Value::U16(0xF800)));
    }

    #[test]
    fn short_rom_is_rejected() {
        let sink = CallbackSink::new(|_, _| {}, || {});
        let short = [0u8; 100];
        let result = Oric::with_sink(&OricConfig::default(), IdleCpu::new(), sink, Some(&short[..]));
        assert!(matches!(result, Err(OricError::RomSize(100))));
    }

    #[test]
    fn observable_routes_to_components() {
        let (mut oric, _reader) = make_oric();
        oric.load_ram(0xBB80, &[0x41]).unwrap();
        oric.tick_n(64 * 10);

        assert_eq!(oric.query("ula.vcount"), Some(Value::U16(10)));
        assert_eq!(oric.query("ula.window_line"), Some(Value::I16(1)));
        assert_eq!(oric.query("memory.0xBB80"), Some(Value::U8(0x41)));
        assert_eq!(oric.query("memory.$0300"), Some(Value::U8(0xFF)));
        assert_eq!(oric.query("cycles"), Some(Value::U64(640)));
        assert_eq!(oric.query("ula.nonsense"), None);
        assert_eq!(oric.query("nonsense"), None);
    }

    #[test]
    fn video_reads_ram_hidden_from_cpu() {
        let config = OricConfig {
            ram: RamSize::Ram16K,
            ..OricConfig::default()
        };
        let mut dots = vec![0u8; WINDOW_PIXELS];
        {
            let sink = CallbackSink::new(|offset, colour| dots[offset] = colour, || {});
            let mut oric = Oric::with_sink(&config, IdleCpu::new(), sink, None).unwrap();
            // Paper blue at the start of the top text row.
            oric.load_ram(0xBB80, &[0x14]).unwrap();
            assert_eq!(oric.query("memory.0xBB80"), Some(Value::U8(0xFF)));
            oric.run_frame();
        }
        assert_eq!(dots[0], oric_ula::BLUE);
    }
}
