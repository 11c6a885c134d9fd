//! # Presentation Loop Tests
//!
//! A scripted display stands in for a window.

use std::fs;

use mr32sim_core::common::PresentationError;
use mr32sim_core::config::{MmioConfig, VideoConfig};
use mr32sim_core::core::Cpu;
use mr32sim_core::isa::abi::REG_Z;
use mr32sim_core::sim::controller::ExecutionController;
use mr32sim_core::sim::presentation::{
    Display, DisplayEvent, Frame, HeadlessDisplay, present_until_closed, write_ppm,
};
use mr32sim_core::soc::Memory;
use mr32sim_core::soc::mmio::{FRAMENO, MmioWindow};
use mr32sim_core::HaltReason;
use pretty_assertions::assert_eq;

use crate::common::asm::*;
use crate::common::harness::{DATA, ENTRY, RAM_SIZE};

/// Records what it was shown and closes after `close_after` frames.
#[derive(Default)]
struct ScriptedDisplay {
    close_after: Option<u32>,
    fail: bool,
    seen: Vec<(u32, bool)>,
    last_rgba: Vec<u8>,
}

impl Display for ScriptedDisplay {
    fn present(
        &mut self,
        frame: &Frame<'_>,
        finished: bool,
    ) -> Result<DisplayEvent, PresentationError> {
        if self.fail {
            return Err(PresentationError::Backend("window lost".to_string()));
        }
        self.seen.push((frame.number, finished));
        self.last_rgba = frame.rgba.to_vec();
        if self.close_after == Some(frame.number) {
            return Ok(DisplayEvent::CloseRequested);
        }
        Ok(DisplayEvent::Continue)
    }
}

fn video() -> VideoConfig {
    VideoConfig {
        enabled: true,
        addr: DATA,
        width: 2,
        height: 2,
        depth: 8,
        ..VideoConfig::default()
    }
}

fn start(memory: &Memory, words: &[u32]) -> ExecutionController {
    for (i, word) in words.iter().enumerate() {
        memory.store32(ENTRY + i as u32 * 4, *word).unwrap();
    }
    ExecutionController::spawn(Cpu::new(memory.clone(), ENTRY), None).unwrap()
}

fn mmio(memory: &Memory) -> Option<MmioWindow> {
    let config = MmioConfig {
        base: 0x1000,
        ..MmioConfig::default()
    };
    MmioWindow::install(memory, &config).unwrap()
}

#[test]
fn close_request_terminates_the_run() {
    let memory = Memory::new(RAM_SIZE).unwrap();
    let window = mmio(&memory);
    let ctl = start(&memory, &[spin()]);
    let mut display = ScriptedDisplay {
        close_after: Some(2),
        ..ScriptedDisplay::default()
    };

    let frames = present_until_closed(&mut display, &memory, &video(), window, &ctl);
    assert_eq!(frames, 3);
    assert_eq!(
        display.seen.iter().map(|(n, _)| *n).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
    assert_eq!(memory.load32(0x1000 + FRAMENO).unwrap(), 2);
    assert_eq!(ctl.join().reason(), Some(HaltReason::Terminated { pc: ENTRY }));
}

#[test]
fn last_frame_is_presented_after_the_task_finishes() {
    let memory = Memory::new(RAM_SIZE).unwrap();
    let ctl = start(
        &memory,
        &[
            ldi(2, DATA as i32),
            ldhi(3, 0x4030_2000),
            addi(3, 3, 0x10),
            stw(3, 2, 0),
            ret(),
        ],
    );
    let mut display = ScriptedDisplay::default();

    let frames = present_until_closed(&mut display, &memory, &video(), None, &ctl);
    assert!(frames >= 1);
    assert_eq!(frames as usize, display.seen.len());
    let (_, finished) = display.seen.last().copied().unwrap();
    assert!(finished);
    assert!(display.seen[..display.seen.len() - 1].iter().all(|(_, f)| !f));
    assert_eq!(
        display.last_rgba,
        vec![
            0x10, 0x10, 0x10, 0xFF, 0x20, 0x20, 0x20, 0xFF, 0x30, 0x30, 0x30, 0xFF, 0x40, 0x40,
            0x40, 0xFF,
        ]
    );
    assert!(ctl.join().reason().is_some());
}

#[test]
fn backend_failure_leaves_the_cpu_running() {
    let memory = Memory::new(RAM_SIZE).unwrap();
    let ctl = start(&memory, &[spin()]);
    let mut display = ScriptedDisplay {
        fail: true,
        ..ScriptedDisplay::default()
    };

    assert_eq!(present_until_closed(&mut display, &memory, &video(), None, &ctl), 0);
    assert!(!ctl.is_finished());
    ctl.request_termination();
    assert_eq!(ctl.join().reason(), Some(HaltReason::Terminated { pc: ENTRY }));
}

#[test]
fn framebuffer_outside_ram_stops_presenting() {
    let memory = Memory::new(RAM_SIZE).unwrap();
    let ctl = start(&memory, &[addi(1, REG_Z, 3), ret()]);
    let config = VideoConfig {
        addr: RAM_SIZE as u32 - 2,
        ..video()
    };
    let mut display = ScriptedDisplay::default();

    assert_eq!(present_until_closed(&mut display, &memory, &config, None, &ctl), 0);
    assert!(display.seen.is_empty());
    assert_eq!(ctl.join().exit_code(), 3);
}

#[test]
fn headless_display_writes_snapshot_when_finished() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frame.ppm");
    let memory = Memory::new(RAM_SIZE).unwrap();
    memory.store32(DATA, 0x0403_0201).unwrap();
    let ctl = start(&memory, &[ret()]);
    let mut display = HeadlessDisplay::new(1000, Some(path.clone()));

    let frames = present_until_closed(&mut display, &memory, &video(), None, &ctl);
    assert!(frames >= 1);
    let _ = ctl.join();

    let mut expected = b"P6\n2 2\n255\n".to_vec();
    expected.extend_from_slice(&[1, 1, 1, 2, 2, 2, 3, 3, 3, 4, 4, 4]);
    assert_eq!(fs::read(&path).unwrap(), expected);
}

#[test]
fn headless_display_keeps_going_while_running() {
    let mut display = HeadlessDisplay::from_config(&VideoConfig {
        refresh_hz: 1000,
        ..VideoConfig::default()
    });
    let rgba = [0u8; 4];
    let frame = Frame {
        number: 0,
        width: 1,
        height: 1,
        rgba: &rgba,
    };
    assert_eq!(display.present(&frame, false).unwrap(), DisplayEvent::Continue);
    assert_eq!(display.present(&frame, true).unwrap(), DisplayEvent::CloseRequested);
}

#[test]
fn ppm_drops_alpha() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("one.ppm");
    let rgba = [9, 8, 7, 0xFF, 6, 5, 4, 0x00];
    write_ppm(
        &path,
        &Frame {
            number: 5,
            width: 2,
            height: 1,
            rgba: &rgba,
        },
    )
    .unwrap();
    assert_eq!(fs::read(&path).unwrap(), b"P6\n2 1\n255\n\x09\x08\x07\x06\x05\x04".to_vec());
}
