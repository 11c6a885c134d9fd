//! # Instruction Trace Tests
//!
//! Record encodings, the file sinks and engine integration.

use std::fs;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use mr32sim_core::config::{TraceConfig, TraceFormat};
use mr32sim_core::core::Cpu;
use mr32sim_core::isa::abi::REG_Z;
use mr32sim_core::isa::decode::decode;
use mr32sim_core::isa::opcodes as op;
use mr32sim_core::soc::Memory;
use mr32sim_core::trace::{
    BinaryTrace, MemAccess, MemKind, RegDelta, TextTrace, TraceRecord, Tracer, BINARY_RECORD_BYTES,
    FLAG_MEM, FLAG_SCALAR, FLAG_STORE, FLAG_VECTOR, open_sink,
};
use mr32sim_core::HaltReason;
use pretty_assertions::assert_eq;

use crate::common::asm::*;
use crate::common::harness::{DATA, ENTRY, RAM_SIZE};

/// Writer whose bytes stay readable after the sink is boxed into the engine.
#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    fn bytes(&self) -> Vec<u8> {
        self.0.lock().unwrap().clone()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct BrokenPipe;

impl Write for BrokenPipe {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }
}

fn word_at(bytes: &[u8], rec: usize, field: usize) -> u32 {
    let off = rec * BINARY_RECORD_BYTES + field * 4;
    u32::from_le_bytes(bytes[off..off + 4].try_into().unwrap())
}

/// `r2 = DATA; r1 = 7; [r2] = r1; return`
fn store_program() -> [u32; 4] {
    [
        ldi(2, DATA as i32),
        addi(1, REG_Z, 7),
        stw(1, 2, 0),
        ret(),
    ]
}

fn traced_cpu(tracer: Tracer) -> Cpu {
    let memory = Memory::new(RAM_SIZE).unwrap();
    for (i, word) in store_program().iter().enumerate() {
        memory.store32(ENTRY + i as u32 * 4, *word).unwrap();
    }
    Cpu::new(memory, ENTRY).with_tracer(tracer)
}

#[test]
fn binary_layout_packs_scalar_and_store() {
    let word = addi(5, REG_Z, 1);
    let rec = TraceRecord {
        pc: 0x1000,
        word,
        inst: decode(word).unwrap(),
        scalar: Some(RegDelta {
            idx: 5,
            old: 0xAAAA_AAAA,
            new: 1,
        }),
        vector: None,
        mem: Some(MemAccess {
            addr: 0x4000,
            width: 2,
            kind: MemKind::Store,
        }),
    };
    let bytes = rec.to_bytes();
    assert_eq!(word_at(&bytes, 0, 0), 0x1000);
    assert_eq!(word_at(&bytes, 0, 1), word);
    assert_eq!(
        word_at(&bytes, 0, 2),
        FLAG_SCALAR | 5 | FLAG_MEM | (2 << 20) | FLAG_STORE
    );
    assert_eq!(word_at(&bytes, 0, 3), 0xAAAA_AAAA);
    assert_eq!(word_at(&bytes, 0, 4), 1);
    assert_eq!(word_at(&bytes, 0, 5), 0x4000);
}

#[test]
fn binary_layout_marks_vector_writes() {
    let word = valu_vv(op::ADD, 3, 1, 2);
    let rec = TraceRecord {
        pc: 0,
        word,
        inst: decode(word).unwrap(),
        scalar: None,
        vector: Some(3),
        mem: None,
    };
    let bytes = rec.to_bytes();
    assert_eq!(word_at(&bytes, 0, 2), FLAG_VECTOR | (3 << 10));
    assert_eq!(&bytes[12..], &[0u8; 12]);
}

#[test]
fn text_lines_show_effects() {
    let word = valu_vv(op::ADD, 3, 1, 2);
    let rec = TraceRecord {
        pc: 0x200,
        word,
        inst: decode(word).unwrap(),
        scalar: None,
        vector: Some(3),
        mem: None,
    };
    assert_eq!(
        rec.to_text(),
        format!("00000200: {word:08x}  {:<32} v3: written", "add.vv v3, v1, v2")
    );

    let word = ret();
    let rec = TraceRecord {
        pc: 0x20c,
        word,
        inst: decode(word).unwrap(),
        scalar: None,
        vector: None,
        mem: None,
    };
    assert_eq!(rec.to_text(), "0000020c: e3c00000  j lr, #0");
}

#[test]
fn engine_emits_one_binary_record_per_instruction() {
    let buf = SharedBuf::default();
    let mut cpu = traced_cpu(Tracer::new(Some(Box::new(BinaryTrace::new(buf.clone())))));
    assert_eq!(cpu.run(None), HaltReason::Returned { status: 7 });

    let bytes = buf.bytes();
    assert_eq!(bytes.len(), 4 * BINARY_RECORD_BYTES);

    for (i, word) in store_program().iter().enumerate() {
        assert_eq!(word_at(&bytes, i, 0), ENTRY + i as u32 * 4);
        assert_eq!(word_at(&bytes, i, 1), *word);
    }
    // ldi r2
    assert_eq!(word_at(&bytes, 0, 2), FLAG_SCALAR | 2);
    assert_eq!(word_at(&bytes, 0, 4), DATA);
    // add r1
    assert_eq!(word_at(&bytes, 1, 2), FLAG_SCALAR | 1);
    assert_eq!(word_at(&bytes, 1, 4), 7);
    // stw
    assert_eq!(word_at(&bytes, 2, 2), FLAG_MEM | (4 << 20) | FLAG_STORE);
    assert_eq!(word_at(&bytes, 2, 5), DATA);
    // j lr
    assert_eq!(word_at(&bytes, 3, 2), 0);
}

#[test]
fn text_trace_through_config_sink() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.trace");
    let config = TraceConfig {
        path: Some(path.clone()),
        format: TraceFormat::Text,
    };
    let sink = open_sink(&config).unwrap();
    let mut cpu = traced_cpu(Tracer::new(sink));
    assert_eq!(cpu.run(None), HaltReason::Returned { status: 7 });
    drop(cpu);

    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("00000200: "));
    assert!(lines[0].ends_with("r2: 00000000 -> 00004000"), "{}", lines[0]);
    assert!(lines[1].contains("add r1, z, #7"));
    assert!(lines[2].contains("stw r1, [r2, #0]"));
    assert!(lines[2].ends_with("[store4 @ 00004000]"), "{}", lines[2]);
    assert!(lines[3].ends_with("j lr, #0"));
}

#[test]
fn binary_trace_through_config_sink() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.bin");
    let config = TraceConfig {
        path: Some(path.clone()),
        format: TraceFormat::Binary,
    };
    let mut cpu = traced_cpu(Tracer::new(open_sink(&config).unwrap()));
    let _ = cpu.run(None);
    drop(cpu);
    assert_eq!(fs::read(&path).unwrap().len(), 4 * BINARY_RECORD_BYTES);
}

#[test]
fn no_path_means_no_sink() {
    assert!(open_sink(&TraceConfig::default()).unwrap().is_none());
    assert!(!Tracer::new(None).is_enabled());
}

#[test]
fn failing_sink_disables_tracing_without_halting() {
    let mut tracer = Tracer::new(Some(Box::new(TextTrace::new(BrokenPipe))));
    assert!(tracer.is_enabled());
    let word = ret();
    tracer.emit(&TraceRecord {
        pc: 0,
        word,
        inst: decode(word).unwrap(),
        scalar: None,
        vector: None,
        mem: None,
    });
    assert!(!tracer.is_enabled());

    let mut cpu = traced_cpu(Tracer::new(Some(Box::new(BinaryTrace::new(BrokenPipe)))));
    assert_eq!(cpu.run(None), HaltReason::Returned { status: 7 });
    assert_eq!(cpu.stats().instructions_retired, 4);
    assert_eq!(cpu.memory().load32(DATA).unwrap(), 7);
}

#[test]
fn into_inner_returns_writer() {
    let mut sink = BinaryTrace::new(Vec::new());
    let word = ret();
    let rec = TraceRecord {
        pc: 4,
        word,
        inst: decode(word).unwrap(),
        scalar: None,
        vector: None,
        mem: None,
    };
    mr32sim_core::trace::TraceSink::record(&mut sink, &rec).unwrap();
    assert_eq!(sink.into_inner(), rec.to_bytes().to_vec());
}
