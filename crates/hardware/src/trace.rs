//! Instruction trace records and sinks.
//!
//! The engine emits one [`TraceRecord`] per retired instruction, in execution order. A sink
//! turns records into bytes:
//! 1. **Binary:** Fixed 24-byte little-endian records for offline tools.
//! 2. **Text:** One disassembled line per instruction.
//!
//! Sink failures never halt the engine. The [`Tracer`] logs the first I/O error and disables
//! itself for the rest of the run.

use std::fs::File;
use std::io::{self, BufWriter, Write};

use tracing::warn;

use crate::config::{TraceConfig, TraceFormat};
use crate::isa::abi;
use crate::isa::disasm::format_instruction;
use crate::isa::instruction::Instruction;

/// Size of one binary record in bytes.
pub const BINARY_RECORD_BYTES: usize = 24;

/// Binary flags: a scalar register was written (index in bits 0-4).
pub const FLAG_SCALAR: u32 = 1 << 8;
/// Binary flags: a vector register was written (index in bits 10-14).
pub const FLAG_VECTOR: u32 = 1 << 9;
/// Binary flags: the instruction accessed memory.
pub const FLAG_MEM: u32 = 1 << 16;
/// Binary flags: the memory access was a store.
pub const FLAG_STORE: u32 = 1 << 17;

/// A scalar register write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegDelta {
    /// Register index.
    pub idx: u8,
    /// Value before the instruction.
    pub old: u32,
    /// Value after the instruction.
    pub new: u32,
}

/// Direction of a memory access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemKind {
    /// Data read.
    Load,
    /// Data write.
    Store,
}

/// The (first) memory access of an instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemAccess {
    /// Address of the access (lane 0 for vector accesses).
    pub addr: u32,
    /// Width in bytes of one element.
    pub width: u8,
    /// Load or store.
    pub kind: MemKind,
}

/// One retired instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraceRecord {
    /// Address of the instruction.
    pub pc: u32,
    /// Raw instruction word.
    pub word: u32,
    /// Decoded instruction.
    pub inst: Instruction,
    /// Scalar register write, if any.
    pub scalar: Option<RegDelta>,
    /// Written vector register, if any.
    pub vector: Option<u8>,
    /// Memory access, if any.
    pub mem: Option<MemAccess>,
}

impl TraceRecord {
    /// Packs the record into its 24-byte binary form.
    ///
    /// Layout: `pc`, `word`, `flags`, `old`, `new`, `mem_addr`, each a little-endian `u32`.
    pub fn to_bytes(&self) -> [u8; BINARY_RECORD_BYTES] {
        let mut flags = 0u32;
        let (mut old, mut new) = (0, 0);
        if let Some(d) = self.scalar {
            flags |= FLAG_SCALAR | u32::from(d.idx);
            old = d.old;
            new = d.new;
        }
        if let Some(v) = self.vector {
            flags |= FLAG_VECTOR | (u32::from(v) << 10);
        }
        let mut addr = 0;
        if let Some(m) = self.mem {
            flags |= FLAG_MEM | (u32::from(m.width) << 20);
            if m.kind == MemKind::Store {
                flags |= FLAG_STORE;
            }
            addr = m.addr;
        }
        let mut out = [0u8; BINARY_RECORD_BYTES];
        for (chunk, field) in out
            .chunks_exact_mut(4)
            .zip([self.pc, self.word, flags, old, new, addr])
        {
            chunk.copy_from_slice(&field.to_le_bytes());
        }
        out
    }

    /// Renders the record as one line of text (without the newline).
    pub fn to_text(&self) -> String {
        let mut line = format!(
            "{:08x}: {:08x}  {:<32}",
            self.pc,
            self.word,
            format_instruction(&self.inst, self.word)
        );
        if let Some(d) = self.scalar {
            line.push_str(&format!(
                " {}: {:08x} -> {:08x}",
                abi::name(d.idx as usize),
                d.old,
                d.new
            ));
        }
        if let Some(v) = self.vector {
            line.push_str(&format!(" {}: written", abi::vname(v as usize)));
        }
        if let Some(m) = self.mem {
            let dir = match m.kind {
                MemKind::Load => "load",
                MemKind::Store => "store",
            };
            line.push_str(&format!(" [{dir}{} @ {:08x}]", m.width, m.addr));
        }
        line.trim_end().to_string()
    }
}

/// Destination of trace records.
pub trait TraceSink: Send {
    /// Writes one record.
    fn record(&mut self, rec: &TraceRecord) -> io::Result<()>;

    /// Flushes buffered output.
    fn flush(&mut self) -> io::Result<()>;
}

/// Writes 24-byte binary records.
#[derive(Debug)]
pub struct BinaryTrace<W: Write> {
    out: W,
}

impl<W: Write> BinaryTrace<W> {
    /// Wraps a writer.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> TraceSink for BinaryTrace<W> {
    fn record(&mut self, rec: &TraceRecord) -> io::Result<()> {
        self.out.write_all(&rec.to_bytes())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// Writes one disassembled line per record.
#[derive(Debug)]
pub struct TextTrace<W: Write> {
    out: W,
}

impl<W: Write> TextTrace<W> {
    /// Wraps a writer.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> TraceSink for TextTrace<W> {
    fn record(&mut self, rec: &TraceRecord) -> io::Result<()> {
        writeln!(self.out, "{}", rec.to_text())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// Opens the sink described by `config`, or `None` when tracing is off.
pub fn open_sink(config: &TraceConfig) -> io::Result<Option<Box<dyn TraceSink>>> {
    let Some(path) = &config.path else {
        return Ok(None);
    };
    let file = BufWriter::new(File::create(path)?);
    let sink: Box<dyn TraceSink> = match config.format {
        TraceFormat::Binary => Box::new(BinaryTrace::new(file)),
        TraceFormat::Text => Box::new(TextTrace::new(file)),
    };
    Ok(Some(sink))
}

/// Engine-side trace state. Disables itself after the first sink error.
#[derive(Default)]
pub struct Tracer {
    sink: Option<Box<dyn TraceSink>>,
}

impl std::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracer")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

impl Tracer {
    /// Creates a tracer writing to `sink`.
    pub fn new(sink: Option<Box<dyn TraceSink>>) -> Self {
        Self { sink }
    }

    /// Whether records are still being written.
    #[inline(always)]
    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// Emits a record.
    pub fn emit(&mut self, rec: &TraceRecord) {
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        if let Err(e) = sink.record(rec) {
            warn!(error = %e, "trace sink failed, tracing disabled");
            self.sink = None;
        }
    }

    /// Flushes the sink, disabling it on error.
    pub fn flush(&mut self) {
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        if let Err(e) = sink.flush() {
            warn!(error = %e, "trace sink flush failed, tracing disabled");
            self.sink = None;
        }
    }
}
