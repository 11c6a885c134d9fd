//! Presentation Seam.
//!
//! The presentation collaborator runs on the invoking thread while the CPU task runs. Once per
//! frame the loop:
//! 1. **Publishes the frame number** into the MMIO `FRAMENO` word.
//! 2. **Rasterizes** the framebuffer window into an RGBA image.
//! 3. **Presents** it through a [`Display`] implementation.
//!
//! A close request from the display terminates the simulation. A presentation failure only ends
//! the loop; the simulation keeps running headless until it halts.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, error};

use crate::common::error::PresentationError;
use crate::config::VideoConfig;
use crate::sim::controller::ExecutionController;
use crate::soc::memory::Memory;
use crate::soc::mmio::MmioWindow;
use crate::soc::video::Framebuffer;

/// One rasterized frame.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
    /// Sequence number, starting at 0.
    pub number: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Packed RGBA8 pixels, row-major.
    pub rgba: &'a [u8],
}

/// What the display wants after a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayEvent {
    /// Keep presenting.
    Continue,
    /// The user closed the display; stop the simulation.
    CloseRequested,
}

/// A presentation backend.
pub trait Display {
    /// Shows `frame`. `finished` is true once the CPU task has ended.
    fn present(
        &mut self,
        frame: &Frame<'_>,
        finished: bool,
    ) -> Result<DisplayEvent, PresentationError>;
}

/// Runs the presentation loop until the display closes, the CPU task finishes or presenting
/// fails.
///
/// # Returns
///
/// The number of frames presented.
pub fn present_until_closed(
    display: &mut dyn Display,
    memory: &Memory,
    video: &VideoConfig,
    mmio: Option<MmioWindow>,
    controller: &ExecutionController,
) -> u32 {
    let fb = Framebuffer::from(video);
    let mut rgba = Vec::new();
    let mut number = 0u32;
    loop {
        let finished = controller.is_finished();
        if let Err(e) = mmio.map_or(Ok(()), |w| w.set_frame_number(memory, number)) {
            debug!(error = %e, "frame counter not updated");
        }

        if let Err(e) = fb.rasterize(memory, &mut rgba) {
            error!(error = %PresentationError::from(e), "presentation stopped, continuing headless");
            return number;
        }
        let frame = Frame {
            number,
            width: fb.width,
            height: fb.height,
            rgba: &rgba,
        };
        match display.present(&frame, finished) {
            Ok(DisplayEvent::Continue) => {}
            Ok(DisplayEvent::CloseRequested) => {
                controller.request_termination();
                return number + 1;
            }
            Err(e) => {
                error!(error = %e, "presentation stopped, continuing headless");
                return number;
            }
        }
        number = number.wrapping_add(1);
        if finished {
            return number;
        }
    }
}

/// Display without a window: paces frames at the refresh rate and closes once the simulation
/// has finished, optionally saving the last frame.
#[derive(Debug)]
pub struct HeadlessDisplay {
    interval: Duration,
    last: Option<Instant>,
    snapshot: Option<PathBuf>,
}

impl HeadlessDisplay {
    /// Creates a headless display.
    pub fn new(refresh_hz: u32, snapshot: Option<PathBuf>) -> Self {
        Self {
            interval: Duration::from_secs(1) / refresh_hz.max(1),
            last: None,
            snapshot,
        }
    }

    /// Builds a headless display from the video configuration.
    pub fn from_config(video: &VideoConfig) -> Self {
        Self::new(video.refresh_hz, video.snapshot.clone())
    }

    fn pace(&mut self) {
        if let Some(last) = self.last {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                thread::sleep(self.interval - elapsed);
            }
        }
        self.last = Some(Instant::now());
    }
}

impl Display for HeadlessDisplay {
    fn present(
        &mut self,
        frame: &Frame<'_>,
        finished: bool,
    ) -> Result<DisplayEvent, PresentationError> {
        if !finished {
            self.pace();
            return Ok(DisplayEvent::Continue);
        }
        if let Some(path) = &self.snapshot {
            write_ppm(path, frame)?;
            debug!(path = %path.display(), frame = frame.number, "snapshot written");
        }
        Ok(DisplayEvent::CloseRequested)
    }
}

/// Writes `frame` as a binary (P6) PPM image, dropping alpha.
pub fn write_ppm(path: &Path, frame: &Frame<'_>) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write!(out, "P6\n{} {}\n255\n", frame.width, frame.height)?;
    for px in frame.rgba.chunks_exact(4) {
        out.write_all(&px[..3])?;
    }
    out.flush()
}
