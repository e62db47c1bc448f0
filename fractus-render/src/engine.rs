use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use fractus_core::Complex;

use crate::error::RenderError;
use crate::settings::RenderSettings;
use crate::shade::Shader;

/// Minimum wall time between pixel-block flushes. One event per pixel would
/// be far too chatty and one event per frame far too unresponsive; a fixed
/// cadence of buffered rows keeps the consumer painting steadily.
pub const FLUSH_INTERVAL: Duration = Duration::from_millis(200);

/// Commands consumed by the engine worker.
///
/// A `Draw` always supersedes any in-flight run: the worker drains its
/// queue at run start and checks it again at every row boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EngineCommand {
    Draw { id: u64, settings: RenderSettings },
    Shutdown,
}

/// Events streamed back to the submitting side.
///
/// Events carry the id of the run that produced them; a consumer that has
/// submitted a newer run simply discards events tagged with older ids —
/// the engine does not guarantee suppression of in-flight output from a
/// superseded run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EngineEvent {
    /// Emitted after every completed row, independently of block flushes.
    Progress {
        id: u64,
        rows_completed: u32,
        total_rows: u32,
        elapsed_ms: u64,
    },
    /// A block of finished rows. `pixels` is RGBA, row-major,
    /// `width * block_height * 4` bytes; each block is self-describing so
    /// the consumer can blit it without any prior block.
    Update {
        id: u64,
        origin_row: u32,
        block_height: u32,
        width: u32,
        pixels: Vec<u8>,
    },
    /// Emitted exactly once per completed (non-superseded) run.
    Done { id: u64 },
}

/// Handle to the background render worker.
///
/// The engine owns a dedicated OS thread and communicates exclusively via
/// channels: settings snapshots in, progress/pixel-block/done events out.
/// Dropping the handle shuts the worker down.
pub struct Engine {
    tx: Sender<EngineCommand>,
    rx: Receiver<EngineEvent>,
    next_id: u64,
    worker: Option<JoinHandle<()>>,
}

impl Engine {
    /// Spawn the worker thread.
    pub fn spawn() -> Self {
        let (tx_cmd, rx_cmd) = mpsc::channel();
        let (tx_evt, rx_evt) = mpsc::channel();
        let worker = thread::spawn(move || engine_loop(rx_cmd, tx_evt));
        Self {
            tx: tx_cmd,
            rx: rx_evt,
            next_id: 0,
            worker: Some(worker),
        }
    }

    /// Submit a settings snapshot, superseding any in-flight run.
    ///
    /// The snapshot is moved into the engine and owned by it for the run's
    /// duration; callers keep (and may freely edit) their own copy.
    /// Returns the id that this run's events will carry.
    pub fn submit(&mut self, settings: RenderSettings) -> crate::Result<u64> {
        self.next_id += 1;
        let id = self.next_id;
        self.tx
            .send(EngineCommand::Draw { id, settings })
            .map_err(|_| RenderError::EngineDisconnected)?;
        Ok(id)
    }

    /// The event stream. Within one run, `Update` events arrive in strictly
    /// increasing row order and `Progress` events are monotonic.
    pub fn events(&self) -> &Receiver<EngineEvent> {
        &self.rx
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        let _ = self.tx.send(EngineCommand::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Render a full frame synchronously into an RGBA buffer.
///
/// This is the same per-pixel pipeline the engine runs, without the
/// chunking; useful for headless rendering and tests.
pub fn render_frame(settings: &RenderSettings) -> Vec<u8> {
    let shader = shader_for(settings);
    let width = settings.width();
    let height = settings.height();
    let mut pixels = vec![0u8; width as usize * height as usize * 4];
    pixels
        .par_chunks_mut(width as usize * 4)
        .enumerate()
        .for_each(|(y, row)| {
            render_row(settings, &shader, y as u32, row);
        });
    pixels
}

fn shader_for(settings: &RenderSettings) -> Shader {
    Shader::new(
        settings.gradient.clone(),
        settings.gradient_settings.iters_per_cycle,
        settings.iter.smooth,
        settings.fractal.escape_power(),
    )
}

/// Compute one row of pixels. Columns fan out over the rayon pool; the
/// caller's row order is what guarantees event ordering.
fn render_row(settings: &RenderSettings, shader: &Shader, y: u32, row: &mut [u8]) {
    let frame = settings.frame();
    let step = settings.complex_iter();
    let re_min = frame.re_min();
    let im = frame.im_min() + y as f64 * step;
    let fractal = settings.fractal;
    let iter = settings.iter;

    row.par_chunks_mut(4).enumerate().for_each(|(x, px)| {
        let point = Complex::new(re_min + x as f64 * step, im);
        let color = shader.shade(fractal.iterate(point, &iter));
        px.copy_from_slice(&color);
    });
}

enum RunOutcome {
    Completed,
    Superseded { id: u64, settings: Box<RenderSettings> },
    Shutdown,
}

fn engine_loop(rx: Receiver<EngineCommand>, tx: Sender<EngineEvent>) {
    let mut pending: Option<(u64, Box<RenderSettings>)> = None;
    loop {
        let (mut id, mut settings) = match pending.take() {
            Some(job) => job,
            None => match rx.recv() {
                Ok(EngineCommand::Draw { id, settings }) => (id, Box::new(settings)),
                Ok(EngineCommand::Shutdown) | Err(_) => return,
            },
        };

        // Only the newest queued request matters; everything older is
        // superseded before it ever starts.
        loop {
            match rx.try_recv() {
                Ok(EngineCommand::Draw {
                    id: newer_id,
                    settings: newer,
                }) => {
                    debug!(superseded = id, by = newer_id, "Skipping stale request");
                    id = newer_id;
                    settings = Box::new(newer);
                }
                Ok(EngineCommand::Shutdown) => return,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return,
            }
        }

        match run(id, &settings, &rx, &tx) {
            RunOutcome::Completed => {}
            RunOutcome::Superseded { id, settings } => pending = Some((id, settings)),
            RunOutcome::Shutdown => return,
        }
    }
}

/// Execute one render run: rows top-to-bottom, a progress event per row,
/// pixel blocks flushed on the 200 ms cadence, a final `Done`.
fn run(
    id: u64,
    settings: &RenderSettings,
    rx: &Receiver<EngineCommand>,
    tx: &Sender<EngineEvent>,
) -> RunOutcome {
    let start = Instant::now();
    let width = settings.width();
    let height = settings.height();
    let shader = shader_for(settings);

    info!(
        id,
        width,
        height,
        fractal = settings.fractal.ty().label(),
        max_iter = settings.iter.max_iterations,
        "Starting progressive render"
    );

    let row_bytes = width as usize * 4;
    let mut chunk: Vec<u8> = Vec::with_capacity(row_bytes * 8);
    let mut chunk_origin: u32 = 0;
    let mut last_flush = Instant::now();

    for y in 0..height {
        // Row boundaries double as cancellation checkpoints: a newer Draw
        // supersedes this run, which restarts from row 0 with the new
        // snapshot — there is no partial-state resume.
        match rx.try_recv() {
            Ok(EngineCommand::Draw {
                id: newer_id,
                settings: newer,
            }) => {
                info!(superseded = id, by = newer_id, row = y, "Render superseded");
                return RunOutcome::Superseded {
                    id: newer_id,
                    settings: Box::new(newer),
                };
            }
            Ok(EngineCommand::Shutdown) | Err(TryRecvError::Disconnected) => {
                return RunOutcome::Shutdown
            }
            Err(TryRecvError::Empty) => {}
        }

        let chunk_len = chunk.len();
        chunk.resize(chunk_len + row_bytes, 0);
        render_row(settings, &shader, y, &mut chunk[chunk_len..]);

        let rows_completed = y + 1;
        let is_final_row = rows_completed == height;
        if is_final_row || last_flush.elapsed() >= FLUSH_INTERVAL {
            let block_height = rows_completed - chunk_origin;
            debug!(id, origin_row = chunk_origin, block_height, "Flushing pixel block");
            let sent = tx.send(EngineEvent::Update {
                id,
                origin_row: chunk_origin,
                block_height,
                width,
                pixels: std::mem::take(&mut chunk),
            });
            if sent.is_err() {
                return RunOutcome::Shutdown;
            }
            chunk_origin = rows_completed;
            last_flush = Instant::now();
        }

        let progress = tx.send(EngineEvent::Progress {
            id,
            rows_completed,
            total_rows: height,
            elapsed_ms: start.elapsed().as_millis() as u64,
        });
        if progress.is_err() {
            return RunOutcome::Shutdown;
        }
    }

    info!(id, elapsed_ms = start.elapsed().as_millis() as u64, "Render complete");
    if tx.send(EngineEvent::Done { id }).is_err() {
        return RunOutcome::Shutdown;
    }
    RunOutcome::Completed
}
