pub mod handoff;
pub mod runner;
pub mod stage;
pub mod stages;
pub mod state;

use std::panic;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::image_buf::ImageBuf;
use handoff::{HandoffReceiver, HandoffSender, handoff};
use stage::Stage;
use state::{PipelineState, StateTracker};

/// Staged image pipeline.
///
/// ```text
/// decode -> [Grayscale] -> [Blur] -> encode
///             worker 0      worker 1
/// ```
///
/// Each stage runs on its own thread, one at a time. The in-flight image moves
/// into the stage through a single-slot hand-off and comes back out through
/// another; the orchestrator only dispatches stage i+1 after it has received
/// stage i's output and joined its worker.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

/// Body of a stage's worker thread.
type Worker = fn(&dyn Stage, HandoffReceiver, HandoffSender) -> anyhow::Result<()>;

/// Wall-clock time a stage took, from dispatch to receipt of its output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StageTiming {
    pub stage: String,
    pub elapsed: Duration,
}

impl std::fmt::Display for StageTiming {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} took {:?}", self.stage, self.elapsed)
    }
}

/// Result of a successful run.
#[derive(Debug)]
pub struct PipelineOutput {
    pub image: ImageBuf,
    pub timings: Vec<StageTiming>,
    /// Every state the run passed through, starting at `Idle`.
    pub trace: Vec<PipelineState>,
}

impl PipelineOutput {
    pub fn timing(&self, stage: &str) -> Option<Duration> {
        self.timings
            .iter()
            .find(|t| t.stage == stage)
            .map(|t| t.elapsed)
    }
}

impl Pipeline {
    /// Grayscale followed by a radius-5 blur.
    pub fn standard() -> Self {
        Self::from_config(&PipelineConfig::default())
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::with_stages(vec![
            Box::new(stages::Grayscale),
            Box::new(stages::Blur::new(config.blur_radius)),
        ])
    }

    pub fn with_stages(stages: Vec<Box<dyn Stage>>) -> Self {
        Self { stages }
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run every stage on its own worker thread, in order.
    ///
    /// Panics (on the calling thread) if a stage is handed an empty image.
    pub fn run(&self, input: ImageBuf) -> Result<PipelineOutput, PipelineError> {
        self.run_with(input, runner::run_stage)
    }

    fn run_with(&self, input: ImageBuf, worker: Worker) -> Result<PipelineOutput, PipelineError> {
        let mut tracker = StateTracker::new(self.stages.len());
        let mut timings = Vec::with_capacity(self.stages.len());
        let mut current = input;

        for (i, stage) in self.stages.iter().enumerate() {
            tracker.advance(PipelineState::StageRunning(i));
            let expected = current.dimensions();

            let (image, elapsed) = match dispatch(stage.as_ref(), current, worker) {
                Ok(done) => done,
                Err(err) => {
                    tracker.advance(PipelineState::Failed(i));
                    return Err(err);
                }
            };
            if image.dimensions() != expected {
                tracker.advance(PipelineState::Failed(i));
                return Err(PipelineError::DimensionsChanged {
                    stage: stage.name().to_string(),
                    expected,
                    actual: image.dimensions(),
                });
            }

            tracker.advance(PipelineState::StageComplete(i));
            info!(
                stage = stage.name(),
                elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                "stage complete"
            );
            timings.push(StageTiming {
                stage: stage.name().to_string(),
                elapsed,
            });
            current = image;
        }

        tracker.advance(PipelineState::Done);
        debug!(state = ?tracker.state(), stages = self.stages.len(), "pipeline finished");

        Ok(PipelineOutput {
            image: current,
            timings,
            trace: tracker.into_trace(),
        })
    }

    /// Apply the same stages by direct composition on the calling thread.
    pub fn run_sequential(&self, input: ImageBuf) -> Result<ImageBuf, PipelineError> {
        let mut current = input;
        for stage in &self.stages {
            debug!(stage = stage.name(), "processing");
            current = stage
                .apply(current)
                .map_err(|source| PipelineError::StageFailed {
                    stage: stage.name().to_string(),
                    source,
                })?;
        }
        Ok(current)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::standard()
    }
}

/// Start a worker running `stage`, hand it `image`, and wait for its output.
fn dispatch(
    stage: &dyn Stage,
    image: ImageBuf,
    worker: Worker,
) -> Result<(ImageBuf, Duration), PipelineError> {
    let name = stage.name();
    let (in_tx, in_rx) = handoff();
    let (out_tx, out_rx) = handoff();

    thread::scope(|s| -> Result<(ImageBuf, Duration), PipelineError> {
        let start = Instant::now();
        let handle = thread::Builder::new()
            .name(format!("stage-{name}"))
            .spawn_scoped(s, move || worker(stage, in_rx, out_tx))
            .map_err(|source| PipelineError::Spawn {
                stage: name.to_string(),
                source,
            })?;
        // A worker that hung up on its input publishes nothing, so the
        // receive below reports the closed hand-off.
        if in_tx.send(image).is_err() {
            debug!(stage = name, "worker dropped its input hand-off");
        }
        debug!(stage = name, "stage dispatched");

        let received = out_rx.recv();
        let elapsed = start.elapsed();
        let image = settle(name, received, handle.join())?;
        Ok((image, elapsed))
    })
}

/// Decide the outcome of a stage from what arrived on its hand-off and how
/// its worker exited. A worker panic is re-raised here.
fn settle(
    stage: &str,
    received: Option<ImageBuf>,
    joined: thread::Result<anyhow::Result<()>>,
) -> Result<ImageBuf, PipelineError> {
    match joined {
        Err(payload) => panic::resume_unwind(payload),
        Ok(Err(source)) => Err(PipelineError::StageFailed {
            stage: stage.to_string(),
            source,
        }),
        Ok(Ok(())) => received.ok_or_else(|| PipelineError::HandoffClosed {
            stage: stage.to_string(),
        }),
    }
}
