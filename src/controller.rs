use std::path::Path;

use crate::{
    acquire::FrameAcquirer,
    adjust::{TrackedSource, TransformAdjuster},
    backend::AutomationBackend,
    compare::{
        moments::{DiscrepancyLocalizer, DiscrepancyReport, mask_moments},
        ssim::SimilarityScorer,
    },
    config::RunConfig,
    foundation::{
        core::{Canvas, Transform},
        error::AlignResult,
    },
    raster::{
        image::{RasterImage, save_png},
        reference::ReferenceStore,
    },
};

/// Lifecycle of one convergence run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum RunPhase {
    /// Resolving sources, resetting transforms, reading the canvas size.
    Initializing,
    /// Inside the capture/score/adjust loop.
    Iterating,
    /// Similarity reached the threshold.
    Converged,
    /// Iteration budget spent without converging.
    Exhausted,
    /// Stopped by a fatal error.
    Failed,
}

/// How a run that did not fail came to an end.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub enum Termination {
    /// Score reached the threshold at this (0-based) iteration.
    Converged {
        /// Iteration whose capture met the threshold.
        iteration: u32,
    },
    /// `max_iterations` captures were taken without converging.
    Exhausted,
}

/// Bookkeeping for one pass through the loop.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct IterationRecord {
    /// 0-based iteration index.
    pub iteration: u32,
    /// Similarity of this iteration's capture.
    pub score: f64,
    /// Discrepancy that drove the adjustment, if one was found.
    pub discrepancy: Option<DiscrepancyReport>,
    /// Sources whose new transform was accepted.
    pub applied: usize,
    /// Sources skipped after a rejected request.
    pub skipped: usize,
}

/// Result of a run that reached `Converged` or `Exhausted`.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct RunOutcome {
    /// Terminal state.
    pub termination: Termination,
    /// Number of frames captured.
    pub captures: u32,
    /// Score of the last capture.
    pub score: f64,
    /// Last transform the backend accepted per source, in configured order.
    /// Sources whose every submission was rejected are absent.
    pub transforms: Vec<(String, Transform)>,
    /// One record per iteration, in order.
    pub history: Vec<IterationRecord>,
}

impl RunOutcome {
    /// Whether the run converged.
    pub fn converged(&self) -> bool {
        matches!(self.termination, Termination::Converged { .. })
    }
}

/// Transient per-run state; created at loop start and dropped at loop end.
#[derive(Debug)]
struct ConvergenceRun {
    phase: RunPhase,
    iteration: u32,
    score: Option<f64>,
    canvas: Canvas,
    sources: Vec<TrackedSource>,
    transforms: Vec<(String, Option<Transform>)>,
    history: Vec<IterationRecord>,
}

impl ConvergenceRun {
    fn enter(&mut self, phase: RunPhase) {
        tracing::debug!(from = ?self.phase, to = ?phase, "phase change");
        self.phase = phase;
    }

    fn finish(mut self, termination: Termination) -> RunOutcome {
        tracing::debug!(iteration = self.iteration, "leaving loop");
        self.enter(match termination {
            Termination::Converged { .. } => RunPhase::Converged,
            Termination::Exhausted => RunPhase::Exhausted,
        });
        RunOutcome {
            termination,
            captures: self.history.len() as u32,
            score: self.score.unwrap_or(0.0),
            transforms: self
                .transforms
                .into_iter()
                .filter_map(|(name, t)| t.map(|t| (name, t)))
                .collect(),
            history: self.history,
        }
    }

    fn record_transform(&mut self, name: &str, t: Transform) {
        if let Some(slot) = self.transforms.iter_mut().find(|(n, _)| n == name) {
            slot.1 = Some(t);
        }
    }
}

/// Owns the capture, score, localize, adjust loop and its termination policy.
pub struct ConvergenceController {
    config: RunConfig,
    reference: ReferenceStore,
    scorer: SimilarityScorer,
    localizer: DiscrepancyLocalizer,
    adjuster: TransformAdjuster,
}

impl ConvergenceController {
    /// Validate `config` and pair it with an already loaded reference.
    pub fn new(config: RunConfig, reference: ReferenceStore) -> AlignResult<Self> {
        config.validate()?;
        Ok(Self {
            localizer: DiscrepancyLocalizer::new(config.diff_threshold),
            adjuster: TransformAdjuster::new(config.adjustment_step),
            scorer: SimilarityScorer::default(),
            config,
            reference,
        })
    }

    /// Validate `config` and load its reference image from disk.
    pub fn from_config(config: RunConfig) -> AlignResult<Self> {
        config.validate()?;
        let reference = ReferenceStore::load(&config.reference)?;
        Self::new(config, reference)
    }

    /// Replace the similarity scorer.
    pub fn with_scorer(mut self, scorer: SimilarityScorer) -> Self {
        self.scorer = scorer;
        self
    }

    /// Run configuration.
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Connect through `connect`, run to a terminal state, and disconnect.
    ///
    /// A connection failure is returned as-is; nothing needs releasing then.
    pub fn run<B, F>(&self, connect: F) -> AlignResult<RunOutcome>
    where
        B: AutomationBackend,
        F: FnOnce() -> AlignResult<B>,
    {
        let mut backend = connect()?;
        self.run_with(&mut backend)
    }

    /// Drive an already connected backend to a terminal state.
    ///
    /// The backend is disconnected on every exit path.
    pub fn run_with<B: AutomationBackend + ?Sized>(
        &self,
        backend: &mut B,
    ) -> AlignResult<RunOutcome> {
        let result = self.drive(backend);
        if let Err(e) = backend.disconnect() {
            tracing::warn!(error = %e, "disconnect failed");
        }

        match &result {
            Ok(outcome) => match outcome.termination {
                Termination::Converged { iteration } => tracing::info!(
                    iteration,
                    score = outcome.score,
                    "converged"
                ),
                Termination::Exhausted => tracing::info!(
                    captures = outcome.captures,
                    score = outcome.score,
                    "iteration budget exhausted"
                ),
            },
            Err(e) => tracing::error!(phase = ?RunPhase::Failed, error = %e, "run failed"),
        }
        result
    }

    #[tracing::instrument(skip_all, fields(scene = %self.config.scene))]
    fn drive<B: AutomationBackend + ?Sized>(&self, backend: &mut B) -> AlignResult<RunOutcome> {
        let mut run = self.initialize(backend)?;
        let acquirer = FrameAcquirer::new(self.config.capture_source(), run.canvas);
        let reference = self.reference.image();

        run.enter(RunPhase::Iterating);
        for i in 0..self.config.max_iterations {
            run.iteration = i;

            let frame = acquirer.capture(backend)?;
            self.dump(&format!("frame_{i:03}.png"), |p| frame.save_png(p));

            let score = self.scorer.score(reference, &frame);
            run.score = Some(score);
            tracing::info!(
                iteration = i,
                max = self.config.max_iterations,
                score = format_args!("{score:.4}"),
                "captured frame"
            );

            let mut record = IterationRecord {
                iteration: i,
                score,
                discrepancy: None,
                applied: 0,
                skipped: 0,
            };

            if score >= self.config.similarity_threshold {
                run.history.push(record);
                return Ok(run.finish(Termination::Converged { iteration: i }));
            }

            let mask = self.localizer.difference_mask(reference, &frame);
            self.dump(&format!("mask_{i:03}.png"), |p| save_png(&mask, p));

            match mask_moments(&mask) {
                None => tracing::info!(
                    iteration = i,
                    "no difference above threshold; skipping adjustment"
                ),
                Some(report) => {
                    tracing::info!(
                        iteration = i,
                        cx = report.centroid.x,
                        cy = report.centroid.y,
                        spread_x = report.spread_x(),
                        spread_y = report.spread_y(),
                        "difference centroid"
                    );
                    let submitted = self.adjuster.apply(
                        backend,
                        &self.config.scene,
                        &run.sources,
                        &report,
                        run.canvas,
                    )?;
                    for (name, t) in &submitted.applied {
                        run.record_transform(name, *t);
                    }
                    record.discrepancy = Some(report);
                    record.applied = submitted.applied.len();
                    record.skipped = submitted.skipped.len();
                }
            }
            run.history.push(record);

            let delay = self.config.settle_delay();
            if !delay.is_zero() {
                std::thread::sleep(delay);
            }
        }

        Ok(run.finish(Termination::Exhausted))
    }

    fn initialize<B: AutomationBackend + ?Sized>(
        &self,
        backend: &mut B,
    ) -> AlignResult<ConvergenceRun> {
        let canvas = backend.canvas_size()?;
        tracing::info!(width = canvas.width, height = canvas.height, "canvas size");

        let mut run = ConvergenceRun {
            phase: RunPhase::Initializing,
            iteration: 0,
            score: None,
            canvas,
            sources: Vec::with_capacity(self.config.sources.len()),
            transforms: Vec::with_capacity(self.config.sources.len()),
            history: Vec::new(),
        };

        let start = Transform::centered(canvas);
        for name in &self.config.sources {
            let item = backend.scene_item_id(&self.config.scene, name)?;
            let accepted = match backend.set_transform(&self.config.scene, item, &start) {
                Ok(()) => {
                    tracing::info!(source = %name, "reset to centered transform");
                    Some(start)
                }
                Err(e) if e.is_recoverable() => {
                    tracing::warn!(source = %name, error = %e, "reset rejected; continuing");
                    None
                }
                Err(e) => return Err(e),
            };
            run.sources.push(TrackedSource {
                name: name.clone(),
                item,
            });
            run.transforms.push((name.clone(), accepted));
        }

        Ok(run)
    }

    fn dump(&self, file: &str, write: impl FnOnce(&Path) -> AlignResult<()>) {
        let Some(dir) = self.config.dump_dir.as_deref() else {
            return;
        };
        let path = dir.join(file);
        if let Err(e) = write(&path) {
            tracing::warn!(path = %path.display(), error = %e, "could not write dump");
        }
    }
}

/// Score and localize one frame against a reference without a backend.
pub fn compare_frames(
    reference: &RasterImage,
    candidate: &RasterImage,
    diff_threshold: u8,
) -> (f64, Option<DiscrepancyReport>) {
    let score = SimilarityScorer::default().score(reference, candidate);
    let report = DiscrepancyLocalizer::new(diff_threshold).localize(reference, candidate);
    (score, report)
}
