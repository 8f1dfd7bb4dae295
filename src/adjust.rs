use crate::{
    backend::AutomationBackend,
    compare::moments::DiscrepancyReport,
    foundation::{
        core::{Canvas, SceneItemId, Transform},
        error::{AlignError, AlignResult},
    },
};

/// A tracked source resolved to its scene item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackedSource {
    /// Source name as configured.
    pub name: String,
    /// Scene item id on the backend.
    pub item: SceneItemId,
}

/// Maps one global discrepancy onto a bounded nudge of every tracked source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformAdjuster {
    /// Position change in pixels; scale changes by `step / 100`.
    pub step: f64,
}

/// What happened to each source during one submission pass.
#[derive(Debug, Default)]
pub struct SubmitReport {
    /// Sources whose new transform was accepted, with that transform.
    pub applied: Vec<(String, Transform)>,
    /// Sources skipped because the backend rejected a request.
    pub skipped: Vec<(String, AlignError)>,
}

impl TransformAdjuster {
    /// Adjuster with the given step.
    pub fn new(step: f64) -> Self {
        Self { step }
    }

    /// New transform for one source.
    ///
    /// Each position axis moves by `step` toward the side of the canvas midpoint
    /// opposite the centroid. The axis with the larger spread moment grows by
    /// `step / 100` and the other shrinks by the same amount; on a tie both shrink.
    /// Rotation, crop and alignment are copied unchanged.
    pub fn adjust_one(
        &self,
        current: &Transform,
        report: &DiscrepancyReport,
        canvas: Canvas,
    ) -> Transform {
        let centroid = report.centroid_on(canvas);
        let mid = canvas.midpoint();
        let ds = self.step / 100.0;

        let dx = if centroid.x > mid.x { -self.step } else { self.step };
        let dy = if centroid.y > mid.y { -self.step } else { self.step };

        let sx = if report.spread_x() > report.spread_y() { ds } else { -ds };
        let sy = if report.spread_y() > report.spread_x() { ds } else { -ds };

        Transform {
            position_x: current.position_x + dx,
            position_y: current.position_y + dy,
            scale_x: current.scale_x + sx,
            scale_y: current.scale_y + sy,
            ..*current
        }
    }

    /// Apply [`Self::adjust_one`] to every source independently.
    pub fn adjust<I: Clone>(
        &self,
        sources: &[(I, Transform)],
        report: &DiscrepancyReport,
        canvas: Canvas,
    ) -> Vec<(I, Transform)> {
        sources
            .iter()
            .map(|(id, t)| (id.clone(), self.adjust_one(t, report, canvas)))
            .collect()
    }

    /// Fetch each source's current transform, adjust it, and submit it.
    ///
    /// Transforms are read fresh on every call. A rejected
    /// read or write skips that source only; any other error aborts.
    #[tracing::instrument(skip_all, fields(scene = %scene, sources = sources.len()))]
    pub fn apply<B: AutomationBackend + ?Sized>(
        &self,
        backend: &mut B,
        scene: &str,
        sources: &[TrackedSource],
        report: &DiscrepancyReport,
        canvas: Canvas,
    ) -> AlignResult<SubmitReport> {
        let mut out = SubmitReport::default();

        for src in sources {
            let current = match backend.transform(scene, src.item) {
                Ok(t) => t,
                Err(e) if e.is_recoverable() => {
                    tracing::warn!(source = %src.name, error = %e, "could not read transform; skipping");
                    out.skipped.push((src.name.clone(), e));
                    continue;
                }
                Err(e) => return Err(e),
            };

            let next = self.adjust_one(&current, report, canvas);
            match backend.set_transform(scene, src.item, &next) {
                Ok(()) => {
                    tracing::info!(
                        source = %src.name,
                        x = next.position_x,
                        y = next.position_y,
                        scale_x = next.scale_x,
                        scale_y = next.scale_y,
                        "adjusted source"
                    );
                    out.applied.push((src.name.clone(), next));
                }
                Err(e) if e.is_recoverable() => {
                    tracing::warn!(source = %src.name, error = %e, "transform rejected; skipping");
                    out.skipped.push((src.name.clone(), e));
                }
                Err(e) => return Err(e),
            }
        }

        Ok(out)
    }
}

#[cfg(test)]
#[path = "../tests/unit/adjust.rs"]
mod tests;
