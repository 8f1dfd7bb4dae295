//! scenealign drives live capture sources in an OBS scene onto a reference layout.
//!
//! Instead of dragging sources into place by hand, a run closes a visual feedback
//! loop around the compositor:
//!
//! 1. **Capture**: grab the composited output as a [`RasterImage`] ([`FrameAcquirer`])
//! 2. **Score**: structural similarity against the reference ([`SimilarityScorer`])
//! 3. **Localize**: centroid and spread of the thresholded difference ([`DiscrepancyLocalizer`])
//! 4. **Adjust**: nudge every tracked source's [`Transform`] ([`TransformAdjuster`])
//!
//! The [`ConvergenceController`] repeats this until the score reaches the configured
//! threshold or the iteration budget runs out. The compositor sits behind the
//! [`AutomationBackend`] trait; [`ObsClient`] implements it over obs-websocket v5.
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Single-threaded**: each iteration runs to completion before the next begins.
//! - **Scoped connection**: the backend is disconnected on every exit path.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod acquire;
mod adjust;
mod backend;
mod compare;
mod config;
mod controller;
mod foundation;
mod raster;

pub use acquire::FrameAcquirer;
pub use adjust::{SubmitReport, TrackedSource, TransformAdjuster};
pub use backend::obs::ObsClient;
pub use backend::protocol::{
    AuthChallenge, Hello, Identified, Identify, OpCode, RPC_VERSION, RawMessage, Request,
    RequestResponse, RequestStatus, STATUS_RESOURCE_NOT_FOUND, auth_response, decode_image_data,
};
pub use backend::{AutomationBackend, ScreenshotFormat};
pub use compare::moments::{DiscrepancyLocalizer, DiscrepancyReport, mask_moments};
pub use compare::ssim::SimilarityScorer;
pub use config::{ConnectionConfig, PASSWORD_ENV, RunConfig};
pub use controller::{
    ConvergenceController, IterationRecord, RunOutcome, RunPhase, Termination, compare_frames,
};
pub use foundation::core::{Alignment, Canvas, Point, SceneItemId, Transform, Vec2};
pub use foundation::error::{AlignError, AlignResult};
pub use raster::image::{RasterImage, normalized_pair, save_png};
pub use raster::reference::ReferenceStore;
