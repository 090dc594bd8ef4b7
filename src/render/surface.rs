//! Rendering surfaces: consumers of render plans.

use std::io::Write;
use std::pin::pin;

use serde::Serialize;
use tokio_stream::StreamExt;
use tracing::debug;

use super::confetti::{self, Particle};
use super::plan::{Element, RenderOptions, RenderPlan, render};
use crate::error::RenderError;
use crate::reveal::controller::RevealRun;
use crate::reveal::model::RunStatus;

/// Something that can show a render plan.
pub trait RenderSurface {
    fn present(&mut self, plan: &RenderPlan) -> Result<(), RenderError>;
}

/// One frame written by [`JsonLinesSurface`].
#[derive(Debug, Serialize)]
struct Frame<'a> {
    #[serde(flatten)]
    plan: &'a RenderPlan,
    #[serde(skip_serializing_if = "Option::is_none")]
    confetti: Option<&'a [Particle]>,
}

/// Writes each frame as a single JSON line.
///
/// Confetti particles are drawn when the confetti element mounts and kept until it
/// unmounts; a later mount gets a new burst.
pub struct JsonLinesSurface<W: Write> {
    out: W,
    burst: Option<Vec<Particle>>,
}

impl<W: Write> JsonLinesSurface<W> {
    pub fn new(out: W) -> Self {
        Self { out, burst: None }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RenderSurface for JsonLinesSurface<W> {
    fn present(&mut self, plan: &RenderPlan) -> Result<(), RenderError> {
        let wanted = plan.elements.iter().find_map(|e| match e {
            Element::Confetti { particles } => Some(*particles),
            _ => None,
        });
        match wanted {
            Some(count) if self.burst.is_none() => {
                debug!(phase = plan.phase, count, "Confetti mounted");
                self.burst = Some(confetti::generate(count));
            }
            None if self.burst.is_some() => {
                debug!(phase = plan.phase, "Confetti unmounted");
                self.burst = None;
            }
            _ => {}
        }

        let frame = Frame {
            plan,
            confetti: self.burst.as_deref(),
        };
        serde_json::to_writer(&mut self.out, &frame)?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }
}

/// Present a frame for every phase of `run` until it finishes.
pub async fn drive_surface<S: RenderSurface + ?Sized>(
    run: &RevealRun,
    options: &RenderOptions,
    surface: &mut S,
) -> Result<RunStatus, RenderError> {
    let mut phases = pin!(run.phases());
    while let Some(phase) = phases.next().await {
        surface.present(&render(phase, run.content(), options))?;
    }
    Ok(run.status())
}
