//! Rendering: declarative plans for each phase, the confetti generator, and the
//! surfaces that consume plans.

pub mod confetti;
pub mod plan;
pub mod surface;

pub use plan::{CardMotion, Element, RenderOptions, RenderPlan, render};
pub use surface::{JsonLinesSurface, RenderSurface, drive_surface};
