//! Reveal timeline: configuration model, schedules, the phase controller and the
//! stage that replays it.
//!
//! - `model`: cashback, offers, run configuration, phase events
//! - `schedule`: canonical and custom `(delay, phase)` timelines
//! - `controller`: activates runs and owns their phase
//! - `stage`: reset-token host that replaces runs wholesale

pub mod controller;
pub mod model;
pub mod schedule;
pub mod stage;

pub use controller::{PhaseController, RevealRun, RunState};
pub use model::{Cashback, Phase, PhaseEvent, RevealConfig, RevealContent, RewardOffer, RunStatus};
pub use schedule::{Schedule, ScheduleStep, ScheduleVariant};
pub use stage::RevealStage;
