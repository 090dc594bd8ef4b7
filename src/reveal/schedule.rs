//! Reveal schedules: the `(delay, target phase)` tables that drive a run.
//!
//! Two canonical variants exist, selected once per run from the configuration:
//!
//! | variant      | 1      | 2      | 3       | 4       | complete |
//! |--------------|--------|--------|---------|---------|----------|
//! | cashback     | 100 ms | 700 ms | 1500 ms | -       | 2000 ms  |
//! | with offers  | 100 ms | 500 ms | 2500 ms | 3000 ms | 3000 ms  |
//!
//! A configuration with neither cashback nor offers gets the empty schedule and
//! completes at activation.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::model::{Phase, RevealContent};
use crate::error::ScheduleError;

/// One deferred trigger: at `delay` after activation, set the phase to `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduleStep {
    pub delay: Duration,
    pub target: Phase,
}

impl ScheduleStep {
    pub const fn at_millis(delay_ms: u64, target: Phase) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            target,
        }
    }
}

/// Which timeline a run follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleVariant {
    /// Nothing to reveal.
    Empty,
    /// Cashback card only, ending in the settled confirmation.
    CashbackOnly,
    /// Cashback banner and card, ending with the offers list.
    WithOffers,
    /// Caller-supplied timeline.
    Custom,
}

impl ScheduleVariant {
    /// Pick the variant for a configuration. Offers take precedence over cashback.
    pub fn select(content: &RevealContent) -> Self {
        if content.has_offers() {
            Self::WithOffers
        } else if content.cashback.is_some() {
            Self::CashbackOnly
        } else {
            Self::Empty
        }
    }
}

impl fmt::Display for ScheduleVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Empty => "empty",
            Self::CashbackOnly => "cashback_only",
            Self::WithOffers => "with_offers",
            Self::Custom => "custom",
        };
        write!(f, "{s}")
    }
}

const CASHBACK_ONLY_STEPS: [ScheduleStep; 3] = [
    ScheduleStep::at_millis(100, 1),
    ScheduleStep::at_millis(700, 2),
    ScheduleStep::at_millis(1500, 3),
];
const CASHBACK_ONLY_COMPLETION: Duration = Duration::from_millis(2000);

const WITH_OFFERS_STEPS: [ScheduleStep; 4] = [
    ScheduleStep::at_millis(100, 1),
    ScheduleStep::at_millis(500, 2),
    ScheduleStep::at_millis(2500, 3),
    ScheduleStep::at_millis(3000, 4),
];
const WITH_OFFERS_COMPLETION: Duration = Duration::from_millis(3000);

/// An ordered, validated timeline.
///
/// Steps are kept sorted by `(delay, target)`, targets are exactly `1..=N`, and the
/// completion delay is never earlier than the terminal step. Deserialized schedules
/// go through the same validation as [`Schedule::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSchedule")]
pub struct Schedule {
    variant: ScheduleVariant,
    steps: Vec<ScheduleStep>,
    completion: Duration,
}

/// Unvalidated wire form of a [`Schedule`].
#[derive(Deserialize)]
struct RawSchedule {
    steps: Vec<ScheduleStep>,
    completion: Duration,
}

impl TryFrom<RawSchedule> for Schedule {
    type Error = ScheduleError;

    fn try_from(raw: RawSchedule) -> Result<Self, Self::Error> {
        Self::new(raw.steps, raw.completion)
    }
}

impl Schedule {
    /// Build a custom schedule, validating it.
    pub fn new(steps: Vec<ScheduleStep>, completion: Duration) -> Result<Self, ScheduleError> {
        let steps = validate(steps, completion)?;
        Ok(Self {
            variant: ScheduleVariant::Custom,
            steps,
            completion,
        })
    }

    /// The canonical schedule for a variant. `Custom` has no canonical form and
    /// yields the empty schedule.
    pub fn canonical(variant: ScheduleVariant) -> Self {
        let (steps, completion) = match variant {
            ScheduleVariant::CashbackOnly => {
                (CASHBACK_ONLY_STEPS.to_vec(), CASHBACK_ONLY_COMPLETION)
            }
            ScheduleVariant::WithOffers => (WITH_OFFERS_STEPS.to_vec(), WITH_OFFERS_COMPLETION),
            ScheduleVariant::Empty | ScheduleVariant::Custom => (Vec::new(), Duration::ZERO),
        };
        Self {
            variant,
            steps,
            completion,
        }
    }

    /// Select and build the schedule for a configuration.
    pub fn for_content(content: &RevealContent) -> Self {
        Self::canonical(ScheduleVariant::select(content))
    }

    /// Map every delay through `scale`. The completion never ends up before the terminal step.
    pub fn scaled(mut self, scale: impl Fn(Duration) -> Duration) -> Self {
        for step in &mut self.steps {
            step.delay = scale(step.delay);
        }
        self.completion = scale(self.completion);
        if let Some(last) = self.steps.last() {
            self.completion = self.completion.max(last.delay);
        }
        self
    }

    pub fn variant(&self) -> ScheduleVariant {
        self.variant
    }

    pub fn steps(&self) -> &[ScheduleStep] {
        &self.steps
    }

    /// Delay after activation at which the completion hook runs.
    pub fn completion(&self) -> Duration {
        self.completion
    }

    /// The absorbing final phase (0 for an empty schedule).
    pub fn terminal_phase(&self) -> Phase {
        self.steps.last().map(|s| s.target).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

fn validate(
    mut steps: Vec<ScheduleStep>,
    completion: Duration,
) -> Result<Vec<ScheduleStep>, ScheduleError> {
    // Equal delays fire lowest target first.
    steps.sort_by_key(|s| (s.delay, s.target));

    let mut seen = vec![false; steps.len()];
    for step in &steps {
        let slot = step
            .target
            .checked_sub(1)
            .map(|i| i as usize)
            .filter(|&i| i < steps.len())
            .ok_or_else(|| ScheduleError::MissingPhase {
                missing: first_unseen(&seen),
                len: steps.len(),
            })?;
        if seen[slot] {
            return Err(ScheduleError::DuplicatePhase { phase: step.target });
        }
        seen[slot] = true;
    }

    for pair in steps.windows(2) {
        if pair[1].target < pair[0].target {
            return Err(ScheduleError::OutOfOrder {
                phase: pair[1].target,
                previous: pair[0].target,
                delay: pair[1].delay,
            });
        }
    }

    if let Some(last) = steps.last()
        && completion < last.delay
    {
        return Err(ScheduleError::CompletionTooEarly {
            completion,
            terminal: last.delay,
        });
    }

    Ok(steps)
}

fn first_unseen(seen: &[bool]) -> Phase {
    seen.iter()
        .position(|s| !s)
        .map(|i| i as Phase + 1)
        .unwrap_or(seen.len() as Phase + 1)
}
