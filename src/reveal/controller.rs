//! Phase timeline controller: arms a run's deferred triggers and owns its phase.
//!
//! A [`RevealRun`] is the scoped handle for one activation. Its driver task awaits each
//! step's deadline (measured from activation, not from the previous step) and moves the
//! phase forward. Phase and run status share one `watch` cell, so a trigger and a
//! teardown can never interleave: once a run is torn down, the phase is frozen and the
//! completion hook is gone. Dropping the handle tears the run down.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::stream::{self, Stream};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::model::{CompletionHook, Phase, PhaseEvent, RevealConfig, RevealContent, RunStatus};
use super::schedule::{Schedule, ScheduleStep};
use crate::config::RevealSettings;
use crate::error::Result;

/// Event channel capacity. A run emits at most a handful of events.
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Snapshot of a run: the current phase and whether the run is still live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunState {
    pub phase: Phase,
    pub status: RunStatus,
}

impl RunState {
    const INITIAL: Self = Self {
        phase: 0,
        status: RunStatus::Running,
    };
}

/// State shared between a run handle and its driver task.
struct RunShared {
    run_id: Uuid,
    state: watch::Sender<RunState>,
    events: broadcast::Sender<PhaseEvent>,
}

impl RunShared {
    /// Move to `target` unless the run has already finished. Returns whether the run
    /// is still live. Targets at or below the current phase are ignored.
    fn advance(&self, target: Phase) -> bool {
        let mut live = true;
        let mut from = 0;
        let advanced = self.state.send_if_modified(|state| {
            if state.status.is_finished() {
                live = false;
                return false;
            }
            if target <= state.phase {
                return false;
            }
            from = state.phase;
            state.phase = target;
            true
        });

        if advanced {
            debug!(run_id = %self.run_id, from, to = target, "Phase advanced");
            let _ = self.events.send(PhaseEvent::Advanced {
                run_id: self.run_id,
                from,
                to: target,
                at: Utc::now(),
            });
        }
        live
    }

    /// Mark the run finished with `status`. Only the first caller wins.
    fn finish(&self, status: RunStatus) -> Option<Phase> {
        let mut phase = 0;
        let finished = self.state.send_if_modified(|state| {
            if state.status.is_finished() {
                return false;
            }
            state.status = status;
            phase = state.phase;
            true
        });
        finished.then_some(phase)
    }

    /// Finish as completed and run the hook, unless the run was torn down first.
    fn complete(&self, on_complete: Option<CompletionHook>) {
        let Some(phase) = self.finish(RunStatus::Completed) else {
            return;
        };
        if let Some(hook) = on_complete {
            hook();
        }
        info!(run_id = %self.run_id, phase, "Reveal completed");
        let _ = self.events.send(PhaseEvent::Completed {
            run_id: self.run_id,
            phase,
        });
    }
}

/// Starts runs of the reveal timeline.
#[derive(Debug, Clone, Default)]
pub struct PhaseController {
    settings: RevealSettings,
}

impl PhaseController {
    pub fn new(settings: RevealSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &RevealSettings {
        &self.settings
    }

    /// Activate a run, selecting the canonical schedule for `config`.
    ///
    /// An empty configuration completes immediately. Any other configuration spawns a
    /// driver task, so this must be called from within a tokio runtime.
    pub fn activate(&self, config: RevealConfig) -> RevealRun {
        let schedule = Schedule::for_content(&config.content());
        self.activate_with_schedule(config, schedule)
    }

    /// Validate a custom timeline and activate a run on it.
    pub fn activate_custom(
        &self,
        config: RevealConfig,
        steps: Vec<ScheduleStep>,
        completion: Duration,
    ) -> Result<RevealRun> {
        let schedule = Schedule::new(steps, completion)?;
        Ok(self.activate_with_schedule(config, schedule))
    }

    /// Activate a run on an explicit schedule.
    pub fn activate_with_schedule(&self, config: RevealConfig, schedule: Schedule) -> RevealRun {
        let RevealConfig {
            cashback,
            offers,
            on_complete,
        } = config;
        let content = RevealContent { cashback, offers };
        inspect_content(&content);

        let schedule = schedule.scaled(|d| self.settings.scale(d));
        let run_id = Uuid::new_v4();
        let (state, _) = watch::channel(RunState::INITIAL);
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let shared = Arc::new(RunShared {
            run_id,
            state,
            events,
        });
        let activated_at = Instant::now();

        info!(
            run_id = %run_id,
            variant = %schedule.variant(),
            steps = schedule.steps().len(),
            completion_ms = schedule.completion().as_millis() as u64,
            "Reveal activated"
        );

        let task = if schedule.is_empty() {
            shared.complete(on_complete);
            None
        } else {
            Some(tokio::spawn(drive(
                Arc::clone(&shared),
                schedule.clone(),
                activated_at,
                on_complete,
            )))
        };

        RevealRun {
            shared,
            schedule,
            content,
            activated_at,
            task,
        }
    }
}

/// Malformed display data is tolerated; it only earns a diagnostic.
fn inspect_content(content: &RevealContent) {
    if let Some(cashback) = &content.cashback
        && !cashback.is_well_formed()
    {
        warn!(amount = %cashback.amount, "Cashback amount is not positive; revealing anyway");
    }

    for (i, offer) in content.offers.iter().enumerate() {
        if content.offers[..i].iter().any(|o| o.id == offer.id) {
            warn!(offer_id = %offer.id, "Duplicate reward offer id");
        }
    }
}

/// Driver task: fire each trigger at its deadline, then hold until completion.
async fn drive(
    shared: Arc<RunShared>,
    schedule: Schedule,
    activated_at: Instant,
    on_complete: Option<CompletionHook>,
) {
    for step in schedule.steps() {
        sleep_until(activated_at + step.delay).await;
        if !shared.advance(step.target) {
            return;
        }
    }

    let terminal_delay = schedule.steps().last().map(|s| s.delay).unwrap_or_default();
    if schedule.completion() > terminal_delay {
        sleep_until(activated_at + schedule.completion()).await;
    }
    shared.complete(on_complete);
}

/// Handle to one run of the reveal.
pub struct RevealRun {
    shared: Arc<RunShared>,
    schedule: Schedule,
    content: RevealContent,
    activated_at: Instant,
    task: Option<JoinHandle<()>>,
}

impl RevealRun {
    pub fn run_id(&self) -> Uuid {
        self.shared.run_id
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Display data the run was activated with.
    pub fn content(&self) -> &RevealContent {
        &self.content
    }

    pub fn phase(&self) -> Phase {
        self.shared.state.borrow().phase
    }

    pub fn status(&self) -> RunStatus {
        self.shared.state.borrow().status
    }

    pub fn state(&self) -> RunState {
        *self.shared.state.borrow()
    }

    /// Time since activation.
    pub fn elapsed(&self) -> Duration {
        self.activated_at.elapsed()
    }

    /// Watch the raw run state.
    pub fn watch(&self) -> watch::Receiver<RunState> {
        self.shared.state.subscribe()
    }

    /// Subscribe to phase events. Events sent before subscribing are not replayed.
    pub fn subscribe(&self) -> broadcast::Receiver<PhaseEvent> {
        self.shared.events.subscribe()
    }

    /// Stream of phases: the current phase first, then every later phase once, in order.
    /// Ends once the run completes or is torn down.
    pub fn phases(&self) -> impl Stream<Item = Phase> + Send + 'static {
        let rx = self.shared.state.subscribe();
        stream::unfold(Some((rx, None::<Phase>)), |cursor| async move {
            let (mut rx, last) = cursor?;
            loop {
                let state = *rx.borrow_and_update();
                // The cell may coalesce back-to-back steps; phases only move up by one.
                let next = match last {
                    None => Some(state.phase),
                    Some(last) if state.phase > last => Some(last + 1),
                    Some(_) => None,
                };
                if let Some(phase) = next {
                    let done = phase == state.phase && state.status.is_finished();
                    return Some((phase, (!done).then_some((rx, Some(phase)))));
                }
                if state.status.is_finished() || rx.changed().await.is_err() {
                    return None;
                }
            }
        })
    }

    /// Wait until the run completes or is torn down.
    pub async fn wait(&self) -> RunStatus {
        let mut rx = self.shared.state.subscribe();
        let status = match rx.wait_for(|state| state.status.is_finished()).await {
            Ok(state) => state.status,
            Err(_) => RunStatus::TornDown,
        };
        status
    }

    /// Cancel every pending trigger. The phase freezes and the completion hook never
    /// runs. Does nothing once the run has finished.
    pub fn teardown(&mut self) {
        if let Some(phase) = self.shared.finish(RunStatus::TornDown) {
            debug!(run_id = %self.shared.run_id, phase, "Reveal torn down");
            let _ = self.shared.events.send(PhaseEvent::TornDown {
                run_id: self.shared.run_id,
                phase,
            });
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for RevealRun {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for RevealRun {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevealRun")
            .field("run_id", &self.shared.run_id)
            .field("variant", &self.schedule.variant())
            .field("state", &self.state())
            .finish()
    }
}
