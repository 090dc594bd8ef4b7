//! Integration tests for the reveal timeline.
//!
//! Every test runs on a paused tokio clock, so timer deadlines are exact and the
//! runtime auto-advances whenever all tasks are idle.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::StreamExt;
use rust_decimal_macros::dec;
use tokio::sync::broadcast;
use tokio::time::{Instant, advance};

use reward_reveal::render::{Element, RenderOptions, render};
use reward_reveal::reveal::{
    Cashback, Phase, PhaseController, PhaseEvent, RevealConfig, RevealStage, RewardOffer,
    RunStatus, ScheduleVariant,
};

/// Completion hook that counts invocations and records when they happened.
#[derive(Clone, Default)]
struct CompletionCounter {
    calls: Arc<AtomicUsize>,
    at: Arc<Mutex<Option<Instant>>>,
}

impl CompletionCounter {
    fn hook(&self) -> impl FnOnce() + Send + 'static {
        let completion = self.clone();
        move || {
            completion.calls.fetch_add(1, Ordering::SeqCst);
            *completion.at.lock().unwrap() = Some(Instant::now());
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fired_at(&self) -> Option<Instant> {
        *self.at.lock().unwrap()
    }
}

fn offer(id: &str) -> RewardOffer {
    RewardOffer::new(
        id,
        "₹200 cashback on all purchase",
        "5% cashback on online spends",
        "Apply now",
    )
        .with_subtitle("Card exclusive offer")
}

/// Drain every `Advanced` transition currently buffered.
fn transitions(events: &mut broadcast::Receiver<PhaseEvent>) -> Vec<(Phase, Phase)> {
    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let PhaseEvent::Advanced { from, to, .. } = event {
            seen.push((from, to));
        }
    }
    seen
}

async fn settle() {
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn scenario_a_cashback_only() {
    let completion = CompletionCounter::default();
    let start = Instant::now();
    let run = PhaseController::default().activate(
        RevealConfig::new()
            .with_cashback(Cashback::new(dec!(10)).with_currency("₹"))
            .on_complete(completion.hook()),
    );
    let mut events = run.subscribe();

    assert_eq!(run.wait().await, RunStatus::Completed);

    assert_eq!(run.phase(), 3);
    assert_eq!(transitions(&mut events), vec![(0, 1), (1, 2), (2, 3)]);
    assert_eq!(completion.calls(), 1);
    let took = completion.fired_at().unwrap() - start;
    assert_eq!(took, Duration::from_millis(2000));
    assert!(took <= Duration::from_millis(2500));
}

#[tokio::test(start_paused = true)]
async fn scenario_b_cashback_with_offer() {
    let completion = CompletionCounter::default();
    let start = Instant::now();
    let run = PhaseController::default().activate(
        RevealConfig::new()
            .with_cashback(Cashback::new(dec!(10)))
            .with_offers(vec![offer("card-offer")])
            .on_complete(completion.hook()),
    );
    let mut events = run.subscribe();

    assert_eq!(run.wait().await, RunStatus::Completed);

    assert_eq!(run.schedule().variant(), ScheduleVariant::WithOffers);
    assert_eq!(run.phase(), 4);
    assert_eq!(
        transitions(&mut events),
        vec![(0, 1), (1, 2), (2, 3), (3, 4)]
    );
    assert_eq!(completion.calls(), 1);
    assert_eq!(completion.fired_at().unwrap() - start, Duration::from_millis(3000));

    // The terminal phase is the one with the offers on screen.
    let plan = render(run.phase(), run.content(), &RenderOptions::default());
    assert!(plan
        .elements
        .iter()
        .any(|e| matches!(e, Element::OfferList { offers } if offers.len() == 1)));
}

#[tokio::test(start_paused = true)]
async fn scenario_c_nothing_to_reveal() {
    let completion = CompletionCounter::default();
    let run =
        PhaseController::default().activate(RevealConfig::new().on_complete(completion.hook()));

    assert_eq!(run.status(), RunStatus::Completed);
    assert_eq!(run.phase(), 0);
    assert_eq!(completion.calls(), 1);
    assert!(run.schedule().is_empty());
}

#[tokio::test(start_paused = true)]
async fn scenario_d_duplicate_offer_ids() {
    let completion = CompletionCounter::default();
    let run = PhaseController::default().activate(
        RevealConfig::new()
            .with_cashback(Cashback::new(dec!(10)))
            .with_offers(vec![offer("same"), offer("same")])
            .on_complete(completion.hook()),
    );

    assert_eq!(run.wait().await, RunStatus::Completed);
    assert_eq!(run.phase(), 4);
    assert_eq!(completion.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn teardown_mid_run_stops_everything() {
    let completion = CompletionCounter::default();
    let mut run = PhaseController::default().activate(
        RevealConfig::new()
            .with_cashback(Cashback::new(dec!(10)))
            .on_complete(completion.hook()),
    );
    let mut events = run.subscribe();

    advance(Duration::from_millis(750)).await;
    settle().await;
    assert_eq!(run.phase(), 2);

    run.teardown();

    advance(Duration::from_secs(5)).await;
    settle().await;

    assert_eq!(run.phase(), 2);
    assert_eq!(run.status(), RunStatus::TornDown);
    assert_eq!(completion.calls(), 0);

    let mut tail = Vec::new();
    while let Ok(event) = events.try_recv() {
        tail.push(event);
    }
    assert!(matches!(
        tail.last(),
        Some(PhaseEvent::TornDown { phase: 2, .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn dropping_the_run_cancels_the_hook() {
    let completion = CompletionCounter::default();
    let run = PhaseController::default().activate(
        RevealConfig::new()
            .with_cashback(Cashback::new(dec!(10)))
            .with_offers(vec![offer("a")])
            .on_complete(completion.hook()),
    );
    let mut state = run.watch();

    advance(Duration::from_millis(200)).await;
    settle().await;
    drop(run);

    advance(Duration::from_secs(5)).await;
    settle().await;

    let last = *state.borrow_and_update();
    assert_eq!(last.phase, 1);
    assert_eq!(last.status, RunStatus::TornDown);
    assert_eq!(completion.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn phase_stream_is_ascending_without_gaps() {
    let run = PhaseController::default().activate(
        RevealConfig::new()
            .with_cashback(Cashback::new(dec!(10)))
            .with_offers(vec![offer("a"), offer("b")]),
    );

    let phases: Vec<Phase> = run.phases().collect().await;

    assert_eq!(phases, vec![0, 1, 2, 3, 4]);
}

#[tokio::test(start_paused = true)]
async fn stage_replay_starts_over() {
    let completion = CompletionCounter::default();
    let mut stage = RevealStage::default();

    stage.replay(
        RevealConfig::new()
            .with_cashback(Cashback::new(dec!(10)))
            .with_offers(vec![offer("a")])
            .on_complete(completion.hook()),
    );
    advance(Duration::from_millis(2600)).await;
    settle().await;
    assert_eq!(stage.current().unwrap().phase(), 3);

    let run = stage.replay(
        RevealConfig::new()
            .with_cashback(Cashback::new(dec!(10)))
            .on_complete(completion.hook()),
    );
    assert_eq!(run.phase(), 0);
    assert_eq!(run.schedule().variant(), ScheduleVariant::CashbackOnly);

    assert_eq!(run.wait().await, RunStatus::Completed);
    assert_eq!(run.phase(), 3);
    // Only the second run completed; the first was replaced before its hook.
    assert_eq!(completion.calls(), 1);
}
