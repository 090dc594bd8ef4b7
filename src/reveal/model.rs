//! Reveal data model: cashback, reward offers, run configuration and phase events.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A timeline checkpoint. Phase 0 is the state before any trigger has fired.
pub type Phase = u32;

/// Cashback won on the payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cashback {
    /// Amount won. Expected to be positive; other values are displayed as-is.
    pub amount: Decimal,
    /// Currency symbol, e.g. "₹". Falls back to the configured default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl Cashback {
    pub fn new(amount: Decimal) -> Self {
        Self {
            amount,
            currency: None,
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    /// Whether the amount is something worth celebrating.
    pub fn is_well_formed(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    /// Currency symbol followed by the amount, e.g. "₹10".
    pub fn display_amount(&self, default_currency: &str) -> String {
        let currency = self
            .currency
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(default_currency);
        format!("{}{}", currency, self.amount.normalize())
    }
}

/// A promotional reward card shown after the cashback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardOffer {
    /// Caller-assigned key. Expected unique within a run.
    pub id: String,
    /// Short highlight shown in a pill above the title.
    pub badge: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    /// Call-to-action button text.
    pub action_label: String,
}

impl RewardOffer {
    pub fn new(
        id: impl Into<String>,
        badge: impl Into<String>,
        title: impl Into<String>,
        action_label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            badge: badge.into(),
            title: title.into(),
            subtitle: None,
            action_label: action_label.into(),
        }
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }
}

/// Callback invoked once when a run reaches the end of its schedule.
pub type CompletionHook = Box<dyn FnOnce() + Send + 'static>;

/// Input to one run of the reveal. Immutable once activated.
#[derive(Default)]
pub struct RevealConfig {
    pub cashback: Option<Cashback>,
    pub offers: Vec<RewardOffer>,
    pub on_complete: Option<CompletionHook>,
}

impl RevealConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cashback(mut self, cashback: Cashback) -> Self {
        self.cashback = Some(cashback);
        self
    }

    pub fn with_offers(mut self, offers: Vec<RewardOffer>) -> Self {
        self.offers = offers;
        self
    }

    pub fn on_complete(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(hook));
        self
    }

    pub fn has_offers(&self) -> bool {
        !self.offers.is_empty()
    }

    /// Copy of the display data, without the completion hook.
    pub fn content(&self) -> RevealContent {
        RevealContent {
            cashback: self.cashback.clone(),
            offers: self.offers.clone(),
        }
    }
}

impl fmt::Debug for RevealConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RevealConfig")
            .field("cashback", &self.cashback)
            .field("offers", &self.offers)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

/// The display half of a [`RevealConfig`]: what the rendering surface needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RevealContent {
    pub cashback: Option<Cashback>,
    #[serde(default)]
    pub offers: Vec<RewardOffer>,
}

impl RevealContent {
    pub fn has_offers(&self) -> bool {
        !self.offers.is_empty()
    }
}

/// Where a run is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Triggers are still pending.
    Running,
    /// The schedule finished and the completion hook ran.
    Completed,
    /// The run was cancelled before finishing.
    TornDown,
}

impl RunStatus {
    pub fn is_finished(&self) -> bool {
        !matches!(self, Self::Running)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::TornDown => "torn_down",
        };
        write!(f, "{s}")
    }
}

/// Events broadcast by a run to its subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PhaseEvent {
    /// The phase moved forward.
    Advanced {
        run_id: Uuid,
        from: Phase,
        to: Phase,
        at: DateTime<Utc>,
    },
    /// The schedule finished; emitted right after the completion hook.
    Completed { run_id: Uuid, phase: Phase },
    /// The run was cancelled.
    TornDown { run_id: Uuid, phase: Phase },
}
