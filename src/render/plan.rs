//! Render plans: what the surface should show for a given phase.
//!
//! `render` is a pure function of phase and content. It decides which elements are
//! mounted and which motion each one is in; the surface decides how that looks.

use serde::Serialize;

use crate::config::{DEFAULT_CURRENCY, DEFAULT_PARTICLE_COUNT, RevealSettings};
use crate::reveal::model::{Phase, RevealContent, RewardOffer};
use crate::reveal::schedule::ScheduleVariant;

/// Delay between consecutive offer cards sliding in.
pub const OFFER_STAGGER_MS: u32 = 100;

/// Presentation knobs that are not part of a run's content.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub default_currency: String,
    pub particle_count: usize,
    /// Line shown under the cashback card and in the settled confirmation.
    pub balance_label: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            default_currency: DEFAULT_CURRENCY.to_string(),
            particle_count: DEFAULT_PARTICLE_COUNT,
            balance_label: "Added to your balance".to_string(),
        }
    }
}

impl RenderOptions {
    pub fn from_settings(settings: &RevealSettings) -> Self {
        Self {
            default_currency: settings.default_currency.clone(),
            particle_count: settings.particle_count,
            ..Default::default()
        }
    }
}

/// Motion state of the cashback card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CardMotion {
    /// Resting below its final slot.
    Resting,
    /// Rising into place.
    Rising,
    /// Sliding up and out of view.
    Exiting,
    /// Springing in from half size.
    PoppingIn,
}

impl CardMotion {
    /// Vertical offset the card animates towards, in px.
    pub fn offset_y(&self) -> i32 {
        match self {
            Self::Resting => 40,
            Self::Rising | Self::PoppingIn => 0,
            Self::Exiting => -250,
        }
    }

    pub fn duration_ms(&self) -> u32 {
        match self {
            Self::Resting | Self::Rising => 600,
            Self::Exiting => 500,
            Self::PoppingIn => 400,
        }
    }
}

/// One offer card with its entrance delay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfferCard {
    #[serde(flatten)]
    pub offer: RewardOffer,
    pub enter_delay_ms: u32,
}

/// A mounted element.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Element {
    /// Confetti burst. The surface draws a fresh particle set on each mount.
    Confetti { particles: usize },
    /// Large "You won" card.
    CashbackCard {
        amount: String,
        motion: CardMotion,
        #[serde(skip_serializing_if = "Option::is_none")]
        footer: Option<String>,
    },
    /// Banner announcing the win. Turns compact once the card has gone.
    WinBanner { text: String, compact: bool },
    /// Settled confirmation line and banner.
    Confirmation { message: String, banner: String },
    /// One-line cashback summary that replaces the card.
    CashbackRow { amount: String },
    /// Offer cards, staggered.
    OfferList { offers: Vec<OfferCard> },
}

/// Everything the surface needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderPlan {
    pub phase: Phase,
    pub layout: ScheduleVariant,
    pub elements: Vec<Element>,
}

impl RenderPlan {
    pub fn has_confetti(&self) -> bool {
        self.elements
            .iter()
            .any(|e| matches!(e, Element::Confetti { .. }))
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Build the plan for `phase`.
pub fn render(phase: Phase, content: &RevealContent, options: &RenderOptions) -> RenderPlan {
    let layout = ScheduleVariant::select(content);
    let elements = match layout {
        ScheduleVariant::CashbackOnly => cashback_only(phase, content, options),
        ScheduleVariant::WithOffers => with_offers(phase, content, options),
        ScheduleVariant::Empty | ScheduleVariant::Custom => Vec::new(),
    };
    RenderPlan {
        phase,
        layout,
        elements,
    }
}

fn win_text(amount: &str) -> String {
    format!("🎉 Yay! You won {amount} cashback!")
}

fn cashback_only(phase: Phase, content: &RevealContent, options: &RenderOptions) -> Vec<Element> {
    let Some(cashback) = &content.cashback else {
        return Vec::new();
    };
    let amount = cashback.display_amount(&options.default_currency);
    let mut elements = Vec::new();

    if (1..3).contains(&phase) {
        elements.push(Element::Confetti {
            particles: options.particle_count,
        });
    }

    if phase >= 2 {
        elements.push(Element::Confirmation {
            message: options.balance_label.clone(),
            banner: win_text(&amount),
        });
    }

    let motion = match phase {
        0 => Some(CardMotion::Resting),
        1 => Some(CardMotion::Rising),
        2 => Some(CardMotion::Exiting),
        _ => None,
    };
    if let Some(motion) = motion {
        elements.push(Element::CashbackCard {
            amount,
            motion,
            footer: Some(options.balance_label.clone()),
        });
    }

    elements
}

fn with_offers(phase: Phase, content: &RevealContent, options: &RenderOptions) -> Vec<Element> {
    let amount = content
        .cashback
        .as_ref()
        .map(|c| c.display_amount(&options.default_currency));
    let mut elements = Vec::new();

    if let Some(amount) = &amount
        && phase >= 1
    {
        elements.push(Element::WinBanner {
            text: win_text(amount),
            compact: phase >= 3,
        });
    }

    if phase == 2 {
        elements.push(Element::Confetti {
            particles: options.particle_count,
        });
        if let Some(amount) = &amount {
            elements.push(Element::CashbackCard {
                amount: amount.clone(),
                motion: CardMotion::PoppingIn,
                footer: None,
            });
        }
    }

    if let Some(amount) = &amount
        && phase >= 3
    {
        elements.push(Element::CashbackRow {
            amount: amount.clone(),
        });
    }

    if phase >= 4 {
        let offers = content
            .offers
            .iter()
            .enumerate()
            .map(|(i, offer)| OfferCard {
                offer: offer.clone(),
                enter_delay_ms: i as u32 * OFFER_STAGGER_MS,
            })
            .collect();
        elements.push(Element::OfferList { offers });
    }

    elements
}
