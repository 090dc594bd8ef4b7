//! Demo presets mirroring the payment-success demo page.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::reveal::model::{Cashback, RevealConfig, RewardOffer};

/// Which demo scenario to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DemoCase {
    /// Cashback card only.
    Cashback,
    /// Cashback followed by an offer card.
    #[default]
    Offers,
    /// Nothing won.
    Empty,
}

impl DemoCase {
    /// The cashback shown by the demo page.
    pub fn cashback() -> Cashback {
        Cashback::new(Decimal::from(10)).with_currency("₹")
    }

    /// The single card-issuer offer shown by the demo page.
    pub fn offers() -> Vec<RewardOffer> {
        vec![
            RewardOffer::new(
                "card-offer",
                "₹200 cashback on all purchase",
                "5% cashback on online spends",
                "Apply now",
            )
            .with_subtitle("Card exclusive offer"),
        ]
    }

    /// Configuration for this case, without a completion hook.
    pub fn config(&self) -> RevealConfig {
        match self {
            Self::Cashback => RevealConfig::new().with_cashback(Self::cashback()),
            Self::Offers => RevealConfig::new()
                .with_cashback(Self::cashback())
                .with_offers(Self::offers()),
            Self::Empty => RevealConfig::new(),
        }
    }
}

impl fmt::Display for DemoCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cashback => write!(f, "cashback"),
            Self::Offers => write!(f, "offers"),
            Self::Empty => write!(f, "empty"),
        }
    }
}

impl FromStr for DemoCase {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cashback" => Ok(Self::Cashback),
            "offers" => Ok(Self::Offers),
            "empty" => Ok(Self::Empty),
            _ => Err(format!("Unknown demo case: {} (expected cashback, offers or empty)", s)),
        }
    }
}
