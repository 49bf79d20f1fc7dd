use std::fmt::{Debug, Display};

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub mod db;
pub mod endpoints;
pub mod lookup;
pub mod manager;
pub mod targeting;
pub use endpoints::*;

pub use targeting::{Country, Device, Os, TargetingKey};

#[derive(Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct CampaignId(String);

impl CampaignId {
    pub fn new(id: impl Into<String>) -> CampaignId {
        CampaignId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CampaignId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        f.write_str(&self.0)
    }
}

impl Debug for CampaignId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        Debug::fmt(&self.0, f)
    }
}

impl From<&str> for CampaignId {
    fn from(id: &str) -> CampaignId {
        CampaignId(id.to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Campaign {
    pub id: CampaignId,
    pub country: Country,
    pub device: Device,
    pub os: Os,
    pub bid: Decimal,
    pub budget: Decimal,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Campaign {
    pub fn targeting(&self) -> TargetingKey {
        TargetingKey {
            country: self.country,
            device: self.device,
            os: self.os,
        }
    }

    /// Whether the remaining budget covers at least one more impression.
    pub fn can_afford_bid(&self) -> bool {
        self.budget >= self.bid
    }
}

/// The moment a campaign created at `created_at` expires, or `None` when it
/// falls outside the representable date range.
pub fn expiry_after(created_at: DateTime<Utc>, active_days: u32) -> Option<DateTime<Utc>> {
    Duration::try_days(i64::from(active_days))
        .and_then(|active| created_at.checked_add_signed(active))
}

/// A campaign as submitted by a caller, before the service stamps its
/// timestamps and initial state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewCampaign {
    pub id: CampaignId,
    pub country: Country,
    pub device: Device,
    pub os: Os,
    pub bid: Decimal,
    pub budget: Decimal,
}

/// Index projection of a campaign: its id and the bid it was created with.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct BidLookup {
    pub id: CampaignId,
    pub bid: Decimal,
}
