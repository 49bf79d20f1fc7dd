use chrono::Utc;
use tracing::{info, warn};

use crate::database::Database;
use crate::error::Error;

use super::{
    expiry_after, BidLookup, Campaign, CampaignId, Country, Device, NewCampaign, Os, TargetingKey,
};

/// Stamps the campaign with its creation and expiry times and stores it.
///
/// A campaign whose budget does not cover a single bid is still stored, but
/// starts out inactive and never becomes active.
#[tracing::instrument(skip(db))]
pub fn create_campaign(
    db: &dyn Database,
    active_days: u32,
    new_campaign: NewCampaign,
) -> Result<Campaign, Error> {
    let now = Utc::now();
    let expires_at = expiry_after(now, active_days).ok_or_else(|| Error::InvalidConfig {
        name: "CAMPAIGN_ACTIVE_DAYS",
        value: active_days.to_string(),
    })?;

    let mut campaign = Campaign {
        id: new_campaign.id,
        country: new_campaign.country,
        device: new_campaign.device,
        os: new_campaign.os,
        bid: new_campaign.bid,
        budget: new_campaign.budget,
        active: false,
        created_at: now,
        expires_at,
    };
    campaign.active = campaign.can_afford_bid();

    if let Err(err) = db.campaigns().insert_campaign(&campaign) {
        warn!(campaign_id = %campaign.id, "campaign was rejected: {}", err);
        return Err(err);
    }

    Ok(campaign)
}

#[tracing::instrument(skip(db))]
pub fn match_campaign(
    db: &dyn Database,
    country: Country,
    device: Device,
    os: Os,
) -> Result<Option<BidLookup>, Error> {
    db.campaigns()
        .match_campaign(TargetingKey::new(country, device, os))
}

#[tracing::instrument(skip(db))]
pub fn get_campaign_by_id(db: &dyn Database, campaign_id: CampaignId) -> Result<Campaign, Error> {
    let campaign = db
        .campaigns()
        .fetch_campaign_by_id(&campaign_id)
        .ok_or(Error::CampaignNotFound { campaign_id })?;

    Ok(campaign)
}

#[tracing::instrument(skip(db))]
pub fn deactivate_expired_campaigns(db: &dyn Database) {
    let deactivated = db.campaigns().deactivate_expired_campaigns(Utc::now());

    info!(deactivated, "deactivated expired campaigns");
}
