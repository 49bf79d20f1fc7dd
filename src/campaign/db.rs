use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::error;

use crate::error::Error;

use super::lookup::CampaignsLookup;
use super::{BidLookup, Campaign, CampaignId, TargetingKey};

pub trait CampaignStore: Send + Sync {
    fn insert_campaign(&self, campaign: &Campaign) -> Result<(), Error>;

    fn match_campaign(&self, targeting: TargetingKey) -> Result<Option<BidLookup>, Error>;

    fn deactivate_expired_campaigns(&self, now: DateTime<Utc>) -> usize;

    fn fetch_campaign_by_id(&self, campaign_id: &CampaignId) -> Option<Campaign>;
}

#[derive(Debug, Default)]
struct CampaignTables {
    campaigns: HashMap<CampaignId, Campaign>,
    lookup: CampaignsLookup,
}

/// Campaign records and their targeting index, guarded together by a single
/// exclusive lock. Every operation holds it from start to finish.
#[derive(Debug, Default)]
pub struct MemoryCampaignStore {
    tables: Mutex<CampaignTables>,
}

impl MemoryCampaignStore {
    pub fn new() -> MemoryCampaignStore {
        MemoryCampaignStore::default()
    }
}

impl CampaignStore for MemoryCampaignStore {
    #[tracing::instrument(skip(self))]
    fn insert_campaign(&self, campaign: &Campaign) -> Result<(), Error> {
        let mut tables = self.tables.lock();

        if tables.campaigns.contains_key(&campaign.id) {
            return Err(Error::CampaignAlreadyExists {
                campaign_id: campaign.id.clone(),
            });
        }

        tables
            .campaigns
            .insert(campaign.id.clone(), campaign.clone());
        tables.lookup.insert(
            campaign.targeting(),
            BidLookup {
                id: campaign.id.clone(),
                bid: campaign.bid,
            },
        );

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    fn match_campaign(&self, targeting: TargetingKey) -> Result<Option<BidLookup>, Error> {
        let mut tables = self.tables.lock();
        let CampaignTables { campaigns, lookup } = &mut *tables;

        let bucket = lookup
            .bucket(targeting)
            .filter(|bucket| !bucket.is_empty())
            .ok_or(Error::TargetingNotFound { targeting })?;

        for entry in bucket {
            let campaign = match campaigns.get_mut(&entry.id) {
                Some(campaign) => campaign,
                None => {
                    error!(campaign_id = %entry.id, "targeting index references non-existent campaign");
                    continue;
                }
            };

            if !campaign.active {
                continue;
            }

            campaign.budget -= campaign.bid;
            if !campaign.can_afford_bid() {
                campaign.active = false;
            }

            return Ok(Some(entry.clone()));
        }

        Ok(None)
    }

    #[tracing::instrument(skip(self))]
    fn deactivate_expired_campaigns(&self, now: DateTime<Utc>) -> usize {
        let mut tables = self.tables.lock();

        let mut deactivated = 0;
        for campaign in tables.campaigns.values_mut() {
            if campaign.active && campaign.expires_at < now {
                campaign.active = false;
                deactivated += 1;
            }
        }

        deactivated
    }

    #[tracing::instrument(skip(self))]
    fn fetch_campaign_by_id(&self, campaign_id: &CampaignId) -> Option<Campaign> {
        self.tables.lock().campaigns.get(campaign_id).cloned()
    }
}
