use crate::campaign::db::{CampaignStore, MemoryCampaignStore};

pub trait Database: Send + Sync {
    fn campaigns(&self) -> &dyn CampaignStore;
}

/// Composition root for the in-memory stores. Built once at startup and
/// shared by reference with every handler and background task.
#[derive(Debug, Default)]
pub struct MemoryDatabase {
    campaigns: MemoryCampaignStore,
}

impl MemoryDatabase {
    pub fn new() -> MemoryDatabase {
        MemoryDatabase {
            campaigns: MemoryCampaignStore::new(),
        }
    }
}

impl Database for MemoryDatabase {
    fn campaigns(&self) -> &dyn CampaignStore {
        &self.campaigns
    }
}

#[cfg(test)]
pub mod test {
    use chrono::{DateTime, Utc};

    use super::Database;
    use crate::campaign::db::CampaignStore;
    use crate::campaign::{BidLookup, Campaign, CampaignId, TargetingKey};
    use crate::error::Error;

    type Callback<A, R> = Box<dyn Fn(A) -> R + Send + Sync>;

    pub struct MockCampaignStore {
        pub on_insert_campaign: Callback<Campaign, Result<(), Error>>,
        pub on_match_campaign: Callback<TargetingKey, Result<Option<BidLookup>, Error>>,
        pub on_deactivate_expired_campaigns: Callback<DateTime<Utc>, usize>,
        pub on_fetch_campaign_by_id: Callback<CampaignId, Option<Campaign>>,
    }

    impl MockCampaignStore {
        pub fn new() -> MockCampaignStore {
            MockCampaignStore {
                on_insert_campaign: Box::new(|_| panic!("unexpected call to insert_campaign")),
                on_match_campaign: Box::new(|_| panic!("unexpected call to match_campaign")),
                on_deactivate_expired_campaigns: Box::new(|_| {
                    panic!("unexpected call to deactivate_expired_campaigns")
                }),
                on_fetch_campaign_by_id: Box::new(|_| {
                    panic!("unexpected call to fetch_campaign_by_id")
                }),
            }
        }
    }

    impl CampaignStore for MockCampaignStore {
        fn insert_campaign(&self, campaign: &Campaign) -> Result<(), Error> {
            (self.on_insert_campaign)(campaign.clone())
        }

        fn match_campaign(&self, targeting: TargetingKey) -> Result<Option<BidLookup>, Error> {
            (self.on_match_campaign)(targeting)
        }

        fn deactivate_expired_campaigns(&self, now: DateTime<Utc>) -> usize {
            (self.on_deactivate_expired_campaigns)(now)
        }

        fn fetch_campaign_by_id(&self, campaign_id: &CampaignId) -> Option<Campaign> {
            (self.on_fetch_campaign_by_id)(campaign_id.clone())
        }
    }

    pub struct MockDatabase {
        pub campaigns: MockCampaignStore,
    }

    impl MockDatabase {
        pub fn new() -> MockDatabase {
            MockDatabase {
                campaigns: MockCampaignStore::new(),
            }
        }
    }

    impl Database for MockDatabase {
        fn campaigns(&self) -> &dyn CampaignStore {
            &self.campaigns
        }
    }
}
