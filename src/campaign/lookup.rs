use std::collections::HashMap;

use super::{BidLookup, Country, Device, Os, TargetingKey};

type DeviceBuckets = HashMap<Device, HashMap<Os, Vec<BidLookup>>>;

/// Targeting index: country, then device, then os, down to the bids that
/// can serve that triple.
///
/// Each bucket is kept sorted by bid, highest first. Campaigns with equal
/// bids keep the order they were inserted in, so the oldest one is served
/// first. Buckets are never removed and entries are never updated; whether
/// an entry can still serve is decided by the campaign record at match time.
#[derive(Debug, Default)]
pub struct CampaignsLookup {
    countries: HashMap<Country, DeviceBuckets>,
}

impl CampaignsLookup {
    pub fn new() -> CampaignsLookup {
        CampaignsLookup::default()
    }

    pub fn bucket(&self, key: TargetingKey) -> Option<&[BidLookup]> {
        self.countries
            .get(&key.country)?
            .get(&key.device)?
            .get(&key.os)
            .map(Vec::as_slice)
    }

    /// Inserts the bid into its bucket, creating the bucket on first use, and
    /// returns the position it landed at.
    pub fn insert(&mut self, key: TargetingKey, bid: BidLookup) -> usize {
        let bucket = self.bucket_mut_or_create(key);

        // first position whose bid is strictly lower than the new one
        let position = bucket.partition_point(|existing| existing.bid >= bid.bid);
        bucket.insert(position, bid);

        position
    }

    fn bucket_mut_or_create(&mut self, key: TargetingKey) -> &mut Vec<BidLookup> {
        self.countries
            .entry(key.country)
            .or_default()
            .entry(key.device)
            .or_default()
            .entry(key.os)
            .or_default()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::campaign::CampaignId;

    fn key() -> TargetingKey {
        TargetingKey::new(Country::France, Device::Mobile, Os::Android)
    }

    fn bid(id: &str, bid: Decimal) -> BidLookup {
        BidLookup {
            id: CampaignId::from(id),
            bid,
        }
    }

    fn default_lookup() -> CampaignsLookup {
        let mut lookup = CampaignsLookup::new();
        lookup.insert(key(), bid("a0", dec!(50)));
        lookup.insert(key(), bid("a1", dec!(30.1)));
        lookup.insert(key(), bid("a2", dec!(30.1)));
        lookup.insert(key(), bid("a3", dec!(20)));
        lookup
    }

    fn ids(lookup: &CampaignsLookup, key: TargetingKey) -> Vec<&str> {
        lookup
            .bucket(key)
            .unwrap()
            .iter()
            .map(|entry| entry.id.as_str())
            .collect()
    }

    #[test]
    fn missing_bucket_is_none() {
        let lookup = default_lookup();

        assert!(lookup
            .bucket(TargetingKey::new(Country::France, Device::Mobile, Os::Ios))
            .is_none());
        assert!(lookup
            .bucket(TargetingKey::new(Country::Spain, Device::Mobile, Os::Android))
            .is_none());
    }

    #[test]
    fn first_insert_creates_bucket() {
        let mut lookup = CampaignsLookup::new();

        let position = lookup.insert(key(), bid("camp1", dec!(5)));

        assert_eq!(position, 0);
        assert_eq!(ids(&lookup, key()), vec!["camp1"]);
    }

    #[test]
    fn highest_bid_goes_first() {
        let mut lookup = default_lookup();

        let position = lookup.insert(key(), bid("camp1", dec!(90.5)));

        assert_eq!(position, 0);
        assert_eq!(ids(&lookup, key()), vec!["camp1", "a0", "a1", "a2", "a3"]);
    }

    #[test]
    fn equal_bid_goes_after_existing_equal_bids() {
        let mut lookup = default_lookup();

        let position = lookup.insert(key(), bid("camp1", dec!(30.1)));

        assert_eq!(position, 3);
        assert_eq!(ids(&lookup, key()), vec!["a0", "a1", "a2", "camp1", "a3"]);
    }

    #[test]
    fn lowest_bid_goes_last() {
        let mut lookup = default_lookup();

        let position = lookup.insert(key(), bid("camp1", dec!(0.01)));

        assert_eq!(position, 4);
    }

    #[test]
    fn equal_comparison_ignores_decimal_scale() {
        let mut lookup = default_lookup();

        let position = lookup.insert(key(), bid("camp1", dec!(20.00)));

        assert_eq!(position, 4);
    }

    #[test]
    fn buckets_are_independent() {
        let mut lookup = default_lookup();
        let other = TargetingKey::new(Country::France, Device::Tablet, Os::Android);

        lookup.insert(other, bid("t0", dec!(1000)));

        assert_eq!(ids(&lookup, other), vec!["t0"]);
        assert_eq!(ids(&lookup, key()), vec!["a0", "a1", "a2", "a3"]);
    }
}
