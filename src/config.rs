use std::env;
use std::str::FromStr;

use chrono::{NaiveTime, Utc};

use crate::campaign::expiry_after;
use crate::error::Error;

const BIND_ADDRESS: &str = "BIND_ADDRESS";
const CAMPAIGN_ACTIVE_DAYS: &str = "CAMPAIGN_ACTIVE_DAYS";
const CONSENT_VENDOR_ID: &str = "CONSENT_VENDOR_ID";
const EXPIRATION_CHECK_TIME: &str = "EXPIRATION_CHECK_TIME";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub bind_address: String,
    /// Days between a campaign's creation and its expiry.
    pub campaign_active_days: u32,
    pub consent_vendor_id: u32,
    /// Time of day (UTC) at which expired campaigns are deactivated.
    pub expiration_check_time: NaiveTime,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            bind_address: "127.0.0.1:8080".to_string(),
            campaign_active_days: 30,
            consent_vendor_id: 1231,
            expiration_check_time: NaiveTime::from_hms_opt(0, 1, 0).unwrap_or_default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Config, Error> {
        Config::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from `lookup`, falling back to the default for any
    /// variable it does not provide.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Config::default();

        let campaign_active_days = parse_var(&lookup, CAMPAIGN_ACTIVE_DAYS)?
            .unwrap_or(default.campaign_active_days);
        if expiry_after(Utc::now(), campaign_active_days).is_none() {
            return Err(Error::InvalidConfig {
                name: CAMPAIGN_ACTIVE_DAYS,
                value: campaign_active_days.to_string(),
            });
        }

        Ok(Config {
            bind_address: lookup(BIND_ADDRESS).unwrap_or(default.bind_address),
            campaign_active_days,
            consent_vendor_id: parse_var(&lookup, CONSENT_VENDOR_ID)?
                .unwrap_or(default.consent_vendor_id),
            expiration_check_time: match lookup(EXPIRATION_CHECK_TIME) {
                Some(value) => NaiveTime::parse_from_str(&value, "%H:%M").map_err(|_| {
                    Error::InvalidConfig {
                        name: EXPIRATION_CHECK_TIME,
                        value,
                    }
                })?,
                None => default.expiration_check_time,
            },
        })
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str) -> Result<Option<T>, Error>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(value) => match value.trim().parse() {
            Ok(parsed) => Ok(Some(parsed)),
            Err(_) => Err(Error::InvalidConfig { name, value }),
        },
        None => Ok(None),
    }
}
