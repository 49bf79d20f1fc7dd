use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Country {
    #[serde(rename = "FR")]
    France,
    #[serde(rename = "ES")]
    Spain,
    #[serde(rename = "UK")]
    UnitedKingdom,
    #[serde(rename = "US")]
    UnitedStates,
}

impl Country {
    pub fn as_str(&self) -> &'static str {
        match self {
            Country::France => "FR",
            Country::Spain => "ES",
            Country::UnitedKingdom => "UK",
            Country::UnitedStates => "US",
        }
    }
}

impl FromStr for Country {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FR" => Ok(Country::France),
            "ES" => Ok(Country::Spain),
            "UK" => Ok(Country::UnitedKingdom),
            "US" => Ok(Country::UnitedStates),
            _ => Err(Error::InvalidCountry {
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    Mobile,
    Desktop,
    Tablet,
}

impl Device {
    pub fn as_str(&self) -> &'static str {
        match self {
            Device::Mobile => "mobile",
            Device::Desktop => "desktop",
            Device::Tablet => "tablet",
        }
    }
}

impl FromStr for Device {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mobile" => Ok(Device::Mobile),
            "desktop" => Ok(Device::Desktop),
            "tablet" => Ok(Device::Tablet),
            _ => Err(Error::InvalidDevice {
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    Android,
    Ios,
    Windows,
    Mac,
    Linux,
}

impl Os {
    pub fn as_str(&self) -> &'static str {
        match self {
            Os::Android => "android",
            Os::Ios => "ios",
            Os::Windows => "windows",
            Os::Mac => "mac",
            Os::Linux => "linux",
        }
    }
}

impl FromStr for Os {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "android" => Ok(Os::Android),
            "ios" => Ok(Os::Ios),
            "windows" => Ok(Os::Windows),
            "mac" => Ok(Os::Mac),
            "linux" => Ok(Os::Linux),
            _ => Err(Error::InvalidOs {
                value: s.to_string(),
            }),
        }
    }
}

macro_rules! display_as_str {
    ($($t:ty),*) => {
        $(
            impl Display for $t {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
                    f.write_str(self.as_str())
                }
            }
        )*
    };
}

display_as_str!(Country, Device, Os);

/// The (country, device, os) triple campaigns are bucketed by.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct TargetingKey {
    pub country: Country,
    pub device: Device,
    pub os: Os,
}

impl TargetingKey {
    pub fn new(country: Country, device: Device, os: Os) -> TargetingKey {
        TargetingKey {
            country,
            device,
            os,
        }
    }

    /// Parses raw targeting values, reporting the first one that is unknown.
    pub fn parse(country: &str, device: &str, os: &str) -> Result<TargetingKey, Error> {
        Ok(TargetingKey {
            country: country.parse()?,
            device: device.parse()?,
            os: os.parse()?,
        })
    }
}

impl Display for TargetingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}, {}, {}", self.country, self.device, self.os)
    }
}
