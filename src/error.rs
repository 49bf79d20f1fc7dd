use std::fmt::{Debug, Display};
use std::io::Error as IoError;

use actix_web::error::JsonPayloadError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use derivative::Derivative;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

use crate::campaign::{CampaignId, TargetingKey};

#[derive(Debug, Serialize, Derivative)]
#[derivative(PartialEq, Eq)]
#[serde(untagged)]
pub enum Error {
    // 400
    #[serde(serialize_with = "display")]
    InvalidJson(#[derivative(PartialEq = "ignore")] JsonPayloadError),
    MissingCampaignId,
    InvalidCountry {
        value: String,
    },
    InvalidDevice {
        value: String,
    },
    InvalidOs {
        value: String,
    },
    InvalidBid {
        bid: Decimal,
    },
    InvalidBudget {
        budget: Decimal,
    },
    MissingConsentString,
    InvalidConsentString {
        reason: String,
    },
    ConsentNotGiven,

    // 404
    PathNotFound,
    TargetingNotFound {
        targeting: TargetingKey,
    },
    CampaignNotFound {
        campaign_id: CampaignId,
    },

    // 409
    CampaignAlreadyExists {
        campaign_id: CampaignId,
    },

    // 500
    InvalidConfig {
        name: &'static str,
        value: String,
    },
    #[serde(serialize_with = "display")]
    IoError(#[derivative(PartialEq = "ignore")] IoError),
}

impl Error {
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::InvalidJson(_) => "E4001000",
            Error::MissingCampaignId => "E4001001",
            Error::InvalidCountry { .. } => "E4001002",
            Error::InvalidDevice { .. } => "E4001003",
            Error::InvalidOs { .. } => "E4001004",
            Error::InvalidBid { .. } => "E4001005",
            Error::InvalidBudget { .. } => "E4001006",
            Error::MissingConsentString => "E4001007",
            Error::InvalidConsentString { .. } => "E4001008",
            Error::ConsentNotGiven => "E4001009",
            Error::PathNotFound => "E4041000",
            Error::TargetingNotFound { .. } => "E4041001",
            Error::CampaignNotFound { .. } => "E4041002",
            Error::CampaignAlreadyExists { .. } => "E4091000",
            Error::InvalidConfig { .. } => "E5001000",
            Error::IoError(_) => "E5001001",
        }
    }

    pub fn error_message(&self) -> &'static str {
        match self {
            Error::InvalidJson(_) => "The given json could not be parsed",
            Error::MissingCampaignId => "The campaign id is missing",
            Error::InvalidCountry { .. } => "The given country is not supported",
            Error::InvalidDevice { .. } => "The given device is not supported",
            Error::InvalidOs { .. } => "The given os is not supported",
            Error::InvalidBid { .. } => "The bid must be greater than zero",
            Error::InvalidBudget { .. } => "The budget must not be negative",
            Error::MissingConsentString => "The X-Consent-String header is missing",
            Error::InvalidConsentString { .. } => "The consent string could not be parsed",
            Error::ConsentNotGiven => "The consent string does not allow personalized ads",
            Error::PathNotFound => "The requested path was not found",
            Error::TargetingNotFound { .. } => "No campaign was found for the requested targeting",
            Error::CampaignNotFound { .. } => "The requested campaign was not found",
            Error::CampaignAlreadyExists { .. } => "A campaign with the given id already exists",
            Error::InvalidConfig { .. } => "A configuration value could not be parsed",
            Error::IoError(_) => "An error occurred during an I/O operation",
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidJson(_) => StatusCode::BAD_REQUEST,
            Error::MissingCampaignId => StatusCode::BAD_REQUEST,
            Error::InvalidCountry { .. } => StatusCode::BAD_REQUEST,
            Error::InvalidDevice { .. } => StatusCode::BAD_REQUEST,
            Error::InvalidOs { .. } => StatusCode::BAD_REQUEST,
            Error::InvalidBid { .. } => StatusCode::BAD_REQUEST,
            Error::InvalidBudget { .. } => StatusCode::BAD_REQUEST,
            Error::MissingConsentString => StatusCode::BAD_REQUEST,
            Error::InvalidConsentString { .. } => StatusCode::BAD_REQUEST,
            Error::ConsentNotGiven => StatusCode::BAD_REQUEST,
            Error::PathNotFound => StatusCode::NOT_FOUND,
            Error::TargetingNotFound { .. } => StatusCode::NOT_FOUND,
            Error::CampaignNotFound { .. } => StatusCode::NOT_FOUND,
            Error::CampaignAlreadyExists { .. } => StatusCode::CONFLICT,
            Error::InvalidConfig { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        #[derive(Serialize)]
        struct Dummy<'a> {
            error_code: &'static str,
            error_message: &'static str,
            error_meta: &'a Error,
        }

        HttpResponse::build(self.status_code()).json(&Dummy {
            error_code: self.error_code(),
            error_message: self.error_message(),
            error_meta: self,
        })
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        Debug::fmt(self, f)
    }
}

impl From<IoError> for Error {
    fn from(error: IoError) -> Error {
        Error::IoError(error)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidJson(err) => Some(err),
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}

fn display<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Display,
    S: Serializer,
{
    serializer.collect_str(value)
}

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::campaign::{Country, Device, Os};

    #[actix_web::test]
    async fn error_response_carries_code_message_and_meta() {
        let error = Error::InvalidBid { bid: dec!(-1.5) };

        let response = error.error_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "error_code": "E4001005",
                "error_message": "The bid must be greater than zero",
                "error_meta": { "bid": "-1.5" },
            })
        );
    }

    #[test]
    fn core_errors_map_to_not_found_and_conflict() {
        let not_found = Error::TargetingNotFound {
            targeting: TargetingKey::new(Country::France, Device::Mobile, Os::Android),
        };
        let conflict = Error::CampaignAlreadyExists {
            campaign_id: "camp1".into(),
        };

        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(conflict.status_code(), StatusCode::CONFLICT);
    }
}
