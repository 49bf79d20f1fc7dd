use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::web::{Data, Json, Path};
use actix_web::{get, post, FromRequest, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::consent;
use crate::database::Database;
use crate::error::Error;

use super::{manager, Campaign, CampaignId, Country, Device, NewCampaign, Os, TargetingKey};

pub const CONSENT_HEADER: &str = "X-Consent-String";

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CreateCampaignBody {
    pub id: String,
    pub country: String,
    pub device: String,
    pub os: String,
    pub bid: Decimal,
    pub budget: Decimal,
}

impl CreateCampaignBody {
    pub fn validate(self) -> Result<NewCampaign, Error> {
        if self.id.is_empty() {
            return Err(Error::MissingCampaignId);
        }

        let targeting = TargetingKey::parse(&self.country, &self.device, &self.os)?;

        if self.bid <= Decimal::ZERO {
            return Err(Error::InvalidBid { bid: self.bid });
        }

        if self.budget < Decimal::ZERO {
            return Err(Error::InvalidBudget {
                budget: self.budget,
            });
        }

        Ok(NewCampaign {
            id: CampaignId::new(self.id),
            country: targeting.country,
            device: targeting.device,
            os: targeting.os,
            bid: self.bid,
            budget: self.budget,
        })
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CampaignBody {
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

impl CampaignBody {
    pub fn render(campaign: Campaign) -> CampaignBody {
        CampaignBody {
            id: campaign.id,
            country: campaign.country,
            device: campaign.device,
            os: campaign.os,
            bid: campaign.bid,
            budget: campaign.budget,
            active: campaign.active,
            created_at: campaign.created_at,
            expires_at: campaign.expires_at,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MatchCampaignBody {
    pub country: String,
    pub device: String,
    pub os: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MatchCampaignResponse {
    pub campaign_id: CampaignId,
    pub bid: Decimal,
}

/// Request guard for the consent header. Listed before the body in a
/// handler's arguments so consent is checked before the body is read.
#[derive(Debug)]
pub struct ConsentGiven;

impl ConsentGiven {
    fn check(request: &HttpRequest) -> Result<ConsentGiven, Error> {
        let token = request
            .headers()
            .get(CONSENT_HEADER)
            .map(|value| value.to_str())
            .transpose()
            .map_err(|_| Error::InvalidConsentString {
                reason: "header is not visible ascii".to_string(),
            })?
            .filter(|token| !token.is_empty())
            .ok_or(Error::MissingConsentString)?;

        let vendor_id = match request.app_data::<Data<Config>>() {
            Some(config) => config.consent_vendor_id,
            None => Config::default().consent_vendor_id,
        };

        if !consent::check_consent(token, vendor_id)? {
            return Err(Error::ConsentNotGiven);
        }

        Ok(ConsentGiven)
    }
}

impl FromRequest for ConsentGiven {
    type Error = Error;
    type Future = Ready<Result<ConsentGiven, Error>>;

    fn from_request(request: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(ConsentGiven::check(request))
    }
}

#[post("/campaigns")]
#[tracing::instrument(skip(db, config))]
pub async fn create_campaign(
    db: Data<dyn Database>,
    config: Data<Config>,
    body: Json<CreateCampaignBody>,
) -> Result<HttpResponse, Error> {
    let new_campaign = body.into_inner().validate()?;

    manager::create_campaign(db.get_ref(), config.campaign_active_days, new_campaign)?;

    Ok(HttpResponse::Created().finish())
}

#[get("/campaigns/{campaign_id}")]
#[tracing::instrument(skip(db))]
pub async fn get_campaign_by_id(
    db: Data<dyn Database>,
    params: Path<String>,
) -> Result<Json<CampaignBody>, Error> {
    let campaign_id = CampaignId::new(params.into_inner());

    let campaign = manager::get_campaign_by_id(db.get_ref(), campaign_id)?;

    Ok(Json(CampaignBody::render(campaign)))
}

#[post("/deliver")]
#[tracing::instrument(skip(db))]
pub async fn deliver_campaign(
    db: Data<dyn Database>,
    _consent: ConsentGiven,
    body: Json<MatchCampaignBody>,
) -> Result<HttpResponse, Error> {
    let body = body.into_inner();
    let targeting = TargetingKey::parse(&body.country, &body.device, &body.os)?;

    let matched = manager::match_campaign(
        db.get_ref(),
        targeting.country,
        targeting.device,
        targeting.os,
    )?;

    match matched {
        Some(bid_lookup) => Ok(HttpResponse::Ok().json(MatchCampaignResponse {
            campaign_id: bid_lookup.id,
            bid: bid_lookup.bid,
        })),
        None => Ok(HttpResponse::NoContent().finish()),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn body() -> CreateCampaignBody {
        CreateCampaignBody {
            id: "camp123".to_string(),
            country: "FR".to_string(),
            device: "mobile".to_string(),
            os: "android".to_string(),
            bid: dec!(1.5),
            budget: dec!(100),
        }
    }

    #[test]
    fn valid_body_becomes_new_campaign() {
        let new_campaign = body().validate().unwrap();

        assert_eq!(
            new_campaign,
            NewCampaign {
                id: "camp123".into(),
                country: Country::France,
                device: Device::Mobile,
                os: Os::Android,
                bid: dec!(1.5),
                budget: dec!(100),
            }
        );
    }

    #[test]
    fn missing_id_is_rejected() {
        let body = CreateCampaignBody {
            id: String::new(),
            ..body()
        };

        assert_eq!(body.validate().unwrap_err(), Error::MissingCampaignId);
    }

    #[test]
    fn non_positive_bid_is_rejected() {
        for bid in [dec!(-1.5), dec!(0)] {
            let body = CreateCampaignBody { bid, ..body() };

            assert_eq!(body.validate().unwrap_err(), Error::InvalidBid { bid });
        }
    }

    #[test]
    fn negative_budget_is_rejected_but_zero_is_accepted() {
        let negative = CreateCampaignBody {
            budget: dec!(-100),
            ..body()
        };
        let zero = CreateCampaignBody {
            budget: dec!(0),
            ..body()
        };

        assert_eq!(
            negative.validate().unwrap_err(),
            Error::InvalidBudget {
                budget: dec!(-100)
            }
        );
        assert!(zero.validate().is_ok());
    }

    #[test]
    fn targeting_is_checked_before_amounts() {
        let body = CreateCampaignBody {
            os: "invalid_os".to_string(),
            bid: dec!(-1),
            ..body()
        };

        assert_eq!(
            body.validate().unwrap_err(),
            Error::InvalidOs {
                value: "invalid_os".to_string()
            }
        );
    }
}
