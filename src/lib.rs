use actix_web::web::{self, JsonConfig};
use actix_web::{HttpResponse, ResponseError};

pub mod campaign;
pub mod config;
pub mod consent;
pub mod database;
pub mod error;
pub mod expiration;

pub use campaign::{CampaignBody, CreateCampaignBody, MatchCampaignBody, MatchCampaignResponse};
pub use config::Config;
pub use database::{Database, MemoryDatabase};
pub use error::Error;

/// Registers the campaign endpoints and the json error format.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(JsonConfig::default().error_handler(|err, _req| {
        // format json errors with custom format
        Error::InvalidJson(err).into()
    }))
    .service(campaign::endpoints::create_campaign)
    .service(campaign::endpoints::get_campaign_by_id)
    .service(campaign::endpoints::deliver_campaign);
}

pub async fn not_found() -> HttpResponse {
    Error::PathNotFound.error_response()
}
