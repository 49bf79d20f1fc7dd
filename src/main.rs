use std::sync::Arc;

use actix_web::web::{self, Data};
use actix_web::{App, HttpServer};
use tracing::{info, Level};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::fmt::format::FmtSpan;

use campaign_delivery::{expiration, routes, Config, Database, Error, MemoryDatabase};

#[actix_web::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_span_events(FmtSpan::NEW)
        .compact()
        .init();

    let config = Config::from_env()?;
    info!(?config, "loaded config");

    let db: Arc<dyn Database> = Arc::new(MemoryDatabase::new());
    expiration::spawn_expiration_checker(Arc::clone(&db), config.expiration_check_time);

    let bind_address = config.bind_address.clone();
    let db = Data::from(db);
    let config = Data::new(config);

    info!("listening on: {}", bind_address);
    HttpServer::new(move || {
        App::new()
            .app_data(db.clone())
            .app_data(config.clone())
            .wrap(TracingLogger::default())
            .configure(routes)
            .default_service(web::to(campaign_delivery::not_found))
    })
    .bind(bind_address.as_str())?
    .run()
    .await?;

    Ok(())
}
