use actix_cors::Cors;
use actix_web::{dev::Server, http::header, middleware, web, App, HttpServer};
use tracing::info;

use crate::{
    configuration::{AppState, State},
    controller::{subscription, subscription_sum},
    error::Error,
};

pub async fn server_task(app_state: &AppState<State>) -> Result<(), Error> {
    let app = app_state.clone();
    tokio::spawn(async move {
        let server = init_server(app)?;
        server.await?;
        Ok(())
    })
    .await?
}

fn init_server(app_state: AppState<State>) -> Result<Server, Error> {
    let host = app_state.config.server_host.to_owned();
    let port = app_state.config.port;

    info!("Starting server on {}:{}", host, port);

    let server = HttpServer::new(move || {
        let app = app_state.clone();
        let cors_access_all = app.config.allows_any_origin();
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _| {
                if cors_access_all {
                    return true;
                }
                let allowed = &app.config.allowed_origins;
                if let Ok(origin) = origin.to_str() {
                    return allowed.iter().any(|item| item == origin);
                }
                false
            })
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
            .allowed_headers(vec![header::ORIGIN, header::AUTHORIZATION])
            .allowed_header(header::CONTENT_TYPE)
            .expose_headers(vec![header::CONTENT_LENGTH])
            .max_age(12 * 60 * 60);

        App::new()
            .wrap(cors)
            .wrap(middleware::Compress::default())
            .app_data(web::Data::new(app_state.clone()))
            .configure(routes)
    })
    .bind((host, port))?
    .run();
    Ok(server)
}

/// `/subscriptions/sum` is registered ahead of `/subscriptions/{id}` so the
/// literal segment wins.
pub fn routes(cfg: &mut web::ServiceConfig) {
    let json_config = web::JsonConfig::default().limit(4096).error_handler(
        |err, _req| Error::InvalidSubscription(err.to_string()).into(),
    );

    cfg.app_data(json_config)
        .service(subscription_sum::index)
        .service(subscription::post_index)
        .service(subscription::get_all)
        .service(subscription::get_index)
        .service(subscription::put_index)
        .service(subscription::delete_index);
}
