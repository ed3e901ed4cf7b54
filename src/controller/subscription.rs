use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde::Serialize;
use tracing::info;

use crate::{
    configuration::{AppState, State},
    error::Error,
    types::SubscriptionPayload,
};

#[post("/subscriptions")]
pub async fn post_index(
    state: web::Data<AppState<State>>,
    subscription: web::Json<SubscriptionPayload>,
) -> Result<HttpResponse, Error> {
    subscription.validate()?;
    let id = state.database.subscription.insert(&subscription).await?;
    info!("Created subscription {}", id);

    Ok(HttpResponse::Created().json(Created { id }))
}

#[get("/subscriptions")]
pub async fn get_all(
    state: web::Data<AppState<State>>,
) -> Result<impl Responder, Error> {
    let data = state.database.subscription.get_all().await?;
    Ok(web::Json(data))
}

#[get("/subscriptions/{id}")]
pub async fn get_index(
    state: web::Data<AppState<State>>,
    path: web::Path<String>,
) -> Result<impl Responder, Error> {
    let id = parse_id(&path)?;
    let data = state
        .database
        .subscription
        .get_one(id)
        .await?
        .ok_or(Error::NotFound(id))?;

    Ok(web::Json(data))
}

#[put("/subscriptions/{id}")]
pub async fn put_index(
    state: web::Data<AppState<State>>,
    path: web::Path<String>,
    subscription: web::Json<SubscriptionPayload>,
) -> Result<HttpResponse, Error> {
    let id = parse_id(&path)?;
    subscription.validate()?;
    state.database.subscription.update(id, &subscription).await?;
    info!("Updated subscription {}", id);

    Ok(HttpResponse::NoContent().finish())
}

#[delete("/subscriptions/{id}")]
pub async fn delete_index(
    state: web::Data<AppState<State>>,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let id = parse_id(&path)?;
    state.database.subscription.delete(id).await?;
    info!("Deleted subscription {}", id);

    Ok(HttpResponse::NoContent().finish())
}

fn parse_id(value: &str) -> Result<i64, Error> {
    match value.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(Error::InvalidId(value.to_owned())),
    }
}

#[derive(Debug, Serialize)]
pub struct Created {
    pub id: i64,
}
