use actix_web::{get, web, Responder};
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use uuid::Uuid;

use crate::{
    configuration::{AppState, State},
    dao::SumFilter,
    error::Error,
};

#[get("/subscriptions/sum")]
pub async fn index(
    state: web::Data<AppState<State>>,
    data: web::Query<Query>,
) -> Result<impl Responder, Error> {
    let filter = data.to_filter()?;
    let sum = timeout(
        state.config.query_timeout,
        state.database.subscription.get_sum(&filter),
    )
    .await??;

    Ok(web::Json(Response { sum }))
}

#[derive(Debug, Deserialize)]
pub struct Query {
    start: Option<String>,
    end: Option<String>,
    user_id: Option<String>,
    service_name: Option<String>,
}

impl Query {
    /// Only `start` and `end` are required. The legacy endpoint rejected a
    /// request missing any of the four params; here a missing or empty
    /// `user_id`/`service_name` means "no filter", and so does the nil UUID.
    fn to_filter(&self) -> Result<SumFilter, Error> {
        let start = present(&self.start)
            .ok_or_else(|| Error::MissingParams(String::from("start")))?;
        let end = present(&self.end)
            .ok_or_else(|| Error::MissingParams(String::from("end")))?;

        let user_id = match present(&self.user_id) {
            Some(value) => {
                let user_id = Uuid::parse_str(value).map_err(|e| {
                    Error::InvalidFilter(format!("user_id: {}", e))
                })?;
                (!user_id.is_nil()).then_some(user_id)
            },
            None => None,
        };
        let service_name = present(&self.service_name).map(str::to_owned);

        SumFilter::from_params(start, end, user_id, service_name)
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    pub sum: i64,
}
