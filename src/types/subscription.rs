use serde::Deserialize;
use uuid::Uuid;

use crate::{error::Error, model::MonthYear};

/// Request body for creating or replacing a subscription.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionPayload {
    pub service_name: String,
    pub price: i32,
    pub user_id: Uuid,
    pub start_date: MonthYear,
    #[serde(default)]
    pub end_date: Option<MonthYear>,
}

impl SubscriptionPayload {
    pub fn validate(&self) -> Result<(), Error> {
        if self.service_name.trim().is_empty() {
            return Err(Error::InvalidSubscription(String::from(
                "service_name must not be empty",
            )));
        }

        if self.price < 0 {
            return Err(Error::InvalidSubscription(format!(
                "price must be non-negative, got {}",
                self.price
            )));
        }

        if let Some(end_date) = self.end_date {
            if end_date < self.start_date {
                return Err(Error::InvalidSubscription(format!(
                    "end_date {} is before start_date {}",
                    end_date, self.start_date
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(json: serde_json::Value) -> SubscriptionPayload {
        serde_json::from_value(json).unwrap()
    }

    fn valid() -> serde_json::Value {
        serde_json::json!({
            "service_name": "Yandex Plus",
            "price": 400,
            "user_id": "60601fee-2bf1-4721-ae6f-7636e79a0cba",
            "start_date": "07-2025"
        })
    }

    #[test]
    fn test_open_ended_payload_is_valid() {
        let data = payload(valid());
        assert!(data.end_date.is_none());
        assert!(data.validate().is_ok());
    }

    #[test]
    fn test_same_month_start_and_end_is_valid() {
        let mut json = valid();
        json["end_date"] = "07-2025".into();
        assert!(payload(json).validate().is_ok());
    }

    #[test]
    fn test_end_before_start_is_rejected() {
        let mut json = valid();
        json["end_date"] = "06-2025".into();
        assert!(matches!(
            payload(json).validate(),
            Err(Error::InvalidSubscription(_))
        ));
    }

    #[test]
    fn test_blank_service_and_negative_price_are_rejected() {
        let mut json = valid();
        json["service_name"] = "  ".into();
        assert!(payload(json).validate().is_err());

        let mut json = valid();
        json["price"] = (-1).into();
        assert!(payload(json).validate().is_err());
    }

    #[test]
    fn test_malformed_dates_fail_deserialization() {
        let mut json = valid();
        json["start_date"] = "2025-07".into();
        assert!(serde_json::from_value::<SubscriptionPayload>(json).is_err());
    }
}
