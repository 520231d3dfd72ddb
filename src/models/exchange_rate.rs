use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored conversion rate for one currency pair
///
/// `amount_in_to = amount_in_from * rate`. The `(from_currency, to_currency)`
/// pair is unique; currency codes are stored uppercased.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::exchange_rates)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ExchangeRate {
    id: String,
    from_currency: String,
    to_currency: String,
    rate: f64,
    updated_at: NaiveDateTime,
}

impl ExchangeRate {
    pub fn new(from_currency: &str, to_currency: &str, rate: f64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            from_currency: from_currency.trim().to_uppercase(),
            to_currency: to_currency.trim().to_uppercase(),
            rate,
            updated_at: Utc::now().naive_utc(),
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_from_currency(&self) -> String {
        self.from_currency.clone()
    }

    pub fn get_to_currency(&self) -> String {
        self.to_currency.clone()
    }

    pub fn get_rate(&self) -> f64 {
        self.rate
    }

    pub fn get_updated_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.updated_at, Utc)
    }
}
