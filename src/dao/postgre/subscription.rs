use super::SumFilter;
use crate::{
    error::Error,
    model::{Subscription, Table},
    types::SubscriptionPayload,
};

impl Table<Subscription> {
    pub async fn insert(
        &self,
        subscription: &SubscriptionPayload,
    ) -> Result<i64, Error> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO subscriptions (service_name, price, user_id, start_date, end_date)
            VALUES($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&subscription.service_name)
        .bind(subscription.price)
        .bind(subscription.user_id)
        .bind(subscription.start_date)
        .bind(subscription.end_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    pub async fn get_all(&self) -> Result<Vec<Subscription>, Error> {
        let data = sqlx::query_as(
            r#"
            SELECT
                id, service_name, price, user_id, start_date, end_date
            FROM subscriptions
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(data)
    }

    pub async fn get_one(
        &self,
        id: i64,
    ) -> Result<Option<Subscription>, Error> {
        let data = sqlx::query_as(
            r#"
            SELECT
                id, service_name, price, user_id, start_date, end_date
            FROM subscriptions
            WHERE
                id = $1
            "#,
        )
        .bind(id)
        .persistent(true)
        .fetch_optional(&self.pool)
        .await?;

        Ok(data)
    }

    pub async fn update(
        &self,
        id: i64,
        subscription: &SubscriptionPayload,
    ) -> Result<(), Error> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions
            SET service_name = $1, price = $2, user_id = $3, start_date = $4, end_date = $5
            WHERE id = $6
            "#,
        )
        .bind(&subscription.service_name)
        .bind(subscription.price)
        .bind(subscription.user_id)
        .bind(subscription.start_date)
        .bind(subscription.end_date)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(id));
        }

        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<(), Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM subscriptions WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(id));
        }

        Ok(())
    }

    /// Total `price` of the subscriptions selected by `filter`, in a single
    /// round-trip. An empty selection sums to `0`.
    pub async fn get_sum(&self, filter: &SumFilter) -> Result<i64, Error> {
        let mut query = filter.to_query();
        let (sum,): (i64,) =
            query.build_query_as().fetch_one(&self.pool).await?;

        Ok(sum)
    }
}
