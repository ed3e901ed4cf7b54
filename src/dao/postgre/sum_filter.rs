//! Filter for the subscription price sum.
//!
//! A filter is a list of typed constraints joined with `AND`. Column names
//! and operators are written into the SQL text; every value goes through
//! `push_bind`. The same constraints can be evaluated against an in-memory
//! row with [`SumFilter::matches`].

use std::{cmp::Ordering, fmt::Display};

use sqlx::{query_builder::Separated, QueryBuilder};
use uuid::Uuid;

use super::DataBase;
use crate::{
    error::Error,
    model::{MonthYear, Subscription},
};

const SUM_QUERY: &str =
    "SELECT COALESCE(SUM(price), 0)::BIGINT FROM subscriptions WHERE ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    StartDate,
    EndDate,
    UserId,
    ServiceName,
}

impl Column {
    pub fn as_str(&self) -> &'static str {
        match self {
            Column::StartDate => "start_date",
            Column::EndDate => "end_date",
            Column::UserId => "user_id",
            Column::ServiceName => "service_name",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Lte,
    Gte,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Lte => "<=",
            Operator::Gte => ">=",
        }
    }

    fn holds(&self, ordering: Ordering) -> bool {
        match self {
            Operator::Eq => ordering.is_eq(),
            Operator::Lte => ordering.is_le(),
            Operator::Gte => ordering.is_ge(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Month(MonthYear),
    Uuid(Uuid),
    Text(String),
}

impl Value {
    fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Month(a), Value::Month(b)) => Some(a.cmp(b)),
            (Value::Uuid(a), Value::Uuid(b)) => Some(a.cmp(b)),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

/// `column operator value`, or `(column IS NULL OR column operator value)`
/// when `null_matches` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub column: Column,
    pub operator: Operator,
    pub value: Value,
    pub null_matches: bool,
}

impl Constraint {
    pub fn new(column: Column, operator: Operator, value: Value) -> Self {
        Constraint {
            column,
            operator,
            value,
            null_matches: false,
        }
    }

    pub fn or_null(mut self) -> Self {
        self.null_matches = true;
        self
    }

    pub fn matches(&self, subscription: &Subscription) -> bool {
        let field = match self.column {
            Column::StartDate => Some(Value::Month(subscription.start_date)),
            Column::EndDate => subscription.end_date.map(Value::Month),
            Column::UserId => Some(Value::Uuid(subscription.user_id)),
            Column::ServiceName => {
                Some(Value::Text(subscription.service_name.to_owned()))
            },
        };

        match field {
            Some(field) => field
                .compare(&self.value)
                .is_some_and(|ordering| self.operator.holds(ordering)),
            None => self.null_matches,
        }
    }

    fn push<Sep: Display>(
        &self,
        predicates: &mut Separated<'_, '_, DataBase, Sep>,
    ) {
        let column = self.column.as_str();
        let operator = self.operator.as_str();

        if self.null_matches {
            predicates.push(format!(
                "({} IS NULL OR {} {} ",
                column, column, operator
            ));
        } else {
            predicates.push(format!("{} {} ", column, operator));
        }

        match &self.value {
            Value::Month(month) => predicates.push_bind_unseparated(*month),
            Value::Uuid(uuid) => predicates.push_bind_unseparated(*uuid),
            Value::Text(text) => {
                predicates.push_bind_unseparated(text.to_owned())
            },
        };

        if self.null_matches {
            predicates.push_unseparated(")");
        }
    }
}

/// Inclusive `[start, end]` range of months.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    start: MonthYear,
    end: MonthYear,
}

impl Window {
    pub fn new(start: MonthYear, end: MonthYear) -> Result<Window, Error> {
        if start > end {
            return Err(Error::InvalidFilter(format!(
                "start {} is after end {}",
                start, end
            )));
        }
        Ok(Window { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Result<Window, Error> {
        let start = start
            .parse()
            .map_err(|e| Error::InvalidFilter(format!("start: {}", e)))?;
        let end = end
            .parse()
            .map_err(|e| Error::InvalidFilter(format!("end: {}", e)))?;
        Window::new(start, end)
    }

    pub fn start(&self) -> MonthYear {
        self.start
    }

    pub fn end(&self) -> MonthYear {
        self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SumFilter {
    window: Window,
    constraints: Vec<Constraint>,
}

impl SumFilter {
    /// Subscriptions active at any point of `window`: started no later than
    /// its end, and either open-ended or ending no earlier than its start.
    pub fn new(window: Window) -> Self {
        let constraints = vec![
            Constraint::new(
                Column::StartDate,
                Operator::Lte,
                Value::Month(window.end()),
            ),
            Constraint::new(
                Column::EndDate,
                Operator::Gte,
                Value::Month(window.start()),
            )
            .or_null(),
        ];

        SumFilter {
            window,
            constraints,
        }
    }

    /// An empty `service_name` means no service filter.
    pub fn from_params(
        start: &str,
        end: &str,
        user_id: Option<Uuid>,
        service_name: Option<String>,
    ) -> Result<Self, Error> {
        let window = Window::parse(start, end)?;
        Ok(SumFilter::new(window)
            .with_user(user_id)
            .with_service(service_name.filter(|s| !s.is_empty())))
    }

    pub fn with_user(mut self, user_id: impl Into<Option<Uuid>>) -> Self {
        if let Some(user_id) = user_id.into() {
            self.constraints.push(Constraint::new(
                Column::UserId,
                Operator::Eq,
                Value::Uuid(user_id),
            ));
        }
        self
    }

    pub fn with_service(
        mut self,
        service_name: impl Into<Option<String>>,
    ) -> Self {
        if let Some(service_name) = service_name.into() {
            self.constraints.push(Constraint::new(
                Column::ServiceName,
                Operator::Eq,
                Value::Text(service_name),
            ));
        }
        self
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn matches(&self, subscription: &Subscription) -> bool {
        self.constraints.iter().all(|c| c.matches(subscription))
    }

    pub fn to_query(&self) -> QueryBuilder<'static, DataBase> {
        let mut builder = QueryBuilder::new(SUM_QUERY);
        let mut predicates = builder.separated(" AND ");

        for constraint in &self.constraints {
            constraint.push(&mut predicates);
        }

        builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn my(value: &str) -> MonthYear {
        value.parse().unwrap()
    }

    fn sub(
        start: &str,
        end: Option<&str>,
        price: i32,
        service: &str,
    ) -> Subscription {
        Subscription {
            id: 0,
            service_name: service.to_owned(),
            price,
            user_id: Uuid::nil(),
            start_date: my(start),
            end_date: end.map(my),
        }
    }

    fn sum(filter: &SumFilter, subs: &[Subscription]) -> i64 {
        subs.iter()
            .filter(|s| filter.matches(s))
            .map(|s| i64::from(s.price))
            .sum()
    }

    fn window(start: &str, end: &str) -> SumFilter {
        SumFilter::new(Window::parse(start, end).unwrap())
    }

    #[test]
    fn test_base_query() {
        let filter = window("03-2023", "04-2023");
        assert_eq!(
            filter.to_query().sql(),
            "SELECT COALESCE(SUM(price), 0)::BIGINT FROM subscriptions \
             WHERE start_date <= $1 AND (end_date IS NULL OR end_date >= $2)"
        );
    }

    #[test]
    fn test_query_with_both_filters() {
        let filter = window("03-2023", "04-2023")
            .with_user(Uuid::new_v4())
            .with_service(String::from("Netflix"));
        assert_eq!(
            filter.to_query().sql(),
            "SELECT COALESCE(SUM(price), 0)::BIGINT FROM subscriptions \
             WHERE start_date <= $1 AND (end_date IS NULL OR end_date >= $2) \
             AND user_id = $3 AND service_name = $4"
        );
    }

    #[test]
    fn test_query_with_service_only() {
        let filter =
            window("03-2023", "04-2023").with_service(String::from("Netflix"));
        assert!(filter
            .to_query()
            .sql()
            .ends_with("(end_date IS NULL OR end_date >= $2) AND service_name = $3"));
    }

    #[test]
    fn test_absent_filters_add_nothing() {
        let filter = window("03-2023", "04-2023")
            .with_user(Option::<Uuid>::None)
            .with_service(Option::<String>::None);
        assert_eq!(filter, window("03-2023", "04-2023"));
        assert_eq!(filter.constraints().len(), 2);
    }

    #[test]
    fn test_empty_service_name_is_no_filter() {
        let subs = [sub("01-2024", None, 1640, "Netflix")];
        let filter = SumFilter::from_params(
            "01-2024",
            "01-2024",
            None,
            Some(String::new()),
        )
        .unwrap();

        assert_eq!(filter, window("01-2024", "01-2024"));
        assert_eq!(sum(&filter, &subs), 1640);
    }

    #[test]
    fn test_values_never_reach_sql_text() {
        let user_id = Uuid::new_v4();
        let filter = window("03-2023", "04-2023")
            .with_user(user_id)
            .with_service(String::from("x' OR '1'='1"));
        let builder = filter.to_query();
        let sql = builder.sql();

        assert!(!sql.contains("OR '1'='1"));
        assert!(!sql.contains(&user_id.to_string()));
        assert!(!sql.contains("2023"));
        assert!(!sql.contains(" OR service_name"));
    }

    #[test]
    fn test_malformed_window_is_invalid_filter() {
        for (start, end) in
            [("2023-03", "04-2023"), ("03-2023", ""), ("13-2023", "12-2024")]
        {
            assert!(matches!(
                SumFilter::from_params(start, end, None, None),
                Err(Error::InvalidFilter(_))
            ));
        }
    }

    #[test]
    fn test_reversed_window_is_invalid_filter() {
        assert!(matches!(
            Window::parse("05-2023", "04-2023"),
            Err(Error::InvalidFilter(_))
        ));
        assert!(Window::parse("05-2023", "05-2023").is_ok());
    }

    #[test]
    fn test_reference_scenario() {
        let subs = [
            sub("01-2023", Some("06-2023"), 100, "Netflix"),
            sub("05-2023", None, 50, "Netflix"),
            sub("01-2023", Some("12-2023"), 200, "Spotify"),
        ];

        let netflix = SumFilter::from_params(
            "03-2023",
            "04-2023",
            None,
            Some(String::from("Netflix")),
        )
        .unwrap();
        assert_eq!(sum(&netflix, &subs), 100);

        let may = window("05-2023", "05-2023");
        assert_eq!(sum(&may, &subs), 350);
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let filter = window("03-2023", "06-2023");

        assert!(filter.matches(&sub("06-2023", None, 1, "a")));
        assert!(filter.matches(&sub("01-2023", Some("03-2023"), 1, "a")));
        assert!(!filter.matches(&sub("07-2023", None, 1, "a")));
        assert!(!filter.matches(&sub("01-2023", Some("02-2023"), 1, "a")));
    }

    #[test]
    fn test_overlap_across_year_boundary() {
        let filter = window("01-2024", "02-2024");

        assert!(!filter.matches(&sub("11-2023", Some("12-2023"), 1, "a")));
        assert!(filter.matches(&sub("12-2023", Some("01-2024"), 1, "a")));
        assert!(!filter.matches(&sub("03-2024", None, 1, "a")));
    }

    #[test]
    fn test_empty_match_sums_to_zero() {
        let filter = window("01-2030", "12-2030")
            .with_service(String::from("Netflix"));
        assert_eq!(sum(&filter, &[sub("01-2023", Some("02-2023"), 9, "a")]), 0);
        assert_eq!(sum(&filter, &[]), 0);
    }
}
