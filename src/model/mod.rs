//! Database models module

mod month_year;
mod subscription;
mod table;

pub use month_year::{MonthYear, ParseMonthYearError};
pub use subscription::Subscription;
pub use table::Table;
