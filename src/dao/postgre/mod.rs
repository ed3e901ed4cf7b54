pub use self::{
    sum_filter::{Column, Constraint, Operator, SumFilter, Value, Window},
    types::{DataBase, PoolOption, PoolType},
};

mod subscription;
mod sum_filter;
mod types;
