mod postgre;

pub use postgre::{
    Column, Constraint, DataBase, Operator, PoolOption, PoolType, SumFilter,
    Value, Window,
};
