use std::marker::PhantomData;

use crate::dao::PoolType;

/// Handle to one table. Queries are inherent impls on `Table<Row>` under
/// `dao::postgre`, one module per row type.
#[derive(Debug)]
pub struct Table<T> {
    pub pool: PoolType,
    row: PhantomData<fn() -> T>,
}

impl<T> Table<T> {
    pub fn new(pool: PoolType) -> Self {
        Table {
            pool,
            row: PhantomData,
        }
    }
}
