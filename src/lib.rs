//! `result-cursor` presents one result-set cursor over native database
//! driver bindings (DB2 and SQL Server).
//!
//! The crate wraps an executed native result with uniform methods:
//! - [`ResultCursor::compute_row_count`]
//! - [`ResultCursor::compute_field_count`]
//! - [`ResultCursor::fetch_row`]
//! - [`ResultCursor::fetch_all_rows`]
//!
//! Vendor bindings plug in through the traits in [`native`]. Named
//! connection parameters live in a [`DataSourceRegistry`].

mod cache_key;
mod config;
mod cursor;
mod db2;
mod error;
mod row;
mod sqlsrv;
mod types;
mod value;

pub mod native;

pub use cache_key::{cache_key, CacheKeyBuilder};
pub use config::{ConnectionConfig, DataSourceRegistry};
pub use cursor::{Backend, ResultCursor};
pub use db2::{open_db2_cursor, Db2Result};
pub use error::Error;
pub use native::RowCount;
pub use row::{remove_fields, Row};
pub use sqlsrv::{open_sqlsrv_cursor, SqlsrvResult};
pub use types::{BackendKind, FetchErrorPolicy};
pub use value::Value;

pub type Result<T> = std::result::Result<T, Error>;
