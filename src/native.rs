//! Native driver primitive interface.
//!
//! Vendor bindings implement these traits; the crate never calls a vendor
//! library directly. Each statement trait mirrors the handful of functions
//! the matching driver exposes on an executed result handle.

use std::fmt;

use crate::Row;

/// Error reported by a native driver call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NativeError {
    /// Driver SQLSTATE or vendor code, when available.
    pub code: Option<String>,
    /// Driver message text.
    pub message: String,
}

impl NativeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }
}

impl fmt::Display for NativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "[{code}] {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for NativeError {}

/// Row count as reported by a native driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowCount {
    Known(u64),
    /// The driver cannot count rows for this result (e.g. forward-only).
    Unavailable,
}

impl RowCount {
    /// Count, or zero when the driver could not tell.
    pub fn unwrap_or_zero(self) -> u64 {
        match self {
            Self::Known(count) => count,
            Self::Unavailable => 0,
        }
    }

    pub fn known(self) -> Option<u64> {
        match self {
            Self::Known(count) => Some(count),
            Self::Unavailable => None,
        }
    }
}

/// Executed DB2 result handle (`db2_num_rows`, `db2_num_fields`,
/// `db2_fetch_assoc`, `db2_free_result`).
pub trait Db2Statement {
    fn num_rows(&mut self) -> RowCount;

    fn num_fields(&mut self) -> usize;

    /// Next row as column name → value, `Ok(None)` when exhausted.
    fn fetch_assoc(&mut self) -> Result<Option<Row>, NativeError>;

    fn free_result(&mut self);
}

/// DB2 connection able to execute a query into a result handle.
pub trait Db2Connection {
    type Statement: Db2Statement;

    fn exec(&mut self, sql: &str) -> Result<Self::Statement, NativeError>;
}

/// Fetch shape requested from `sqlsrv_fetch_array`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchType {
    Assoc,
    Numeric,
    Both,
}

/// Row to move to on a scrollable SQLSRV cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scroll {
    Next,
    Prior,
    First,
    Last,
    Absolute(i64),
    Relative(i64),
}

/// Executed SQLSRV statement handle (`sqlsrv_num_rows`,
/// `sqlsrv_num_fields`, `sqlsrv_fetch_array`, `sqlsrv_free_stmt`).
pub trait SqlsrvStatement {
    fn num_rows(&mut self) -> RowCount;

    fn num_fields(&mut self) -> usize;

    fn fetch_array(
        &mut self,
        fetch_type: FetchType,
        scroll: Scroll,
    ) -> Result<Option<Row>, NativeError>;

    fn free_stmt(&mut self);
}

/// SQLSRV connection able to execute a query into a statement handle.
pub trait SqlsrvConnection {
    type Statement: SqlsrvStatement;

    fn query(&mut self, sql: &str) -> Result<Self::Statement, NativeError>;
}

#[cfg(test)]
mod tests {
    use super::{NativeError, RowCount};

    #[test]
    fn native_error_display_includes_code() {
        assert_eq!(
            NativeError::with_code("22018", "bad encoding").to_string(),
            "[22018] bad encoding"
        );
        assert_eq!(NativeError::new("gone").to_string(), "gone");
    }

    #[test]
    fn unavailable_count_reads_as_zero() {
        assert_eq!(RowCount::Unavailable.unwrap_or_zero(), 0);
        assert_eq!(RowCount::Known(4).unwrap_or_zero(), 4);
        assert_eq!(RowCount::Unavailable.known(), None);
    }
}
