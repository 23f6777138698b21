//! SQL Server (SQLSRV) backend.

use crate::{
    cursor::Backend,
    native::{FetchType, NativeError, RowCount, Scroll, SqlsrvConnection, SqlsrvStatement},
    BackendKind, Error, Result, ResultCursor, Row,
};

/// [`Backend`] over an executed SQLSRV statement handle.
///
/// Rows are always fetched associatively, advancing one row at a time.
/// Forward-only statements report [`RowCount::Unavailable`].
#[derive(Debug)]
pub struct SqlsrvResult<S> {
    stmt: S,
}

impl<S: SqlsrvStatement> SqlsrvResult<S> {
    pub fn new(stmt: S) -> Self {
        Self { stmt }
    }
}

impl<S: SqlsrvStatement> Backend for SqlsrvResult<S> {
    fn kind(&self) -> BackendKind {
        BackendKind::Sqlsrv
    }

    fn row_count(&mut self) -> RowCount {
        self.stmt.num_rows()
    }

    fn field_count(&mut self) -> usize {
        self.stmt.num_fields()
    }

    fn fetch_assoc(&mut self) -> std::result::Result<Option<Row>, NativeError> {
        self.stmt.fetch_array(FetchType::Assoc, Scroll::Next)
    }

    fn release(&mut self) {
        self.stmt.free_stmt();
    }
}

/// Executes `sql` on a SQLSRV connection and wraps the statement in a
/// cursor.
pub fn open_sqlsrv_cursor<C: SqlsrvConnection>(
    conn: &mut C,
    sql: &str,
) -> Result<ResultCursor<SqlsrvResult<C::Statement>>> {
    let stmt = conn
        .query(sql)
        .map_err(|err| Error::native(BackendKind::Sqlsrv, err))?;
    Ok(ResultCursor::new(SqlsrvResult::new(stmt)))
}
