//! DB2 backend.

use crate::{
    cursor::Backend,
    native::{Db2Connection, Db2Statement, NativeError, RowCount},
    BackendKind, Error, FetchErrorPolicy, Result, ResultCursor, Row,
};

/// [`Backend`] over an executed DB2 result handle.
///
/// Cursors over DB2 results start with [`FetchErrorPolicy::Suppress`]: a
/// failed fetch ends iteration and is kept in
/// [`ResultCursor::suppressed_error`].
#[derive(Debug)]
pub struct Db2Result<S> {
    stmt: S,
}

impl<S: Db2Statement> Db2Result<S> {
    pub fn new(stmt: S) -> Self {
        Self { stmt }
    }
}

impl<S: Db2Statement> Backend for Db2Result<S> {
    fn kind(&self) -> BackendKind {
        BackendKind::Db2
    }

    fn default_error_policy(&self) -> FetchErrorPolicy {
        FetchErrorPolicy::Suppress
    }

    fn row_count(&mut self) -> RowCount {
        self.stmt.num_rows()
    }

    fn field_count(&mut self) -> usize {
        self.stmt.num_fields()
    }

    fn fetch_assoc(&mut self) -> std::result::Result<Option<Row>, NativeError> {
        self.stmt.fetch_assoc()
    }

    fn release(&mut self) {
        self.stmt.free_result();
    }
}

/// Executes `sql` on a DB2 connection and wraps the result in a cursor.
pub fn open_db2_cursor<C: Db2Connection>(
    conn: &mut C,
    sql: &str,
) -> Result<ResultCursor<Db2Result<C::Statement>>> {
    let stmt = conn
        .exec(sql)
        .map_err(|err| Error::native(BackendKind::Db2, err))?;
    Ok(ResultCursor::new(Db2Result::new(stmt)))
}
