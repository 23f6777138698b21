//! Result cursor over a native query result.
//!
//! A [`ResultCursor`] owns one executed result for its whole life and
//! normalizes counting and fetching across backends:
//! - [`ResultCursor::compute_row_count`]
//! - [`ResultCursor::compute_field_count`]
//! - [`ResultCursor::fetch_row`]
//! - [`ResultCursor::fetch_all_rows`]
//!
//! Row-at-a-time and bulk fetching are mutually exclusive: once
//! [`ResultCursor::fetch_all_rows`] ran, [`ResultCursor::fetch_row`] keeps
//! returning `Ok(None)` without touching the native result.

use crate::{
    native::{NativeError, RowCount},
    BackendKind, Error, FetchErrorPolicy, Result, Row,
};

/// Per-driver primitives a [`ResultCursor`] delegates to.
///
/// Implementations own the native result handle.
pub trait Backend {
    fn kind(&self) -> BackendKind;

    /// Error policy a cursor starts with for this backend.
    fn default_error_policy(&self) -> FetchErrorPolicy {
        FetchErrorPolicy::Propagate
    }

    fn row_count(&mut self) -> RowCount;

    fn field_count(&mut self) -> usize;

    /// Next row as column name → value, `Ok(None)` when exhausted.
    fn fetch_assoc(&mut self) -> std::result::Result<Option<Row>, NativeError>;

    /// Releases the native handle. Called exactly once by the cursor.
    fn release(&mut self);
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn kind(&self) -> BackendKind {
        (**self).kind()
    }

    fn default_error_policy(&self) -> FetchErrorPolicy {
        (**self).default_error_policy()
    }

    fn row_count(&mut self) -> RowCount {
        (**self).row_count()
    }

    fn field_count(&mut self) -> usize {
        (**self).field_count()
    }

    fn fetch_assoc(&mut self) -> std::result::Result<Option<Row>, NativeError> {
        (**self).fetch_assoc()
    }

    fn release(&mut self) {
        (**self).release()
    }
}

/// Uniform cursor over one native result.
#[derive(Debug)]
pub struct ResultCursor<B: Backend> {
    resource: Option<B>,
    kind: BackendKind,
    num_rows: Option<RowCount>,
    num_fields: Option<usize>,
    fetch_row_count: u64,
    fetch_all_invoked: bool,
    error_policy: FetchErrorPolicy,
    suppressed_error: Option<NativeError>,
}

impl<B: Backend> ResultCursor<B> {
    /// Wraps an executed native result.
    pub fn new(resource: B) -> Self {
        let kind = resource.kind();
        let error_policy = resource.default_error_policy();

        #[cfg(feature = "tracing")]
        tracing::debug!(backend = %kind, ?error_policy, "opened result cursor");

        Self {
            resource: Some(resource),
            kind,
            num_rows: None,
            num_fields: None,
            fetch_row_count: 0,
            fetch_all_invoked: false,
            error_policy,
            suppressed_error: None,
        }
    }

    /// Overrides the backend's default fetch error policy.
    pub fn with_error_policy(mut self, policy: FetchErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.kind
    }

    pub fn error_policy(&self) -> FetchErrorPolicy {
        self.error_policy
    }

    /// Rows returned so far by [`Self::fetch_row`].
    pub fn fetch_row_count(&self) -> u64 {
        self.fetch_row_count
    }

    pub fn is_fetch_all_invoked(&self) -> bool {
        self.fetch_all_invoked
    }

    pub fn is_closed(&self) -> bool {
        self.resource.is_none()
    }

    /// Last native fetch error turned into end-of-data by
    /// [`FetchErrorPolicy::Suppress`].
    pub fn suppressed_error(&self) -> Option<&NativeError> {
        self.suppressed_error.as_ref()
    }

    fn resource(&mut self) -> Result<&mut B> {
        self.resource.as_mut().ok_or(Error::Closed)
    }

    /// Row count reported by the driver, computed once and cached.
    ///
    /// Some drivers cannot count rows for forward-only results; that is
    /// reported as [`RowCount::Unavailable`], not as an error.
    pub fn compute_row_count(&mut self) -> Result<RowCount> {
        if self.is_closed() {
            return Err(Error::Closed);
        }
        if let Some(count) = self.num_rows {
            return Ok(count);
        }
        let count = self.resource()?.row_count();

        #[cfg(feature = "tracing")]
        tracing::debug!(backend = %self.kind, ?count, "computed row count");

        self.num_rows = Some(count);
        Ok(count)
    }

    /// Column count reported by the driver, computed once and cached.
    pub fn compute_field_count(&mut self) -> Result<usize> {
        if self.is_closed() {
            return Err(Error::Closed);
        }
        if let Some(count) = self.num_fields {
            return Ok(count);
        }
        let count = self.resource()?.field_count();

        #[cfg(feature = "tracing")]
        tracing::debug!(backend = %self.kind, count, "computed field count");

        self.num_fields = Some(count);
        Ok(count)
    }

    /// Fetches the next row.
    ///
    /// Returns `Ok(None)` at end-of-data, after [`Self::fetch_all_rows`],
    /// and for results without columns. End-of-data reached through a
    /// suppressed native error is final: no further native fetch is made.
    pub fn fetch_row(&mut self) -> Result<Option<Row>> {
        if self.fetch_all_invoked {
            return Ok(None);
        }
        if self.compute_field_count()? == 0 || self.suppressed_error.is_some() {
            return Ok(None);
        }
        let fetched = self.resource()?.fetch_assoc();
        match self.absorb(fetched)? {
            Some(row) => {
                self.fetch_row_count += 1;
                Ok(Some(row))
            }
            None => Ok(None),
        }
    }

    /// Drains every remaining row.
    ///
    /// Permanently disables [`Self::fetch_row`] on this cursor.
    pub fn fetch_all_rows(&mut self) -> Result<Vec<Row>> {
        if self.is_closed() {
            return Err(Error::Closed);
        }
        self.fetch_all_invoked = true;
        if self.compute_field_count()? == 0 || self.suppressed_error.is_some() {
            return Ok(Vec::new());
        }

        let mut rows = Vec::new();
        loop {
            let fetched = self.resource()?.fetch_assoc();
            match self.absorb(fetched)? {
                Some(row) => rows.push(row),
                None => break,
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(backend = %self.kind, rows = rows.len(), "drained result cursor");

        Ok(rows)
    }

    fn absorb(
        &mut self,
        fetched: std::result::Result<Option<Row>, NativeError>,
    ) -> Result<Option<Row>> {
        match fetched {
            Ok(row) => Ok(row),
            Err(err) => match self.error_policy {
                FetchErrorPolicy::Propagate => Err(Error::native(self.kind, err)),
                FetchErrorPolicy::Suppress => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        backend = %self.kind,
                        error = %err,
                        "native fetch error treated as end of data"
                    );

                    self.suppressed_error = Some(err);
                    Ok(None)
                }
            },
        }
    }

    /// Releases the native result. Later calls are no-ops.
    pub fn close(&mut self) {
        if let Some(mut resource) = self.resource.take() {
            resource.release();

            #[cfg(feature = "tracing")]
            tracing::debug!(
                backend = %self.kind,
                fetched = self.fetch_row_count,
                "released result cursor"
            );
        }
    }
}

impl<B: Backend> Drop for ResultCursor<B> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<B: Backend> Iterator for ResultCursor<B> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        self.fetch_row().transpose()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::{Backend, ResultCursor};
    use crate::{
        native::{NativeError, RowCount},
        BackendKind, Error, FetchErrorPolicy, Row, Value,
    };

    #[derive(Debug, Default)]
    struct Scripted {
        fields: usize,
        rows: VecDeque<Result<Option<Row>, NativeError>>,
        fetch_calls: usize,
        count_calls: usize,
        released: usize,
    }

    impl Backend for Scripted {
        fn kind(&self) -> BackendKind {
            BackendKind::Db2
        }

        fn row_count(&mut self) -> RowCount {
            self.count_calls += 1;
            RowCount::Known(self.rows.len() as u64)
        }

        fn field_count(&mut self) -> usize {
            self.count_calls += 1;
            self.fields
        }

        fn fetch_assoc(&mut self) -> Result<Option<Row>, NativeError> {
            self.fetch_calls += 1;
            self.rows.pop_front().unwrap_or(Ok(None))
        }

        fn release(&mut self) {
            self.released += 1;
        }
    }

    fn row(id: i64) -> Result<Option<Row>, NativeError> {
        Ok(Some(Row::from_pairs([("ID", Value::integer(id))])))
    }

    #[test]
    fn counts_are_computed_once() {
        let mut cursor = ResultCursor::new(Scripted {
            fields: 1,
            rows: VecDeque::from([row(1), row(2)]),
            ..Scripted::default()
        });
        assert_eq!(cursor.compute_row_count().ok(), Some(RowCount::Known(2)));
        assert_eq!(cursor.compute_row_count().ok(), Some(RowCount::Known(2)));
        assert_eq!(cursor.compute_field_count().ok(), Some(1));
        assert_eq!(cursor.compute_field_count().ok(), Some(1));
        assert_eq!(cursor.resource.as_ref().map(|r| r.count_calls), Some(2));
    }

    #[test]
    fn propagate_policy_returns_native_error() {
        let mut cursor = ResultCursor::new(Scripted {
            fields: 1,
            rows: VecDeque::from([Err(NativeError::new("connection reset"))]),
            ..Scripted::default()
        });
        let err = cursor.fetch_row().expect_err("must fail");
        assert!(matches!(err, Error::Native { backend: BackendKind::Db2, .. }));
        assert_eq!(cursor.fetch_row_count(), 0);
    }

    #[test]
    fn suppress_policy_records_error() {
        let mut cursor = ResultCursor::new(Scripted {
            fields: 1,
            rows: VecDeque::from([row(1), Err(NativeError::new("bad encoding"))]),
            ..Scripted::default()
        })
        .with_error_policy(FetchErrorPolicy::Suppress);

        assert!(cursor.fetch_row().expect("first row").is_some());
        assert!(cursor.fetch_row().expect("suppressed").is_none());
        assert_eq!(
            cursor.suppressed_error().map(|e| e.message.as_str()),
            Some("bad encoding")
        );
    }

    #[test]
    fn close_releases_once_and_blocks_counts() {
        let mut cursor = ResultCursor::new(Scripted::default());
        cursor.close();
        cursor.close();
        assert!(cursor.is_closed());
        assert!(matches!(cursor.compute_field_count(), Err(Error::Closed)));
    }

    #[test]
    fn closed_cursor_ignores_cached_counts() {
        let mut cursor = ResultCursor::new(Scripted::default());
        assert_eq!(cursor.compute_row_count().ok(), Some(RowCount::Known(0)));
        assert_eq!(cursor.compute_field_count().ok(), Some(0));
        cursor.close();

        assert!(matches!(cursor.compute_row_count(), Err(Error::Closed)));
        assert!(matches!(cursor.compute_field_count(), Err(Error::Closed)));
        assert!(matches!(cursor.fetch_row(), Err(Error::Closed)));
        assert!(matches!(cursor.fetch_all_rows(), Err(Error::Closed)));
        assert!(!cursor.is_fetch_all_invoked());
    }

    #[test]
    fn suppressed_error_ends_iteration_for_good() {
        let mut cursor = ResultCursor::new(Scripted {
            fields: 1,
            rows: VecDeque::from([Err(NativeError::new("bad encoding")), row(2)]),
            ..Scripted::default()
        })
        .with_error_policy(FetchErrorPolicy::Suppress);

        assert!(cursor.fetch_row().expect("suppressed").is_none());
        assert!(cursor.fetch_row().expect("still ended").is_none());
        assert!(cursor.fetch_all_rows().expect("still ended").is_empty());
        assert_eq!(cursor.resource.as_ref().map(|r| r.fetch_calls), Some(1));
        assert_eq!(cursor.fetch_row_count(), 0);
    }

    #[test]
    fn iterator_yields_rows_in_order() {
        let cursor = ResultCursor::new(Scripted {
            fields: 1,
            rows: VecDeque::from([row(1), row(2), row(3)]),
            ..Scripted::default()
        });
        let ids: Vec<i64> = cursor
            .map(|row| row.expect("row").get_i64("id").expect("id"))
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
