use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// Native driver family behind a cursor or data source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Db2,
    Sqlsrv,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Db2 => "db2",
            Self::Sqlsrv => "sqlsrv",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "db2" | "ibm_db2" => Ok(Self::Db2),
            "sqlsrv" | "mssql" => Ok(Self::Sqlsrv),
            other => Err(Error::Decode(format!("unknown backend '{other}'"))),
        }
    }
}

/// What a cursor does with a native error raised while fetching a row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FetchErrorPolicy {
    /// Treat the error as end-of-data and keep it in
    /// [`ResultCursor::suppressed_error`](crate::ResultCursor::suppressed_error).
    Suppress,
    /// Return the error to the caller.
    #[default]
    Propagate,
}

#[cfg(test)]
mod tests {
    use super::BackendKind;

    #[test]
    fn parses_backend_aliases() {
        assert_eq!("DB2".parse::<BackendKind>().ok(), Some(BackendKind::Db2));
        assert_eq!(
            " mssql ".parse::<BackendKind>().ok(),
            Some(BackendKind::Sqlsrv)
        );
        assert!("oracle".parse::<BackendKind>().is_err());
    }

    #[test]
    fn display_matches_serde_name() {
        let json = serde_json::to_string(&BackendKind::Sqlsrv).expect("must serialize");
        assert_eq!(json, format!("\"{}\"", BackendKind::Sqlsrv));
    }
}
