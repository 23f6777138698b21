use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use crate::{BackendKind, Error, Result};

/// Connection parameters for one named data source.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Driver family used to reach the source.
    pub handle: BackendKind,
    /// Host name or address.
    pub server: String,
    /// TCP port, driver default when absent.
    #[serde(default)]
    pub port: Option<u16>,
    /// Database (DB2 catalog entry or SQL Server database name).
    pub source: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub pass: String,
    /// Whether the driver should reuse a persistent connection.
    #[serde(default)]
    pub persistent: bool,
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("handle", &self.handle)
            .field("server", &self.server)
            .field("port", &self.port)
            .field("source", &self.source)
            .field("user", &self.user)
            .field("pass", &"<redacted>")
            .field("persistent", &self.persistent)
            .finish()
    }
}

impl ConnectionConfig {
    pub fn new(handle: BackendKind, server: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            handle,
            server: server.into(),
            port: None,
            source: source.into(),
            user: String::new(),
            pass: String::new(),
            persistent: false,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_credentials(mut self, user: impl Into<String>, pass: impl Into<String>) -> Self {
        self.user = user.into();
        self.pass = pass.into();
        self
    }

    pub fn persistent(mut self, persistent: bool) -> Self {
        self.persistent = persistent;
        self
    }

    /// Reads a data source from environment variables.
    ///
    /// Reads, for `prefix = "ORDERS_DB"`:
    /// - `ORDERS_DB_HANDLE`, `ORDERS_DB_SERVER`, `ORDERS_DB_SOURCE` (required)
    /// - `ORDERS_DB_PORT`, `ORDERS_DB_USER`, `ORDERS_DB_PASS`,
    ///   `ORDERS_DB_PERSISTENT` (optional)
    ///
    /// Required variables that are missing or empty are an error.
    pub fn from_env(prefix: &str) -> Result<Self> {
        Self::from_lookup(prefix, |key| std::env::var(key).ok())
    }

    fn from_lookup(prefix: &str, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |suffix: &str| lookup(&format!("{prefix}_{suffix}"));
        let required = |suffix: &str| -> Result<String> {
            let key = format!("{prefix}_{suffix}");
            match lookup(&key) {
                Some(value) if !value.trim().is_empty() => Ok(value),
                Some(_) => Err(Error::Decode(format!("{key} is set but empty"))),
                None => Err(Error::Decode(format!("missing {key} environment variable"))),
            }
        };

        let handle = required("HANDLE")?.parse::<BackendKind>()?;
        let mut config = Self::new(handle, required("SERVER")?, required("SOURCE")?);

        if let Some(port) = var("PORT").filter(|value| !value.trim().is_empty()) {
            let port = port
                .trim()
                .parse::<u16>()
                .map_err(|err| Error::Decode(format!("invalid {prefix}_PORT '{port}': {err}")))?;
            config.port = Some(port);
        }
        config.user = var("USER").unwrap_or_default();
        config.pass = var("PASS").unwrap_or_default();
        config.persistent = var("PERSISTENT")
            .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        Ok(config)
    }
}

/// Named data sources for one request or session.
///
/// Built once and passed explicitly to whatever opens connections.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSourceRegistry {
    #[serde(default)]
    default: Option<String>,
    #[serde(default)]
    sources: BTreeMap<String, ConnectionConfig>,
}

impl DataSourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `{"default": "main", "sources": {"main": {...}}}`.
    ///
    /// A `default` that names no source is rejected.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let registry: Self = serde_json::from_str(json)
            .map_err(|err| Error::Decode(format!("invalid data source JSON: {err}")))?;
        if let Some(name) = &registry.default {
            if !registry.sources.contains_key(name) {
                return Err(Error::UnknownDataSource { name: name.clone() });
            }
        }
        Ok(registry)
    }

    /// Inserts or replaces a data source. The first registered source
    /// becomes the default if none is set.
    pub fn register(&mut self, name: impl Into<String>, config: ConnectionConfig) {
        let name = name.into();
        if self.default.is_none() {
            self.default = Some(name.clone());
        }
        self.sources.insert(name, config);
    }

    pub fn set_default(&mut self, name: &str) -> Result<()> {
        if !self.sources.contains_key(name) {
            return Err(Error::UnknownDataSource {
                name: name.to_owned(),
            });
        }
        self.default = Some(name.to_owned());
        Ok(())
    }

    pub fn default_name(&self) -> Option<&str> {
        self.default.as_deref()
    }

    pub fn get(&self, name: &str) -> Result<&ConnectionConfig> {
        self.sources
            .get(name)
            .ok_or_else(|| Error::UnknownDataSource {
                name: name.to_owned(),
            })
    }

    pub fn get_default(&self) -> Result<&ConnectionConfig> {
        let name = self.default.as_deref().ok_or(Error::NoDefaultDataSource)?;
        self.get(name)
    }

    /// Named lookup, or the default source when `name` is `None`.
    pub fn resolve(&self, name: Option<&str>) -> Result<&ConnectionConfig> {
        match name {
            Some(name) => self.get(name),
            None => self.get_default(),
        }
    }

    /// Removes a source. Clears the default if it pointed at `name`.
    pub fn remove(&mut self, name: &str) -> Option<ConnectionConfig> {
        let removed = self.sources.remove(name)?;
        if self.default.as_deref() == Some(name) {
            self.default = None;
        }
        Some(removed)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
