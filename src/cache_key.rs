//! Cache keys for query results.

use sha2::{Digest, Sha256};

use crate::Value;

/// Deterministic key for `sql` run with `params`.
///
/// Whitespace runs outside quoted literals and identifiers are collapsed
/// first, so formatting-only differences map to the same key. Parameters
/// are hashed with a type tag each, so `NULL`, `0`, `0.0` and `'0'` differ.
pub fn cache_key(sql: &str, params: &[Value]) -> String {
    CacheKeyBuilder::new().build(sql, params)
}

/// Builds cache keys, optionally under a namespace prefix.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheKeyBuilder {
    namespace: Option<String>,
}

impl CacheKeyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefixes built keys with `namespace:`.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn build(&self, sql: &str, params: &[Value]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(normalize_sql(sql).as_bytes());
        hasher.update([0u8]);
        hasher.update((params.len() as u64).to_be_bytes());
        for param in params {
            hash_value(&mut hasher, param);
        }
        let digest = hex::encode(hasher.finalize());

        match &self.namespace {
            Some(namespace) => format!("{namespace}:{digest}"),
            None => digest,
        }
    }
}

fn hash_value(hasher: &mut Sha256, value: &Value) {
    match value {
        Value::Null => hasher.update([0u8]),
        Value::Integer(value) => {
            hasher.update([1u8]);
            hasher.update(value.to_be_bytes());
        }
        Value::Float(value) => {
            hasher.update([2u8]);
            hasher.update(value.to_bits().to_be_bytes());
        }
        Value::Text(value) => {
            hasher.update([3u8]);
            hasher.update((value.len() as u64).to_be_bytes());
            hasher.update(value.as_bytes());
        }
        Value::Binary(bytes) => {
            hasher.update([4u8]);
            hasher.update((bytes.len() as u64).to_be_bytes());
            hasher.update(bytes);
        }
    }
}

/// Collapses whitespace runs to one space and trims the ends. Text inside
/// `'...'` and `"..."` is kept byte for byte; a doubled quote stays inside
/// the literal.
fn normalize_sql(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut quote: Option<char> = None;
    let mut pending_space = false;

    for c in sql.chars() {
        match quote {
            Some(open) => {
                out.push(c);
                if c == open {
                    quote = None;
                }
            }
            None if c.is_whitespace() => pending_space = !out.is_empty(),
            None => {
                if pending_space {
                    out.push(' ');
                    pending_space = false;
                }
                if c == '\'' || c == '"' {
                    quote = Some(c);
                }
                out.push(c);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{cache_key, normalize_sql, CacheKeyBuilder};
    use crate::Value;

    #[test]
    fn whitespace_differences_share_a_key() {
        let a = cache_key("SELECT *\n  FROM users WHERE id = ?", &[Value::integer(1)]);
        let b = cache_key(" SELECT * FROM users\tWHERE id = ? ", &[Value::integer(1)]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn params_change_the_key() {
        let sql = "SELECT * FROM users WHERE id = ?";
        assert_ne!(
            cache_key(sql, &[Value::integer(1)]),
            cache_key(sql, &[Value::text("1")])
        );
        assert_ne!(cache_key(sql, &[]), cache_key(sql, &[Value::Null]));
    }

    #[test]
    fn whitespace_inside_literals_is_kept() {
        assert_ne!(
            cache_key("SELECT * FROM users WHERE name = 'a  b'", &[]),
            cache_key("SELECT * FROM users WHERE name = 'a b'", &[])
        );
        assert_ne!(
            cache_key(r#"SELECT "first  name" FROM users"#, &[]),
            cache_key(r#"SELECT "first name" FROM users"#, &[])
        );
    }

    #[test]
    fn nan_and_null_params_differ() {
        assert_ne!(
            cache_key("SELECT ?", &[Value::float(f64::NAN)]),
            cache_key("SELECT ?", &[Value::Null])
        );
        assert_ne!(
            cache_key("SELECT ?", &[Value::integer(0)]),
            cache_key("SELECT ?", &[Value::float(0.0)])
        );
        assert_ne!(
            cache_key("SELECT ?, ?", &[Value::text("ab"), Value::text("")]),
            cache_key("SELECT ?, ?", &[Value::text("a"), Value::text("b")])
        );
    }

    #[test]
    fn namespace_prefixes_digest() {
        let key = CacheKeyBuilder::new().namespace("orders").build("SELECT 1", &[]);
        assert_eq!(key, format!("orders:{}", cache_key("SELECT 1", &[])));
    }

    #[test]
    fn normalize_collapses_runs() {
        assert_eq!(normalize_sql("  a \n\n b\t c "), "a b c");
        assert_eq!(
            normalize_sql("x =  'it''s  here'   AND y"),
            "x = 'it''s  here' AND y"
        );
    }
}
