//! Cache key generation.

use folio_core::StorePath;
use std::collections::BTreeMap;
use std::fmt::Display;

/// Prefix of the keys used for store reads.
pub const STORE_KEY_PREFIX: &str = "store";

/// Builds a cache key from a prefix and parameters.
///
/// Parameters are sorted by name, so the same set always yields the same
/// key: `prefix_k1:v1|k2:v2`. Without parameters the key is the prefix.
///
/// # Examples
///
/// ```
/// use folio_cache::keys::key_for;
///
/// let key = key_for("courses", [("provider", "udemy"), ("category", "web")]);
/// assert_eq!(key, "courses_category:web|provider:udemy");
/// assert_eq!(key_for::<&str, &str>("courses", []), "courses");
/// ```
pub fn key_for<K, V>(prefix: &str, params: impl IntoIterator<Item = (K, V)>) -> String
where
    K: Into<String>,
    V: Display,
{
    let sorted: BTreeMap<String, String> = params
        .into_iter()
        .map(|(k, v)| (k.into(), v.to_string()))
        .collect();

    if sorted.is_empty() {
        return prefix.to_string();
    }

    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{k}:{v}"))
        .collect::<Vec<_>>()
        .join("|");
    format!("{prefix}_{joined}")
}

/// Key under which reads of `path` are cached.
pub fn store_key(path: &StorePath) -> String {
    format!("{STORE_KEY_PREFIX}_{}", path.as_str())
}

/// Recovers the store path from a key built by [`store_key`].
pub fn path_from_store_key(key: &str) -> Option<StorePath> {
    let raw = key.strip_prefix(STORE_KEY_PREFIX)?.strip_prefix('_')?;
    StorePath::parse(raw).ok()
}

/// Key identifying a live subscription's throttle state.
pub fn subscription_key(path: &StorePath) -> String {
    format!("subscription_{}", path.as_str())
}
