//! The mapped diagnostic context.
//!
//! An MDC is a per-thread map from string keys to string values. Where
//! the [NDC](crate::ndc) is a stack, the MDC is keyed: a server can put
//! the client address under `"client"` once and every layout that names
//! the key picks it up, regardless of what else is in flight.
//!
//! Storage is backed by the `log-mdc` crate. The map springs into
//! existence on the first `put` in a thread and is torn down with the
//! thread.

/// Puts a key-value pair into the calling thread's context.
pub fn put<K, V>(key: K, value: V)
where
    K: Into<String>,
    V: Into<String>,
{
    log_mdc::insert(key, value);
}

/// Returns the value for `key` in the calling thread's context.
pub fn get(key: &str) -> Option<String> {
    log_mdc::get(key, |value| value.map(str::to_owned))
}

/// Removes `key` from the calling thread's context, returning its value.
pub fn remove(key: &str) -> Option<String> {
    log_mdc::remove(key)
}

/// Removes all keys from the calling thread's context.
pub fn clear() {
    log_mdc::clear();
}

/// Returns a copy of the calling thread's context.
///
/// Key order is unspecified.
pub fn snapshot() -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    log_mdc::iter(|key, value| pairs.push((key.to_owned(), value.to_owned())));
    pairs
}
