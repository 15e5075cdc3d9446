/// Read-through caching around a fallible async computation.
///
/// Returns the cached value when present. Otherwise awaits `$block`, queues
/// the result for a background write with the given TTL, and returns it.
/// A cache read error is logged and treated as a miss, so the cache can
/// never fail the computation it wraps.
///
/// # Arguments
/// * `$cache`: a [`Cache`](crate::db::Cache).
/// * `$key`: the [`CacheKey`](crate::db::CacheKey) to read and write.
/// * `$ttl`: time-to-live of the stored value, in seconds.
/// * `$block`: a future resolving to `Result<T, E>`.
///
/// # Example
/// ```rust,ignore
/// let url = cached!(self.cache, CacheKey::Poster(title.to_string()), TTL, self.fetch(title));
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        match $cache.get_from_cache(&$key).await {
            Ok(Some(cached)) => Ok(cached),
            result => {
                if let Err(e) = result {
                    tracing::warn!(error = %e, key = %$key, "Cache read failed, treating as miss");
                }
                let value = $block.await?;
                $cache.set_in_background(&$key, &value, $ttl);
                Ok(value)
            }
        }
    }};
}
