//! Interceptor metrics.
//!
//! Enable the `metrics` feature to record these; otherwise every function
//! here is a no-op. All counters carry a `function` label.
//!
//! - `memobox_hit_total` - calls answered from the cache
//! - `memobox_miss_total` - eligible calls that had to execute
//! - `memobox_store_total` - return values written to the cache
//! - `memobox_skip_total` - eligible calls whose arguments could not be keyed
//! - `memobox_breaker_trip_total` - functions disabled after a failure
//! - `memobox_backend_errors_total` - store failures swallowed by the interceptor

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
lazy_static! {
    /// Track number of cache hits.
    pub static ref HIT_COUNTER: &'static str = {
        metrics::describe_counter!("memobox_hit_total", "Total number of memoized calls served from cache.");
        "memobox_hit_total"
    };
    /// Track number of cache misses.
    pub static ref MISS_COUNTER: &'static str = {
        metrics::describe_counter!("memobox_miss_total", "Total number of memoized calls that executed.");
        "memobox_miss_total"
    };
    /// Track number of stored results.
    pub static ref STORE_COUNTER: &'static str = {
        metrics::describe_counter!("memobox_store_total", "Total number of results written to cache.");
        "memobox_store_total"
    };
    /// Track number of calls with unkeyable arguments.
    pub static ref SKIP_COUNTER: &'static str = {
        metrics::describe_counter!(
            "memobox_skip_total",
            "Total number of eligible calls skipped because arguments could not be serialized."
        );
        "memobox_skip_total"
    };
    /// Track number of breaker trips.
    pub static ref BREAKER_TRIP_COUNTER: &'static str = {
        metrics::describe_counter!(
            "memobox_breaker_trip_total",
            "Total number of functions disabled for the rest of an execution context."
        );
        "memobox_breaker_trip_total"
    };
    /// Track number of swallowed store failures.
    pub static ref BACKEND_ERROR_COUNTER: &'static str = {
        metrics::describe_counter!(
            "memobox_backend_errors_total",
            "Total number of cache store failures handled by falling back to execution."
        );
        "memobox_backend_errors_total"
    };
}

macro_rules! counter_fn {
    ($(#[$doc:meta])* $name:ident, $metric:ident) => {
        $(#[$doc])*
        #[cfg(feature = "metrics")]
        #[inline]
        pub fn $name(function: &str) {
            metrics::counter!(*$metric, "function" => function.to_string()).increment(1);
        }

        $(#[$doc])*
        #[cfg(not(feature = "metrics"))]
        #[inline]
        pub fn $name(_function: &str) {}
    };
}

counter_fn!(
    /// Record a hit.
    record_hit,
    HIT_COUNTER
);
counter_fn!(
    /// Record a miss.
    record_miss,
    MISS_COUNTER
);
counter_fn!(
    /// Record a stored result.
    record_store,
    STORE_COUNTER
);
counter_fn!(
    /// Record a call whose arguments could not be keyed.
    record_skip,
    SKIP_COUNTER
);
counter_fn!(
    /// Record a breaker trip.
    record_breaker_trip,
    BREAKER_TRIP_COUNTER
);
counter_fn!(
    /// Record a swallowed store failure.
    record_backend_error,
    BACKEND_ERROR_COUNTER
);
