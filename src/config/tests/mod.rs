//! Config module tests
//!
//! - config.json loading, defaults and failure fallback
//! - settings.json lenient loading and round-tripping
