//! Session actor tests
//!
//! Timing is driven with explicit `Instant`s; nothing here sleeps except
//! the one `run()` test that needs a real channel.

#[cfg(test)]
mod session_tests;
