//! Core module tests
//!
//! Contains test suites for core functionality:
//! - Key registry lookups and canonicalisation
//! - Config tree (de)serialisation
//! - Tree validation and path lookup
//! - Shortcut string parsing
//! - Navigation state machine

#[cfg(test)]
mod navigation_tests;
#[cfg(test)]
mod validator_tests;
