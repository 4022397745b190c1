//! Integration test common infrastructure.
//!
//! Provides a recording in-memory platform, configuration fixtures and a
//! helper that wires a coordinator to both.

pub mod fixtures;
pub mod platform;

#[allow(unused_imports)]
pub use fixtures::{LOBBY_CONFIG, TestNetwork};
#[allow(unused_imports)]
pub use platform::MockPlatform;
