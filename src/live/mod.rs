//! Relay of server push notifications into the console state.

mod relay;

pub use relay::{LiveUpdateRelay, ViewNotice};
