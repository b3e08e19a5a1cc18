pub mod combine_latest;
pub mod decode;
mod fan_in;
pub mod filter;
pub mod flat_map;
pub mod handle_events;
pub mod map;
pub mod map_err;
pub mod merge;
pub mod receive_on;
pub mod retry;
pub mod subscribe_on;
pub mod try_map;
pub mod zip;

pub use decode::TopLevelDecoder;
#[cfg(feature = "json")]
pub use decode::JsonDecoder;
pub use handle_events::Events;
