pub mod commands;
pub mod routes;

pub use commands::{BroadcastCommand, SubscribeCommand, SubscribeError, UnsubscribeCommand};
pub use routes::push_routes;
