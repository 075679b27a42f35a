// src/net.rs
//! Network layer: the [`SessionClient`] transport, its buffered [`Response`]
//! model, and the [`HttpDebugger`] side channel.

mod debug;
mod response;
mod session;

pub use debug::{log_exchange, HttpDebugger, HttpExchange};
pub use response::Response;
pub use session::{decode_json, SessionClient};
