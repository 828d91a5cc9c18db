//! TCP binding for the service handlers.

pub mod client;
pub mod protocol;
pub mod server;

pub use client::CurrencyClient;
pub use server::serve;
