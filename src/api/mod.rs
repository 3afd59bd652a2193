pub mod citizens;
pub mod client;
pub mod deserializers;
pub mod http_client;
pub mod types;

pub use citizens::HttpCitizenSource;
pub use client::{CitizenSource, ClientConfig};
