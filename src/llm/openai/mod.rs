mod request;
pub use request::*;

mod client;
pub use client::*;

mod builder;
pub use builder::*;

mod models;
pub use models::*;
