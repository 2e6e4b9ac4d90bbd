pub mod config;
pub mod logger;
pub mod platform;
pub mod server;
pub mod store;

pub use config::*;
pub use logger::*;
pub use server::ApplicationServer;
pub use server::*;
