pub mod dto;
pub mod error;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use server::{router, run};
