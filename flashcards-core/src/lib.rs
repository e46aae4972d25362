pub mod errors;
pub mod ids;
pub mod mapper;
pub mod messages;
pub mod models;
pub mod repo;
pub mod service;
pub mod validation;

pub use errors::*;
pub use ids::*;
pub use mapper::*;
pub use models::*;
pub use repo::*;
pub use service::*;
