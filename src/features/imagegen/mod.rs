pub mod handler;
pub mod models;
pub mod provider;

pub use handler::create_imagegen_router;
