pub mod capture;
pub mod handler;

pub use handler::create_export_router;
