pub mod handler;
pub mod store;

pub use handler::create_page_router;
pub use store::PageStore;
