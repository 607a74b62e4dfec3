pub mod client;
pub mod handler;
pub mod models;
pub mod placeholder;
pub mod prompt;

// 对外导出路由构建函数，便于 main.rs 引用
pub use handler::create_generate_router;
