pub mod app;
pub mod log_view;
