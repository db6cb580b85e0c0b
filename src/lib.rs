pub mod args;
pub mod buffers;
pub mod core;
pub mod engine;
pub mod error;
pub mod methods;
pub mod registry;
