pub mod base;
pub mod encoding;
pub mod http;
pub mod mock;
pub mod utils;
