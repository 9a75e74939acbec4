pub mod board;
pub mod codec;
pub mod config;
pub mod parse_util;
pub mod render;
pub mod rle;
pub mod rules;
pub mod session;
pub mod store;
pub mod ticker;
