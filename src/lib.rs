pub mod config;
pub mod error;
pub mod model;
pub mod remote;
pub mod rename;
pub mod session;
pub mod store;
pub mod tree;
