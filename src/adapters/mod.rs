// Adapters layer: concrete implementations of the domain ports.

pub mod backup;
pub mod console;
pub mod http;
pub mod storage;
