pub mod ping;
pub mod transport;
