//! AWS Elemental MediaLive

pub mod api;
pub mod multiplex;
pub mod wait;

pub use multiplex::MultiplexResource;
