pub mod api;
pub mod model;
pub mod poller;

pub use api::{Client, Error};
pub use poller::{Channels, Poller};
