pub mod types;

pub use types::{Packet, PortEvent};
