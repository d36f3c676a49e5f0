pub mod bench;
pub mod packet;
pub mod port;

// Re-export key types for easy testing
pub use bench::{Bench, BenchError, Dispatcher, ReceiveSpec, Synchronizer, Transmission};
pub use packet::{Packet, PortEvent};
pub use port::{OutputEmitter, PortRegistry, Subscription};
