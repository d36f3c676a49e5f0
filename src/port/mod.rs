pub mod registry;
pub mod subscription;

pub use registry::{InputPort, OutputEmitter, OutputPort, PortRegistry};
pub use subscription::Subscription;
