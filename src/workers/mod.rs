// Sample servers runnable under the application coordinator.

pub mod heartbeat;


pub use heartbeat::Heartbeat;
