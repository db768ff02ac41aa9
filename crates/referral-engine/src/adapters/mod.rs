//! Adapter implementations of the outbound ports.

pub mod bus;
pub mod codegen;
pub mod memory;
pub mod time;

pub use bus::{BusEventSink, NullEventSink};
pub use codegen::RandomCodeGenerator;
pub use memory::{InMemoryLedger, SharedLedger};
pub use time::{MockTimeSource, SystemTimeSource};
