//! Full-wiring integration flows: service, in-memory ledger and event bus
//! assembled the way a host application assembles them.

pub mod event_stream;
pub mod flows;
