//! Port traits: the inbound API the engine offers and the outbound SPI it
//! requires from the host.

pub mod inbound;
pub mod outbound;
