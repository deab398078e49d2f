//! Packet dispatch and peer session management for fraglink.
//!
//! This is the "just works" layer. Define packet types, register their
//! decoders, and hand inbound transport bytes to a `Link`; oversized
//! payloads are chunked on send and reassembled on receive behind the
//! scenes. The transport itself and the periodic scheduler that drives
//! `cleanup` stay outside the library.

pub mod config;
pub mod error;
pub mod handler;
pub mod link;
pub mod packet;
pub mod pool;
pub mod registry;

pub use config::LinkConfig;
pub use error::{LinkError, Result};
pub use handler::PacketHandler;
pub use link::Link;
pub use packet::Packet;
pub use pool::AssemblerPool;
pub use registry::{DecodeFn, PacketRegistry};
