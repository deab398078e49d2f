use std::sync::{Arc, RwLock};

use bytes::Bytes;
use fraglink_frame::Assembler;
use tracing::warn;

use crate::config::LinkConfig;
use crate::error::Result;
use crate::handler::PacketHandler;
use crate::packet::Packet;
use crate::registry::PacketRegistry;

type Subscriber = Box<dyn Fn(&dyn Packet) + Send + Sync>;

/// One logical peer session.
///
/// Bundles the decoder registry, the send/receive handler, the
/// reassembly state for this peer, and an ordered list of receive
/// subscribers. Subscribers run synchronously, in registration order, on
/// whatever thread delivers the inbound message; the link adds no
/// concurrency of its own.
///
/// A link's assembler is scoped to this one peer. A process talking to
/// several peers needs one link (or at least one assembler, see
/// `AssemblerPool`) per peer, because stream ids from independent
/// senders collide.
pub struct Link {
    registry: Arc<PacketRegistry>,
    handler: PacketHandler,
    assembler: Assembler,
    subscribers: RwLock<Vec<Subscriber>>,
    config: LinkConfig,
}

impl Link {
    /// Create a link with default configuration.
    pub fn new() -> Self {
        Self::with_config(LinkConfig::default())
    }

    /// Create a link with explicit configuration.
    pub fn with_config(config: LinkConfig) -> Self {
        let registry = Arc::new(PacketRegistry::new());
        let handler =
            PacketHandler::new(Arc::clone(&registry)).with_chunk_size_limit(config.chunk_size_limit);
        Self {
            registry,
            handler,
            assembler: Assembler::new(),
            subscribers: RwLock::new(Vec::new()),
            config,
        }
    }

    /// The link's decoder registry.
    pub fn registry(&self) -> &PacketRegistry {
        &self.registry
    }

    /// The link's reassembly state.
    pub fn assembler(&self) -> &Assembler {
        &self.assembler
    }

    /// The link's configuration.
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Subscribe to every decoded packet.
    pub fn on_receive(&self, subscriber: impl Fn(&dyn Packet) + Send + Sync + 'static) {
        let mut subscribers = self
            .subscribers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        subscribers.push(Box::new(subscriber));
    }

    /// Subscribe to decoded packets of one concrete type.
    pub fn on_receive_typed<T: Packet>(&self, subscriber: impl Fn(&T) + Send + Sync + 'static) {
        self.on_receive(move |packet| {
            if let Some(typed) = packet.downcast_ref::<T>() {
                subscriber(typed);
            }
        });
    }

    /// Serialize and transmit a packet over the supplied transport hook.
    pub fn send(&self, packet: &dyn Packet, transmit: impl FnMut(Bytes)) -> Result<()> {
        self.handler.send(packet, transmit)
    }

    /// Process one inbound transport message for this peer.
    ///
    /// Decoded packets are delivered to every subscriber in registration
    /// order. Never fails outward; bad input costs one packet.
    pub fn handle_message(&self, bytes: &[u8]) {
        self.handle_message_with(&self.assembler, bytes);
    }

    /// Process one inbound message against an external assembler.
    ///
    /// For hosts serving multiple peers from one link: pick the
    /// assembler for the sending peer (see `AssemblerPool`) and pass it
    /// here.
    pub fn handle_message_with(&self, assembler: &Assembler, bytes: &[u8]) {
        self.handler.receive(bytes, assembler, |packet| {
            match self.subscribers.read() {
                Ok(subscribers) => {
                    for subscriber in subscribers.iter() {
                        subscriber(packet.as_ref());
                    }
                }
                Err(poisoned) => {
                    warn!("subscriber list poisoned by a panicked writer; delivering anyway");
                    for subscriber in poisoned.into_inner().iter() {
                        subscriber(packet.as_ref());
                    }
                }
            }
        });
    }

    /// Evict reassembly streams idle past the configured timeout.
    ///
    /// The host's periodic scheduler must call this on a cadence no
    /// longer than the timeout itself.
    pub fn cleanup(&self) -> usize {
        self.assembler.cleanup(self.config.reassembly_timeout)
    }
}

impl Default for Link {
    fn default() -> Self {
        Self::new()
    }
}
