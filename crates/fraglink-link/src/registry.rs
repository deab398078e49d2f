use dashmap::DashMap;
use fraglink_binary::BinaryReader;

use crate::error::{LinkError, Result};
use crate::packet::Packet;

/// Decoder function: reads one packet's fields from its payload.
pub type DecodeFn = dyn Fn(&mut BinaryReader) -> Result<Box<dyn Packet>> + Send + Sync;

/// Type-id keyed table of packet decoders.
///
/// Type-id meaning is an out-of-band convention shared by both ends;
/// registering under an id that already has a decoder replaces it, last
/// writer wins.
pub struct PacketRegistry {
    decoders: DashMap<i32, Box<DecodeFn>>,
}

impl PacketRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            decoders: DashMap::new(),
        }
    }

    /// Register the decoder for a type id, replacing any existing one.
    pub fn register<F>(&self, type_id: i32, decode: F)
    where
        F: Fn(&mut BinaryReader) -> Result<Box<dyn Packet>> + Send + Sync + 'static,
    {
        self.decoders.insert(type_id, Box::new(decode));
    }

    /// Decode a payload by type id.
    ///
    /// Fails with `UnknownPacketType` when no decoder is registered; the
    /// miss never disturbs registrations for other ids.
    pub fn decode(&self, type_id: i32, reader: &mut BinaryReader) -> Result<Box<dyn Packet>> {
        match self.decoders.get(&type_id) {
            Some(decode) => decode(reader),
            None => Err(LinkError::UnknownPacketType(type_id)),
        }
    }

    /// True if a decoder is registered for the type id.
    pub fn has_decoder(&self, type_id: i32) -> bool {
        self.decoders.contains_key(&type_id)
    }

    /// Registered type ids, sorted.
    pub fn type_ids(&self) -> Vec<i32> {
        let mut ids: Vec<i32> = self.decoders.iter().map(|entry| *entry.key()).collect();
        ids.sort_unstable();
        ids
    }
}

impl Default for PacketRegistry {
    fn default() -> Self {
        Self::new()
    }
}
