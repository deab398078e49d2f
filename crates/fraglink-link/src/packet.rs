use std::any::Any;
use std::fmt;

use fraglink_binary::BinaryWriter;

/// A typed wire packet.
///
/// Each packet type supplies exactly one schema-fixed encoder here and
/// registers exactly one decoder under its type id in the registry; that
/// pairing is the entire interop contract between the two ends. No
/// schema exchange happens at runtime.
pub trait Packet: Any + Send + Sync {
    /// The numeric id identifying this packet's schema on the wire.
    fn type_id(&self) -> i32;

    /// Encode the packet's fields.
    ///
    /// Only the fields: the envelope (signature and type id) is written
    /// by the handler.
    fn encode(&self, writer: &mut BinaryWriter);

    /// Upcast used by type-filtered subscribers to downcast.
    fn as_any(&self) -> &dyn Any;
}

impl fmt::Debug for dyn Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Packet")
            .field("type_id", &Packet::type_id(self))
            .finish()
    }
}

impl dyn Packet {
    /// True if the concrete packet type is `T`.
    pub fn is<T: Packet>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Downcast to a concrete packet type.
    pub fn downcast_ref<T: Packet>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}
