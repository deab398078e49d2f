//! Big-endian binary codec for fraglink payloads.
//!
//! Two encoding layers live here:
//! - A schema-fixed layer (`BinaryWriter`/`BinaryReader`): no type
//!   information on the wire, the reader must know the exact read
//!   sequence in advance.
//! - A self-describing layer (`Value`): every value is prefixed with a
//!   numeric kind tag, for open-ended property collections.
//!
//! Byte order is fixed network byte order for cross-implementation
//! compatibility.

pub mod error;
pub mod reader;
pub mod value;
pub mod writer;

pub use error::{BinaryError, Result};
pub use reader::BinaryReader;
pub use value::Value;
pub use writer::BinaryWriter;
