//! Runtime support for fixbuf records.
//!
//! Generated code wraps a [`Record`], which owns a pluggable [`Allocator`]
//! holding the binary image: a 4-byte format-version tag, one 16-byte header
//! per dynamic field (8-byte payload offset, 8-byte payload length), the
//! static field payloads, and an allocator-managed tail for variable-length
//! data. Everything a record stores is readable and writable in place, so a
//! record's buffer can be handed to the wire without a marshal step.
//!
//! ```
//! use fixbuf_runtime::Record;
//!
//! // A record with one dynamic slot and one 4-byte static field.
//! let mut record = Record::new(4 + 16 + 4, 1);
//! record.set::<u32>(20, 7);
//! assert_eq!(record.get::<u32>(20), 7);
//!
//! record.set_dynamic(0, &[1, 2, 3]);
//! assert_eq!(record.dynamic_payload(0), vec![1, 2, 3]);
//! ```

pub mod allocator;
pub mod descriptor;
pub mod error;
pub mod record;
pub mod scalar;
pub mod uint128;
pub mod vector;

pub use allocator::{Allocator, HeapAllocator, StaticSubAllocator, FORMAT_VERSION, SLOT_HEADER_SIZE, VERSION_HEADER_SIZE};
pub use descriptor::{FieldDescriptor, SchemaDescriptor, SchemaFn};
pub use error::RecordError;
pub use record::{Record, TypedRecord};
pub use scalar::Scalar;
pub use uint128::Uint128;
pub use vector::{RecordVector, RecordVectorMut, Vector, VectorMut};
