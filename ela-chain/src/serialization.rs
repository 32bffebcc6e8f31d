//! Consensus-critical serialization.
//!
//! This module contains four traits: `ElaSerialize` and `ElaDeserialize`,
//! analogs of the Serde `Serialize` and `Deserialize` traits but intended for
//! consensus-critical serialization formats, and `WriteElaExt` and
//! `ReadElaExt`, extension traits for `io::Read` and `io::Write` with utility
//! functions for reading and writing data (e.g., the variable-integer format).

mod ela_deserialize;
mod ela_serialize;
mod error;
mod read_ela;
mod write_ela;

pub mod sha256d;

#[cfg(test)]
mod tests;

pub use ela_deserialize::{ElaDeserialize, ElaDeserializeInto, TrustedPreallocate};
pub(crate) use ela_deserialize::max_items_for_size;
pub use ela_serialize::{ElaSerialize, FakeWriter, MAX_PROTOCOL_MESSAGE_LEN};
pub use error::SerializationError;
pub use read_ela::ReadElaExt;
pub use write_ela::WriteElaExt;
