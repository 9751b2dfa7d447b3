//! LumiGrid wire protocol.
//!
//! Every frame is a three-byte header (type tag, little-endian payload
//! length) followed by a type-specific payload. The layered structure is:
//! - `layout`: offsets, tags and payload sizes (source of truth)
//! - `reader`: bounds-checked byte access
//! - `parser`: frame decoding (no direct byte indexing)
//! - `encoder`: frame encoding; length fields are computed from the payload
//! - `error`: explicit, actionable errors
//!
//! Encoding rejects values that do not fit their wire width instead of
//! truncating them. Decoding trusts only the declared length field and
//! checks it against the bytes actually present before reading any payload.
//!
//! Version française (résumé):
//! En-tête de trois octets (type, longueur little-endian) puis charge utile
//! propre au type. Les positions sont dans `layout`, les lectures sûres dans
//! `reader`. Aucune troncature silencieuse à l'encodage.

pub mod encoder;
pub mod error;
pub mod layout;
pub mod message;
pub mod parser;
pub mod reader;

pub use encoder::{encode, encode_into};
pub use error::CodecError;
pub use message::{Message, MessageKind};
pub use parser::{Header, decode, parse_header};
