//! Wire format of silent blocks.
//!
//! ```text
//! u8      type
//! varint  transaction_count
//!   32    txid
//!   varint output_count
//!     u64(BE) value | 32 pubkey | u32(BE) vout
//!   33    scan_tweak
//! ```
//!
//! Varints are little-endian, every other numeric field is big-endian.

mod silent_block;
mod varint;

pub use varint::{decode_varint, encode_varint, read_varint, varint_size, write_varint};
