/// Type tag written in front of every silent block produced by the indexer.
pub const SILENT_BLOCK_TYPE_FULL: u8 = 0;

pub const TXID_SIZE: usize = 32;
pub const XONLY_PUBKEY_SIZE: usize = 32;
pub const COMPRESSED_PUBKEY_SIZE: usize = 33;
pub const SCAN_TWEAK_SIZE: usize = 33;

// value + pubkey + vout
pub const ENCODED_OUTPUT_SIZE: usize = 8 + XONLY_PUBKEY_SIZE + 4;
// txid + empty output count + scan tweak
pub const MIN_ENCODED_TRANSACTION_SIZE: usize = TXID_SIZE + 1 + SCAN_TWEAK_SIZE;

/// Tag of the BIP352 input hash.
pub const INPUTS_TAG: &[u8] = b"BIP0352/Inputs";

/// x coordinate of the BIP341 unspendable internal key
pub const NUMS_H: [u8; 32] = [
    0x50, 0x92, 0x9b, 0x74, 0xc1, 0xa0, 0x49, 0x54, 0xb7, 0x8b, 0x4b, 0x60, 0x35, 0xe9, 0x7a, 0x5e,
    0x07, 0x8a, 0x5a, 0x0f, 0x28, 0xec, 0x96, 0xd5, 0x47, 0xbf, 0xee, 0x9a, 0xce, 0x80, 0x3a, 0xc0,
];

pub const TAPROOT_ANNEX_PREFIX: u8 = 0x50;

pub const DEFAULT_CONCURRENT_BLOCK_REQUESTS: usize = 16;

pub const RPC_REQUEST_ID: &str = "silent_payment_indexer";
