use bitcoin::{
    hashes::{hash160, Hash},
    Script,
};

use crate::{
    constants::{COMPRESSED_PUBKEY_SIZE, NUMS_H, TAPROOT_ANNEX_PREFIX, XONLY_PUBKEY_SIZE},
    error::{Error, Result},
    structs::InputDescriptor,
};

/// Shape of the previous output an input spends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpendingPattern {
    /// P2PKH
    Legacy,
    /// P2SH, contributes only when it wraps a P2WPKH program
    WrappedSegwit,
    /// P2WPKH
    NativeSegwit,
    /// P2TR
    Taproot,
}

/// Raw public key bytes found in an input, not yet parsed as a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMaterial {
    Compressed([u8; COMPRESSED_PUBKEY_SIZE]),
    XOnly([u8; XONLY_PUBKEY_SIZE]),
}

impl SpendingPattern {
    pub fn classify(prevout_script: &Script) -> Result<Self> {
        if prevout_script.is_p2pkh() {
            Ok(SpendingPattern::Legacy)
        } else if prevout_script.is_p2sh() {
            Ok(SpendingPattern::WrappedSegwit)
        } else if prevout_script.is_p2wpkh() {
            Ok(SpendingPattern::NativeSegwit)
        } else if prevout_script.is_p2tr() {
            Ok(SpendingPattern::Taproot)
        } else {
            Err(Error::UnsupportedScript(prevout_script.to_owned()))
        }
    }

    /// Finds the key that signed `input`, if this pattern exposes one.
    pub fn extract_key(&self, input: &InputDescriptor) -> Option<KeyMaterial> {
        match self {
            SpendingPattern::Legacy => {
                legacy_key(input.script_sig(), input.prevout_script.as_bytes())
            }
            SpendingPattern::WrappedSegwit => {
                let script_sig = input.script_sig();
                // drop the push opcode in front of the redeem script
                let redeem_script = Script::from_bytes(script_sig.get(1..)?);
                if !redeem_script.is_p2wpkh() {
                    return None;
                }
                last_compressed_key(input.witness())
            }
            SpendingPattern::NativeSegwit => last_compressed_key(input.witness()),
            SpendingPattern::Taproot => {
                taproot_key(input.witness(), input.prevout_script.as_bytes())
            }
        }
    }
}

fn legacy_key(script_sig: &[u8], prevout_script: &[u8]) -> Option<KeyMaterial> {
    let key_hash = prevout_script.get(3..23)?;

    // the key is the last 33 byte window that hashes to the committed hash
    (COMPRESSED_PUBKEY_SIZE..=script_sig.len())
        .rev()
        .map(|end| &script_sig[end - COMPRESSED_PUBKEY_SIZE..end])
        .find(|window| hash160::Hash::hash(window).as_byte_array()[..] == *key_hash)
        .and_then(|window| window.try_into().ok())
        .map(KeyMaterial::Compressed)
}

fn last_compressed_key(witness: &[Vec<u8>]) -> Option<KeyMaterial> {
    witness
        .last()
        .and_then(|element| <[u8; COMPRESSED_PUBKEY_SIZE]>::try_from(element.as_slice()).ok())
        .map(KeyMaterial::Compressed)
}

fn taproot_key(witness: &[Vec<u8>], prevout_script: &[u8]) -> Option<KeyMaterial> {
    let mut stack = witness;
    if stack.is_empty() {
        return None;
    }

    if stack.len() > 1
        && stack.last().and_then(|annex| annex.first()) == Some(&TAPROOT_ANNEX_PREFIX)
    {
        stack = &stack[..stack.len() - 1];
    }

    // script path spends whose internal key is unspendable carry no key
    if stack.len() > 1 {
        let control_block = stack.last()?;
        if control_block.get(1..33) == Some(&NUMS_H[..]) {
            return None;
        }
    }

    let xonly: [u8; XONLY_PUBKEY_SIZE] = prevout_script.get(2..34)?.try_into().ok()?;
    Some(KeyMaterial::XOnly(xonly))
}
