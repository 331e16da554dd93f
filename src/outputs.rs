use bitcoin::Script;

use crate::{
    constants::XONLY_PUBKEY_SIZE,
    structs::{EligibleOutput, OutputDescriptor},
};

const OP_1: u8 = 0x51;
const OP_PUSHBYTES_32: u8 = 0x20;

/// Whether `script` is a segwit v1 program carrying a 32 byte key.
pub fn is_eligible_script(script: &Script) -> bool {
    let bytes = script.as_bytes();
    bytes.len() == 2 + XONLY_PUBKEY_SIZE && bytes[0] == OP_1 && bytes[1] == OP_PUSHBYTES_32
}

/// Selects the outputs a silent payment recipient could own.
///
/// The key bytes are taken verbatim, they are not checked to be on the curve.
pub fn extract_eligible_outputs(outputs: &[OutputDescriptor]) -> Vec<EligibleOutput> {
    outputs
        .iter()
        .enumerate()
        .filter(|(_, output)| is_eligible_script(&output.script_pubkey))
        .map(|(vout, output)| {
            let mut pubkey = [0u8; XONLY_PUBKEY_SIZE];
            pubkey.copy_from_slice(&output.script_pubkey.as_bytes()[2..]);

            EligibleOutput {
                value: output.value,
                pubkey,
                vout: vout as u32,
            }
        })
        .collect()
}
