use bitcoin::{
    consensus,
    hashes::{sha256, Hash, HashEngine},
    Txid,
};
use log::{debug, warn};

use crate::{
    constants::INPUTS_TAG,
    error::{Error, Result},
    structs::{InputDescriptor, ScanTweak},
};

use super::{
    curve::{CurveArithmetic, Secp256k1Curve},
    input::{KeyMaterial, SpendingPattern},
};

/// Derives the scan tweak of a transaction from its resolved inputs.
#[derive(Debug, Clone)]
pub struct ScanTweakComputer<C = Secp256k1Curve> {
    curve: C,
}

impl ScanTweakComputer {
    pub fn new() -> Self {
        Self {
            curve: Secp256k1Curve::new(),
        }
    }
}

impl Default for ScanTweakComputer {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: CurveArithmetic> ScanTweakComputer<C> {
    pub fn with_curve(curve: C) -> Self {
        Self { curve }
    }

    /// Computes `hash(outpoint_L || A) * A` where `A` is the sum of every
    /// input key and `outpoint_L` the smallest outpoint spent.
    ///
    /// Inputs that expose no key are skipped. Fails with
    /// [`Error::NoKeyMaterial`] when none is left.
    pub fn compute_scan_tweak(&self, txid: &Txid, inputs: &[InputDescriptor]) -> Result<ScanTweak> {
        let keys: Vec<C::Point> = inputs
            .iter()
            .filter_map(|input| match self.input_key(input) {
                Ok(key) => key,
                Err(e) => {
                    debug!("{}: input {} skipped: {}", txid, input.outpoint, e);
                    None
                }
            })
            .collect();

        let sum = self
            .curve
            .add_points(&keys)
            .ok_or(Error::NoKeyMaterial(*txid))?;

        let smallest_outpoint = smallest_outpoint(inputs).ok_or(Error::NoKeyMaterial(*txid))?;
        let input_hash = input_hash(&smallest_outpoint, &self.curve.compress(&sum));

        let tweak = self.curve.mul_scalar(&sum, &input_hash)?;

        Ok(ScanTweak::from_bytes(self.curve.compress(&tweak)))
    }

    fn input_key(&self, input: &InputDescriptor) -> Result<Option<C::Point>> {
        let pattern = SpendingPattern::classify(&input.prevout_script)?;

        let point = match pattern.extract_key(input) {
            Some(KeyMaterial::Compressed(bytes)) => self.curve.parse_compressed(&bytes),
            Some(KeyMaterial::XOnly(x)) => self.curve.lift_x_even(&x),
            None => return Ok(None),
        };

        if point.is_none() {
            warn!(
                "input {} exposes a {:?} key that is not on the curve",
                input.outpoint, pattern
            );
        }

        Ok(point)
    }
}

/// Lexicographically smallest consensus serialization among the spent outpoints.
pub fn smallest_outpoint(inputs: &[InputDescriptor]) -> Option<Vec<u8>> {
    inputs
        .iter()
        .map(|input| consensus::serialize(&input.outpoint))
        .min()
}

/// Tagged hash of `outpoint || sum_key`.
pub fn input_hash(outpoint: &[u8], sum_key: &[u8]) -> [u8; 32] {
    let tag = sha256::Hash::hash(INPUTS_TAG);

    let mut engine = sha256::Hash::engine();
    engine.input(tag.as_byte_array());
    engine.input(tag.as_byte_array());
    engine.input(outpoint);
    engine.input(sum_key);

    sha256::Hash::from_engine(engine).to_byte_array()
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bitcoin::{
        hashes::hash160,
        secp256k1::{PublicKey, Secp256k1, SecretKey},
        OutPoint, ScriptBuf,
    };

    use super::*;
    use crate::structs::InputSpend;

    const K1: &str = "eadc78165ff1f8ea94ad7cfdc54990738a4c53f6e0507b42154201b8e5dff3b1";
    const K2: &str = "93f5ed907ad5b2bdbbdcb5d9116ebc0a4e1f92f910d5260237fa45a9408aad16";
    const K3: &str = "8d4751f6e8a3586880fb66c19ae277969bd5aa06f61c4ee2f1e2486efdf666d3";
    const K4: &str = "0378e95685b74565fa56751b84a32dfd18545d10d691641b8372e32164fad66a";

    const TXID_A: &str = "f4184fc596403b9d638783cf57adfe4c75c605f6356fbc91338530e9831e9e16";
    const TXID_B: &str = "a1075db55d416d3ca199f55b6084e2115b9345e16c5cf302fc80e9d5fbf5d48d";
    const TXID_C: &str = "3a286147b25e16ae80aff406f2673c6e565418c40f45c071245cdebc8a94174e";
    const TXID_D: &str = "6c1ba1d8f3b52b32bbd4e1ac4b56eaa4bb1fd1e4e11e4b1e3a5b8b2e3b5d2c00";

    fn pubkey(sk: &str) -> PublicKey {
        let secp = Secp256k1::signing_only();
        SecretKey::from_str(sk).unwrap().public_key(&secp)
    }

    fn outpoint(txid: &str, vout: u32) -> OutPoint {
        OutPoint {
            txid: Txid::from_str(txid).unwrap(),
            vout,
        }
    }

    fn key_hash(key: &PublicKey) -> [u8; 20] {
        hash160::Hash::hash(&key.serialize()).to_byte_array()
    }

    fn p2wpkh_input(op: OutPoint, key: &PublicKey) -> InputDescriptor {
        let mut script = vec![0x00, 0x14];
        script.extend(key_hash(key));

        InputDescriptor {
            outpoint: op,
            prevout_script: ScriptBuf::from_bytes(script),
            spend: InputSpend::Witness {
                stack: vec![vec![0x30; 71], key.serialize().to_vec()],
                script_sig: ScriptBuf::new(),
            },
        }
    }

    fn p2tr_input(op: OutPoint, key: &PublicKey) -> InputDescriptor {
        let mut script = vec![0x51, 0x20];
        script.extend(key.x_only_public_key().0.serialize());

        InputDescriptor {
            outpoint: op,
            prevout_script: ScriptBuf::from_bytes(script),
            spend: InputSpend::Witness {
                stack: vec![vec![0x01; 64]],
                script_sig: ScriptBuf::new(),
            },
        }
    }

    fn p2pkh_input(op: OutPoint, key: &PublicKey) -> InputDescriptor {
        let mut script = vec![0x76, 0xa9, 0x14];
        script.extend(key_hash(key));
        script.extend([0x88, 0xac]);

        let mut script_sig = vec![0x47];
        script_sig.extend([0x30; 71]);
        script_sig.push(0x21);
        script_sig.extend(key.serialize());

        InputDescriptor {
            outpoint: op,
            prevout_script: ScriptBuf::from_bytes(script),
            spend: InputSpend::Witness {
                stack: vec![],
                script_sig: ScriptBuf::from_bytes(script_sig),
            },
        }
    }

    fn p2sh_p2wpkh_input(op: OutPoint, key: &PublicKey) -> InputDescriptor {
        let mut redeem_script = vec![0x00, 0x14];
        redeem_script.extend(key_hash(key));

        let mut script = vec![0xa9, 0x14];
        script.extend(hash160::Hash::hash(&redeem_script).to_byte_array());
        script.push(0x87);

        let mut script_sig = vec![0x16];
        script_sig.extend(redeem_script);

        InputDescriptor {
            outpoint: op,
            prevout_script: ScriptBuf::from_bytes(script),
            spend: InputSpend::Witness {
                stack: vec![vec![0x30; 71], key.serialize().to_vec()],
                script_sig: ScriptBuf::from_bytes(script_sig),
            },
        }
    }

    fn p2wsh_input(op: OutPoint) -> InputDescriptor {
        let mut script = vec![0x00, 0x20];
        script.extend([0x42; 32]);

        InputDescriptor {
            outpoint: op,
            prevout_script: ScriptBuf::from_bytes(script),
            spend: InputSpend::Witness {
                stack: vec![vec![], vec![0x51]],
                script_sig: ScriptBuf::new(),
            },
        }
    }

    fn all_kinds() -> Vec<InputDescriptor> {
        vec![
            p2wpkh_input(outpoint(TXID_A, 0), &pubkey(K1)),
            p2tr_input(outpoint(TXID_B, 3), &pubkey(K2)),
            p2pkh_input(outpoint(TXID_C, 1), &pubkey(K3)),
            p2sh_p2wpkh_input(outpoint(TXID_B, 1), &pubkey(K4)),
        ]
    }

    fn txid() -> Txid {
        Txid::from_str(TXID_A).unwrap()
    }

    #[test]
    fn known_answer_single_input() {
        let computer = ScanTweakComputer::new();
        let inputs = vec![p2wpkh_input(outpoint(TXID_A, 0), &pubkey(K1))];

        let tweak = computer.compute_scan_tweak(&txid(), &inputs).unwrap();

        assert_eq!(
            tweak.to_string(),
            "02b04034f00da0678507d1345b7d56fecef825a1151f9dc7d8ca6946452a9e1f43"
        );
    }

    #[test]
    fn known_answer_taproot_input_uses_even_key() {
        // K2 has an odd y coordinate, the tweak must use its even twin
        assert_eq!(pubkey(K2).serialize()[0], 0x03);

        let computer = ScanTweakComputer::new();
        let inputs = vec![p2tr_input(outpoint(TXID_B, 3), &pubkey(K2))];

        let tweak = computer.compute_scan_tweak(&txid(), &inputs).unwrap();

        assert_eq!(
            tweak.to_string(),
            "02705f172687d2abf200e643a5e17c99f8164caf6548d1d78eba42185da71efb59"
        );
    }

    #[test]
    fn known_answer_every_spending_pattern() {
        let computer = ScanTweakComputer::new();

        let tweak = computer.compute_scan_tweak(&txid(), &all_kinds()).unwrap();

        assert_eq!(
            tweak.to_string(),
            "0364f716e7bbb7ae11d87cdf8eb66ad37d5157cb5735663dfa826cd038f6e8d820"
        );
    }

    #[test]
    fn unsupported_inputs_are_skipped_but_count_for_the_outpoint() {
        let computer = ScanTweakComputer::new();
        let mut inputs = all_kinds();
        // smallest outpoint of the set, but contributes no key
        inputs.push(p2wsh_input(outpoint(TXID_D, 0)));

        let with_unsupported = computer.compute_scan_tweak(&txid(), &inputs).unwrap();
        assert_eq!(
            with_unsupported.to_string(),
            "02a2f517962977a01b098100f6f0176b463dd883a0d286290c77b41270dafaa4ac"
        );
        assert_ne!(
            with_unsupported,
            computer.compute_scan_tweak(&txid(), &all_kinds()).unwrap()
        );

        // replacing the taproot input with a script path on the same outpoint
        let mut inputs = all_kinds();
        inputs[1] = p2wsh_input(outpoint(TXID_B, 3));
        let tweak = computer.compute_scan_tweak(&txid(), &inputs).unwrap();
        assert_eq!(
            tweak.to_string(),
            "0338d1f3701f320de7641c4468a65e955fe7156d4f34aeb3d549a45eaf59032488"
        );
    }

    #[test]
    fn computation_is_deterministic_and_order_insensitive_for_keys() {
        let computer = ScanTweakComputer::new();
        let inputs = all_kinds();

        let first = computer.compute_scan_tweak(&txid(), &inputs).unwrap();
        let second = computer.compute_scan_tweak(&txid(), &inputs).unwrap();
        assert_eq!(first.as_bytes(), second.as_bytes());

        let mut reversed = inputs;
        reversed.reverse();
        assert_eq!(computer.compute_scan_tweak(&txid(), &reversed).unwrap(), first);
    }

    #[test]
    fn no_key_material() {
        let computer = ScanTweakComputer::new();

        assert!(matches!(
            computer.compute_scan_tweak(&txid(), &[]),
            Err(Error::NoKeyMaterial(_))
        ));

        let inputs = vec![p2wsh_input(outpoint(TXID_A, 0))];
        assert!(matches!(
            computer.compute_scan_tweak(&txid(), &inputs),
            Err(Error::NoKeyMaterial(_))
        ));
    }

    #[test]
    fn keys_cancelling_out_yield_no_key_material() {
        let secp = Secp256k1::new();
        let key = pubkey(K1);
        let inputs = vec![
            p2wpkh_input(outpoint(TXID_A, 0), &key),
            p2wpkh_input(outpoint(TXID_A, 1), &key.negate(&secp)),
        ];

        assert!(matches!(
            ScanTweakComputer::new().compute_scan_tweak(&txid(), &inputs),
            Err(Error::NoKeyMaterial(_))
        ));
    }

    #[test]
    fn smallest_outpoint_compares_serialized_bytes() {
        // vout is little endian, so 256 serializes smaller than 1
        let inputs = vec![
            p2wsh_input(outpoint(TXID_A, 1)),
            p2wsh_input(outpoint(TXID_A, 256)),
        ];

        let smallest = smallest_outpoint(&inputs).unwrap();
        assert_eq!(smallest, consensus::serialize(&outpoint(TXID_A, 256)));
        assert!(smallest_outpoint(&[]).is_none());
    }
}
