use std::{fmt, str::FromStr};

use bitcoin::{
    hex::{DisplayHex, FromHex},
    secp256k1::PublicKey,
    Amount, OutPoint, ScriptBuf, Transaction, TxIn, Txid,
};

use crate::{
    constants::{SCAN_TWEAK_SIZE, SILENT_BLOCK_TYPE_FULL},
    error::{Error, Result},
};

/// How an input unlocks its previous output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSpend {
    /// The owning transaction carries no witness data.
    ScriptSig(ScriptBuf),
    /// The owning transaction carries witness data. The scriptSig is kept
    /// for wrapped spends, which push their redeem script there.
    Witness {
        stack: Vec<Vec<u8>>,
        script_sig: ScriptBuf,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDescriptor {
    pub outpoint: OutPoint,
    pub prevout_script: ScriptBuf,
    pub spend: InputSpend,
}

impl InputDescriptor {
    pub fn from_txin(txin: &TxIn, prevout_script: ScriptBuf, tx_has_witness: bool) -> Self {
        let spend = if tx_has_witness {
            InputSpend::Witness {
                stack: txin.witness.to_vec(),
                script_sig: txin.script_sig.clone(),
            }
        } else {
            InputSpend::ScriptSig(txin.script_sig.clone())
        };

        Self {
            outpoint: txin.previous_output,
            prevout_script,
            spend,
        }
    }

    pub fn script_sig(&self) -> &[u8] {
        match &self.spend {
            InputSpend::ScriptSig(script_sig) => script_sig.as_bytes(),
            InputSpend::Witness { script_sig, .. } => script_sig.as_bytes(),
        }
    }

    pub fn witness(&self) -> &[Vec<u8>] {
        match &self.spend {
            InputSpend::ScriptSig(_) => &[],
            InputSpend::Witness { stack, .. } => stack,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDescriptor {
    pub script_pubkey: ScriptBuf,
    pub value: Amount,
}

/// A confirmed transaction with every previous output script resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionData {
    pub txid: Txid,
    pub inputs: Vec<InputDescriptor>,
    pub outputs: Vec<OutputDescriptor>,
}

impl TransactionData {
    /// `prevout_scripts` must hold one script per input, in input order.
    /// Coinbase transactions have no spendable inputs and may pass an empty slice.
    pub fn from_transaction(tx: &Transaction, prevout_scripts: &[ScriptBuf]) -> Result<Self> {
        let txid = tx.txid();

        if tx.input.iter().all(|txin| txin.previous_output.is_null()) {
            return Ok(Self {
                txid,
                inputs: vec![],
                outputs: tx.output.iter().map(Into::into).collect(),
            });
        }

        if tx.input.len() != prevout_scripts.len() {
            return Err(Error::upstream(anyhow::anyhow!(
                "transaction {} has {} inputs but {} resolved previous outputs",
                txid,
                tx.input.len(),
                prevout_scripts.len()
            )));
        }

        let has_witness = tx.input.iter().any(|txin| !txin.witness.is_empty());
        let inputs = tx
            .input
            .iter()
            .zip(prevout_scripts)
            .map(|(txin, script)| InputDescriptor::from_txin(txin, script.clone(), has_witness))
            .collect();

        Ok(Self {
            txid,
            inputs,
            outputs: tx.output.iter().map(Into::into).collect(),
        })
    }
}

impl From<&bitcoin::TxOut> for OutputDescriptor {
    fn from(value: &bitcoin::TxOut) -> Self {
        Self {
            script_pubkey: value.script_pubkey.clone(),
            value: value.value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EligibleOutput {
    pub value: Amount,
    pub pubkey: [u8; 32],
    pub vout: u32,
}

/// Compressed curve point published once per qualifying transaction.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScanTweak([u8; SCAN_TWEAK_SIZE]);

impl ScanTweak {
    pub fn from_bytes(bytes: [u8; SCAN_TWEAK_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SCAN_TWEAK_SIZE] {
        &self.0
    }

    pub fn to_public_key(&self) -> Result<PublicKey> {
        Ok(PublicKey::from_slice(&self.0)?)
    }
}

impl From<PublicKey> for ScanTweak {
    fn from(value: PublicKey) -> Self {
        Self(value.serialize())
    }
}

impl fmt::Display for ScanTweak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.as_slice().to_lower_hex_string())
    }
}

impl fmt::Debug for ScanTweak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScanTweak({})", self)
    }
}

impl FromStr for ScanTweak {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = Vec::<u8>::from_hex(s)
            .map_err(|e| Error::malformed(format!("scan tweak: {}", e)))?;
        let bytes: [u8; SCAN_TWEAK_SIZE] = bytes
            .try_into()
            .map_err(|_| Error::malformed("scan tweak must be 33 bytes"))?;
        Ok(Self(bytes))
    }
}

/// One qualifying transaction of a silent block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SilentTransaction {
    pub txid: Txid,
    pub outputs: Vec<EligibleOutput>,
    pub scan_tweak: ScanTweak,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SilentBlock {
    block_type: u8,
    transactions: Vec<SilentTransaction>,
}

impl SilentBlock {
    pub fn new(block_type: u8, transactions: Vec<SilentTransaction>) -> Self {
        Self {
            block_type,
            transactions,
        }
    }

    pub fn empty() -> Self {
        Self::new(SILENT_BLOCK_TYPE_FULL, vec![])
    }

    pub fn block_type(&self) -> u8 {
        self.block_type
    }

    pub fn transactions(&self) -> &[SilentTransaction] {
        &self.transactions
    }

    pub fn into_transactions(self) -> Vec<SilentTransaction> {
        self.transactions
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }
}
