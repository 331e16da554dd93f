use bitcoin::{Amount, BlockHash, ScriptBuf, Txid};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    structs::{InputDescriptor, InputSpend, OutputDescriptor, TransactionData},
};

#[derive(Debug, Serialize)]
pub struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: &'static str,
    pub method: &'a str,
    pub params: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct RpcResponse<T> {
    pub result: Option<T>,
    pub error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Deserialize, Debug)]
#[serde(transparent)]
pub struct MyHex {
    #[serde(with = "hex::serde")]
    pub hex: Vec<u8>,
}

#[derive(Debug, Deserialize)]
pub struct HexScript {
    pub hex: ScriptBuf,
}

/// `getblock <hash> 3`
#[derive(Debug, Deserialize)]
pub struct BlockResponse {
    pub hash: BlockHash,
    pub height: u32,
    pub tx: Vec<TxResponse>,
}

#[derive(Debug, Deserialize)]
pub struct TxResponse {
    pub txid: Txid,
    pub vin: Vec<VinResponse>,
    pub vout: Vec<VoutResponse>,
}

#[derive(Debug, Deserialize)]
pub struct VinResponse {
    pub coinbase: Option<String>,
    pub txid: Option<Txid>,
    pub vout: Option<u32>,
    #[serde(rename = "scriptSig")]
    pub script_sig: Option<HexScript>,
    pub txinwitness: Option<Vec<MyHex>>,
    pub prevout: Option<PrevoutResponse>,
}

#[derive(Debug, Deserialize)]
pub struct PrevoutResponse {
    #[serde(with = "bitcoin::amount::serde::as_btc")]
    pub value: Amount,
    #[serde(rename = "scriptPubKey")]
    pub script_pubkey: HexScript,
}

#[derive(Debug, Deserialize)]
pub struct VoutResponse {
    #[serde(with = "bitcoin::amount::serde::as_btc")]
    pub value: Amount,
    pub n: u32,
    #[serde(rename = "scriptPubKey")]
    pub script_pubkey: HexScript,
}

impl TryFrom<TxResponse> for TransactionData {
    type Error = Error;

    fn try_from(value: TxResponse) -> Result<Self> {
        let txid = value.txid;
        let has_witness = value
            .vin
            .iter()
            .any(|vin| vin.txinwitness.as_ref().is_some_and(|w| !w.is_empty()));

        let inputs = value
            .vin
            .into_iter()
            .filter(|vin| vin.coinbase.is_none())
            .map(|vin| {
                let (Some(prev_txid), Some(vout), Some(prevout)) = (vin.txid, vin.vout, vin.prevout)
                else {
                    return Err(Error::upstream(anyhow::anyhow!(
                        "input of {} is missing its previous output, getblock verbosity 3 is required",
                        txid
                    )));
                };

                let script_sig = vin.script_sig.map(|s| s.hex).unwrap_or_default();
                let spend = if has_witness {
                    InputSpend::Witness {
                        stack: vin
                            .txinwitness
                            .unwrap_or_default()
                            .into_iter()
                            .map(|element| element.hex)
                            .collect(),
                        script_sig,
                    }
                } else {
                    InputSpend::ScriptSig(script_sig)
                };

                Ok(InputDescriptor {
                    outpoint: bitcoin::OutPoint {
                        txid: prev_txid,
                        vout,
                    },
                    prevout_script: prevout.script_pubkey.hex,
                    spend,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut vout = value.vout;
        vout.sort_by_key(|out| out.n);
        let outputs = vout
            .into_iter()
            .map(|out| OutputDescriptor {
                script_pubkey: out.script_pubkey.hex,
                value: out.value,
            })
            .collect();

        Ok(TransactionData {
            txid,
            inputs,
            outputs,
        })
    }
}
