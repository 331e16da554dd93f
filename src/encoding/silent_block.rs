use std::io::{self, Cursor, Read, Write};

use bitcoin::{hashes::Hash, Amount, Txid};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::{
    constants::{
        ENCODED_OUTPUT_SIZE, MIN_ENCODED_TRANSACTION_SIZE, SCAN_TWEAK_SIZE, TXID_SIZE,
        XONLY_PUBKEY_SIZE,
    },
    error::{Error, Result},
    structs::{EligibleOutput, ScanTweak, SilentBlock, SilentTransaction},
};

use super::varint::{read_varint, varint_size, write_varint};

impl SilentBlock {
    pub fn encoded_len(&self) -> usize {
        let transactions: usize = self
            .transactions()
            .iter()
            .map(|tx| {
                TXID_SIZE
                    + varint_size(tx.outputs.len() as u64)
                    + tx.outputs.len() * ENCODED_OUTPUT_SIZE
                    + SCAN_TWEAK_SIZE
            })
            .sum();

        1 + varint_size(self.len() as u64) + transactions
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        // writing into a Vec cannot fail
        let _ = self.encode_to(&mut buf);
        buf
    }

    /// Writes the wire representation and returns the number of bytes written.
    pub fn encode_to<W: Write>(&self, writer: &mut W) -> io::Result<usize> {
        writer.write_u8(self.block_type())?;
        let mut len = 1 + write_varint(writer, self.len() as u64)?;

        for tx in self.transactions() {
            len += write_transaction(writer, tx)?;
        }

        Ok(len)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(bytes);

        let block_type = cursor
            .read_u8()
            .map_err(|_| Error::malformed("missing block type"))?;
        let declared = read_varint(&mut cursor)?;
        let left = remaining(&cursor);
        let count = checked_count(declared, left, MIN_ENCODED_TRANSACTION_SIZE).ok_or_else(|| {
            Error::malformed(format!(
                "declared {} transactions but only {} bytes remain",
                declared, left
            ))
        })?;

        let mut transactions = Vec::with_capacity(count);
        for _ in 0..count {
            transactions.push(read_transaction(&mut cursor)?);
        }

        if remaining(&cursor) != 0 {
            return Err(Error::malformed(format!(
                "{} trailing bytes after last transaction",
                remaining(&cursor)
            )));
        }

        Ok(SilentBlock::new(block_type, transactions))
    }
}

fn write_transaction<W: Write>(writer: &mut W, tx: &SilentTransaction) -> io::Result<usize> {
    // txids go on the wire in the byte order used by their hex representation
    let mut txid = tx.txid.to_byte_array();
    txid.reverse();
    writer.write_all(&txid)?;

    let mut len = TXID_SIZE + write_varint(writer, tx.outputs.len() as u64)?;

    for output in &tx.outputs {
        writer.write_u64::<BigEndian>(output.value.to_sat())?;
        writer.write_all(&output.pubkey)?;
        writer.write_u32::<BigEndian>(output.vout)?;
        len += ENCODED_OUTPUT_SIZE;
    }

    writer.write_all(tx.scan_tweak.as_bytes())?;

    Ok(len + SCAN_TWEAK_SIZE)
}

fn read_transaction(cursor: &mut Cursor<&[u8]>) -> Result<SilentTransaction> {
    let mut txid = [0u8; TXID_SIZE];
    read_field(cursor, &mut txid, "txid")?;
    txid.reverse();

    let declared = read_varint(cursor)?;
    let left = remaining(cursor);
    let count = checked_count(declared, left, ENCODED_OUTPUT_SIZE).ok_or_else(|| {
        Error::malformed(format!(
            "declared {} outputs but only {} bytes remain",
            declared, left
        ))
    })?;

    let mut outputs = Vec::with_capacity(count);
    for _ in 0..count {
        let value = cursor
            .read_u64::<BigEndian>()
            .map_err(|_| Error::malformed("truncated output value"))?;
        let mut pubkey = [0u8; XONLY_PUBKEY_SIZE];
        read_field(cursor, &mut pubkey, "output pubkey")?;
        let vout = cursor
            .read_u32::<BigEndian>()
            .map_err(|_| Error::malformed("truncated output index"))?;

        outputs.push(EligibleOutput {
            value: Amount::from_sat(value),
            pubkey,
            vout,
        });
    }

    let mut scan_tweak = [0u8; SCAN_TWEAK_SIZE];
    read_field(cursor, &mut scan_tweak, "scan tweak")?;

    Ok(SilentTransaction {
        txid: Txid::from_byte_array(txid),
        outputs,
        scan_tweak: ScanTweak::from_bytes(scan_tweak),
    })
}

fn read_field(cursor: &mut Cursor<&[u8]>, buf: &mut [u8], name: &str) -> Result<()> {
    cursor
        .read_exact(buf)
        .map_err(|_| Error::malformed(format!("truncated {}", name)))
}

fn remaining(cursor: &Cursor<&[u8]>) -> usize {
    cursor.get_ref().len().saturating_sub(cursor.position() as usize)
}

/// Rejects counts whose items could not possibly fit in what is left of the buffer.
fn checked_count(count: u64, remaining: usize, min_item_size: usize) -> Option<usize> {
    let count = usize::try_from(count).ok()?;
    (count.checked_mul(min_item_size)? <= remaining).then_some(count)
}
