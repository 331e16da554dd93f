use bitcoin::{ScriptBuf, Txid};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Decoding
    #[error("malformed input: {0}")]
    MalformedInput(String),

    // Scan tweak computation
    #[error("unsupported previous output script: {0}")]
    UnsupportedScript(ScriptBuf),
    #[error("no input of transaction {0} yields key material")]
    NoKeyMaterial(Txid),

    // Chain data
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(anyhow::Error),

    // Validation
    #[error("invalid index range: start ({0}) > end ({1})")]
    InvalidRange(u32, u32),
    #[error("invalid block hash: {0}")]
    InvalidBlockHash(String),

    // Wrapped external errors
    #[error(transparent)]
    Secp256k1(#[from] bitcoin::secp256k1::Error),
    #[error(transparent)]
    InvalidHeight(#[from] bitcoin::absolute::ConversionError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Error::MalformedInput(msg.into())
    }

    pub fn upstream(err: impl Into<anyhow::Error>) -> Self {
        Error::UpstreamUnavailable(err.into())
    }

    /// Only chain data failures may succeed when the same block is retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::UpstreamUnavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_upstream_errors_are_transient() {
        assert!(Error::upstream(anyhow::anyhow!("connection refused")).is_transient());
        assert!(!Error::malformed("truncated").is_transient());
        assert!(!Error::InvalidRange(2, 1).is_transient());
    }
}
