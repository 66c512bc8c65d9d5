use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("store error: {0}")]
    Store(#[from] dpos_store::StoreError),

    #[error("LMDB error: {0}")]
    Lmdb(#[from] dpos_store_lmdb::LmdbError),

    #[error("invalid address '{address}': {reason}")]
    InvalidAddress {
        address: String,
        reason: dpos_crypto::AddressError,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error("logging error: {0}")]
    Logging(String),
}
