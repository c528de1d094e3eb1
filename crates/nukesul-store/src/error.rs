use std::path::PathBuf;

use nukesul_api::ApiError;
use nukesul_core::Size;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A persisted value exists but does not parse.
    #[error("persisted value under \"{key}\" is malformed: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot serialize value for \"{key}\": {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("branch cannot be changed after an order has been placed")]
    BranchLocked,

    #[error("size {size} is not available for product {product_id}")]
    SizeUnavailable { product_id: i64, size: Size },

    #[error("no branch selected")]
    NoBranchSelected,

    #[error("no product selected")]
    NoProductSelected,

    #[error("unknown branch {0}")]
    UnknownBranch(i64),

    #[error("unknown product {0}")]
    UnknownProduct(i64),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),
}
