use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::catalog::{Kind, TypePath, TypeRef};

#[derive(Error, Debug)]
pub enum GenerationError {
    /// A constructed generic form the resolver does not recognize.
    #[error("Unsupported generic shape: `{ty}`")]
    UnsupportedGenericShape { ty: TypeRef },

    /// A gathered type that is neither interface-like nor enum-like.
    #[error("Cannot convert `{ty}` of kind {kind} into a declaration")]
    UnconvertibleKind { ty: TypeRef, kind: Kind },

    #[error("Type `{path}` is not registered in the catalog")]
    UnknownType { path: TypePath },

    #[error("Filesystem Error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Config Error: {0}")]
    Config(String),

    #[error("Catalog Error: {0}")]
    Catalog(#[from] serde_json::Error),
}

impl GenerationError {
    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: io::Error) -> Self {
        GenerationError::Filesystem {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, GenerationError>;
