// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::RecordId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Person '{0}' not found")]
    UnknownPerson(String),

    #[error("Service '{0}' not found")]
    UnknownService(String),

    #[error("No {kind} record with id {id}")]
    RecordNotFound { kind: &'static str, id: RecordId },

    #[error("{what} '{key}' already exists")]
    Duplicate { what: &'static str, key: String },

    #[error("Document '{key}' is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error on '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not serialize '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn io(key: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            key: key.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
