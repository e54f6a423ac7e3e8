// Tzwitter Client
// Copyright (C) 2023 Tzwitter contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License version 3 as
// published by the Free Software Foundation.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use tzwitter_core::{DecodeError, KeyError};

/// Error that may be returned by any of the [crate::ClientT] and [crate::Session] methods
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A node answered with a non-success status
    #[error("{method} {url} returned status {status}")]
    Transport {
        method: &'static str,
        url: String,
        status: u16,
        body: Option<String>,
    },

    /// The HTTP request could not be performed
    #[error("HTTP request to {url} failed")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// A node answered with a body that is not the expected JSON
    #[error("Malformed JSON response from {url}")]
    Json {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// Decoding state or payload bytes failed
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Invalid key, address or signature
    #[error(transparent)]
    Key(#[from] KeyError),

    /// The signer could not sign or describe its key
    #[error("Signer failed: {0}")]
    Signer(String),

    /// A node answered with well-formed JSON that does not have the expected content
    #[error("Unexpected response: {0}")]
    InvalidResponse(String),

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Other error
    #[error("Other error: {0}")]
    Other(String),
}

impl Error {
    /// Returns `true` if a node answered `404 Not Found`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Transport { status: 404, .. })
    }
}

impl From<String> for Error {
    fn from(error: String) -> Self {
        Error::Other(error)
    }
}

impl From<&str> for Error {
    fn from(error: &str) -> Self {
        Error::Other(error.into())
    }
}
