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

//! Strategies for getting a payload into the shared rollup inbox.
//!
//! [ManualSender] builds, signs and injects the base chain operation itself. [DelegatedSender]
//! hands the payload to a [RollupToolkit] that does all of that.
use serde::{Deserialize, Serialize};

use crate::interface::*;

mod delegated;
mod manual;

pub use delegated::{DelegatedSender, RollupToolkit};
pub use manual::ManualSender;

/// Hash of the base chain operation carrying a message. Base58 encoded with the `o` prefix.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct OperationHash(pub String);

impl std::fmt::Display for OperationHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Submits opaque hex payloads to the rollup inbox.
///
/// A successful [InboxSender::send] only means the operation was injected. Whether the kernel
/// accepts the command can only be observed in the rollup state later.
#[async_trait::async_trait]
pub trait InboxSender: Send + Sync {
    async fn send(&self, payload: &str) -> Result<OperationHash, Error>;
}
