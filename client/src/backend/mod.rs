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

//! Define the trait for reading the rollup state and provide rollup node and emulator
//! implementations.
use crate::interface::*;

mod emulator;
mod rollup_node;

pub use emulator::Emulator;
pub use rollup_node::RollupNode;

/// Block selector for level queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlockId {
    /// Latest block known to the rollup node.
    Head,
    /// Base chain block hash in base58 form.
    Hash(String),
}

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockId::Head => write!(f, "head"),
            BlockId::Hash(hash) => write!(f, "{}", hash),
        }
    }
}

/// Backend for reading the durable state of the rollup.
///
/// The interface is low-level and agnostic of the kernel. Values are raw bytes.
#[async_trait::async_trait]
pub trait StateReader: Send + Sync {
    /// Fetch the value stored at `path`. Returns `None` if nothing is stored there.
    async fn value(&self, path: &str) -> Result<Option<Vec<u8>>, Error>;

    /// List the immediate children of `path`. Missing paths have no children.
    async fn subkeys(&self, path: &str) -> Result<Vec<String>, Error>;

    /// Level of the given block as seen by the rollup node.
    async fn level(&self, block: &BlockId) -> Result<Level, Error>;
}
