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

//! Provides [DelegatedSender] for environments with a full Tezos toolkit.
use crate::inbox::{InboxSender, OperationHash};
use crate::interface::*;

/// Client library able to build, estimate, sign and inject a `smart_rollup_add_messages`
/// operation on its own.
#[async_trait::async_trait]
pub trait RollupToolkit: Send + Sync {
    async fn add_messages(&self, messages: Vec<String>) -> Result<OperationHash, Error>;
}

/// [InboxSender] that hands every payload to a [RollupToolkit] as a single message batch.
pub struct DelegatedSender<K> {
    toolkit: K,
}

impl<K: RollupToolkit> DelegatedSender<K> {
    pub fn new(toolkit: K) -> Self {
        DelegatedSender { toolkit }
    }
}

#[async_trait::async_trait]
impl<K: RollupToolkit> InboxSender for DelegatedSender<K> {
    async fn send(&self, payload: &str) -> Result<OperationHash, Error> {
        let hash = self.toolkit.add_messages(vec![payload.to_string()]).await?;
        log::info!("Toolkit injected operation {}", hash);
        Ok(hash)
    }
}
