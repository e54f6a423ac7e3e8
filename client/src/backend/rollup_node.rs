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

//! Provides [RollupNode], the [StateReader] backed by the smart rollup node RPC.
use crate::backend::{BlockId, StateReader};
use crate::interface::*;
use crate::transport::{get_json, HttpTransport, Transport};

/// Reads the durable state through the rollup node RPC.
///
/// Every read queries the `head` block. Nothing is cached.
pub struct RollupNode<T = HttpTransport> {
    transport: T,
    base_url: String,
    durable_backend: String,
}

impl RollupNode<HttpTransport> {
    pub fn create(base_url: &str, durable_backend: &str) -> Result<Self, Error> {
        Ok(RollupNode::new(
            HttpTransport::new()?,
            base_url,
            durable_backend,
        ))
    }
}

impl<T: Transport> RollupNode<T> {
    pub fn new(transport: T, base_url: &str, durable_backend: &str) -> Self {
        RollupNode {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            durable_backend: durable_backend.to_string(),
        }
    }

    fn durable_url(&self, query: &str, path: &str) -> String {
        format!(
            "{}/global/block/head/durable/{}/{}?key={}",
            self.base_url, self.durable_backend, query, path
        )
    }
}

#[async_trait::async_trait]
impl<T: Transport> StateReader for RollupNode<T> {
    async fn value(&self, path: &str) -> Result<Option<Vec<u8>>, Error> {
        let url = self.durable_url("value", path);
        let value: Option<String> = get_json(&self.transport, &url).await?;
        match value {
            Some(hex_value) => Ok(Some(hex::decode(&hex_value).map_err(DecodeError::from)?)),
            None => Ok(None),
        }
    }

    async fn subkeys(&self, path: &str) -> Result<Vec<String>, Error> {
        let url = self.durable_url("subkeys", path);
        let subkeys: Option<Vec<String>> = get_json(&self.transport, &url).await?;
        Ok(subkeys.unwrap_or_default())
    }

    async fn level(&self, block: &BlockId) -> Result<Level, Error> {
        let url = format!("{}/global/block/{}/level", self.base_url, block);
        get_json(&self.transport, &url).await
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::transport::scripted::ScriptedTransport;

    const BASE: &str = "http://rollup";

    fn node() -> RollupNode<ScriptedTransport> {
        RollupNode::new(ScriptedTransport::new(), "http://rollup/", "wasm_2_0_0")
    }

    #[tokio::test]
    async fn value_decodes_hex() {
        let node = node();
        node.transport.respond_get(
            &format!("{}/global/block/head/durable/wasm_2_0_0/value?key=/tweets/1/likes", BASE),
            200,
            "\"0000000000000003\"",
        );
        let value = node.value("/tweets/1/likes").await.unwrap();
        assert_eq!(value, Some(vec![0, 0, 0, 0, 0, 0, 0, 3]));
    }

    #[tokio::test]
    async fn null_value_is_absent() {
        let node = node();
        node.transport.respond_get(
            &format!("{}/global/block/head/durable/wasm_2_0_0/value?key=/tweets/9/author", BASE),
            200,
            "null",
        );
        assert_eq!(node.value("/tweets/9/author").await.unwrap(), None);
    }

    #[tokio::test]
    async fn subkeys_and_level() {
        let node = node();
        node.transport.respond_get(
            &format!("{}/global/block/head/durable/wasm_2_0_0/subkeys?key=/tweets", BASE),
            200,
            "[\"0\",\"1\"]",
        );
        node.transport
            .respond_get(&format!("{}/global/block/BLx/level", BASE), 200, "1204");
        assert_eq!(node.subkeys("/tweets").await.unwrap(), vec!["0", "1"]);
        assert_eq!(
            node.level(&BlockId::Hash("BLx".to_string())).await.unwrap(),
            1204
        );
    }

    #[tokio::test]
    async fn errors_propagate() {
        let node = node();
        let err = node.level(&BlockId::Head).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
