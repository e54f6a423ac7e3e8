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

//! Provides [ManualSender], which builds the base chain operation step by step through the
//! Tezos node RPC.
use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;

use crate::inbox::{InboxSender, OperationHash};
use crate::interface::*;
use crate::signer::Signer;
use crate::transport::{get_json, post_json, HttpTransport, Transport};

/// Gas limit of the simulated operation.
const SIMULATION_GAS_LIMIT: u64 = 100_000;

/// Storage limit of the injected operation.
const ADD_MESSAGES_STORAGE_LIMIT: u64 = 100;

/// Watermark of signed manager operations.
const OPERATION_WATERMARK: &str = "03";

const OPERATION_KIND: &str = "smart_rollup_add_messages";

/// [InboxSender] that simulates, forges, signs and injects a `smart_rollup_add_messages`
/// operation itself.
///
/// The estimated gas is used for both the fee and the gas limit. This always pays enough but is
/// not the minimal fee.
pub struct ManualSender<T = HttpTransport> {
    transport: T,
    tezos_url: String,
    signer: Arc<dyn Signer>,
}

impl ManualSender<HttpTransport> {
    pub fn create(tezos_url: &str, signer: Arc<dyn Signer>) -> Result<Self, Error> {
        Ok(ManualSender::new(HttpTransport::new()?, tezos_url, signer))
    }
}

#[derive(Deserialize)]
struct SimulationResult {
    contents: Vec<SimulatedContent>,
}

#[derive(Deserialize)]
struct SimulatedContent {
    metadata: SimulatedMetadata,
}

#[derive(Deserialize)]
struct SimulatedMetadata {
    operation_result: OperationResult,
}

#[derive(Deserialize)]
struct OperationResult {
    consumed_milligas: String,
}

impl<T: Transport> ManualSender<T> {
    pub fn new(transport: T, tezos_url: &str, signer: Arc<dyn Signer>) -> Self {
        ManualSender {
            transport,
            tezos_url: tezos_url.trim_end_matches('/').to_string(),
            signer,
        }
    }

    async fn next_counter(&self, source: &PublicKeyHash) -> Result<u64, Error> {
        let url = format!(
            "{}/chains/main/blocks/head/context/contracts/{}/counter",
            self.tezos_url, source
        );
        let counter: String = get_json(&self.transport, &url).await?;
        let counter: u64 = counter
            .parse()
            .map_err(|_| Error::InvalidResponse(format!("invalid counter '{}'", counter)))?;
        Ok(counter + 1)
    }

    async fn branch(&self) -> Result<String, Error> {
        let url = format!("{}/chains/main/blocks/head~2/hash", self.tezos_url);
        get_json(&self.transport, &url).await
    }

    async fn chain_id(&self) -> Result<String, Error> {
        let url = format!("{}/chains/main/chain_id", self.tezos_url);
        get_json(&self.transport, &url).await
    }

    /// Simulate the operation and return the gas it consumes, rounded up to whole gas units.
    async fn estimate_gas(
        &self,
        source: &PublicKeyHash,
        counter: u64,
        payload: &str,
    ) -> Result<u64, Error> {
        let branch = self.branch().await?;
        let chain_id = self.chain_id().await?;
        let operation = json!({
            "operation": {
                "branch": branch,
                "contents": [{
                    "kind": OPERATION_KIND,
                    "source": source.as_str(),
                    "fee": "0",
                    "counter": counter.to_string(),
                    "gas_limit": SIMULATION_GAS_LIMIT.to_string(),
                    "storage_limit": "0",
                    "message": [payload],
                }],
            },
            "chain_id": chain_id,
        });
        let url = format!(
            "{}/chains/main/blocks/head/helpers/scripts/simulate_operation",
            self.tezos_url
        );
        let result: SimulationResult = post_json(&self.transport, &url, &operation).await?;
        let content = result
            .contents
            .first()
            .ok_or_else(|| Error::InvalidResponse("simulation has no contents".to_string()))?;
        let milligas = &content.metadata.operation_result.consumed_milligas;
        let milligas: u64 = milligas.parse().map_err(|_| {
            Error::InvalidResponse(format!("invalid consumed_milligas '{}'", milligas))
        })?;
        Ok((milligas + 999) / 1000)
    }

    async fn forge(
        &self,
        source: &PublicKeyHash,
        counter: u64,
        gas: u64,
        payload: &str,
    ) -> Result<String, Error> {
        // head~2 may have moved during the simulation.
        let branch = self.branch().await?;
        let operation = json!({
            "branch": branch,
            "contents": [{
                "kind": OPERATION_KIND,
                "source": source.as_str(),
                "fee": gas.to_string(),
                "counter": counter.to_string(),
                "gas_limit": gas.to_string(),
                "storage_limit": ADD_MESSAGES_STORAGE_LIMIT.to_string(),
                "message": [payload],
            }],
        });
        let url = format!(
            "{}/chains/main/blocks/head/helpers/forge/operations",
            self.tezos_url
        );
        post_json(&self.transport, &url, &operation).await
    }

    async fn inject(&self, signed_operation: &str) -> Result<OperationHash, Error> {
        let url = format!("{}/injection/operation?chain=main", self.tezos_url);
        post_json(&self.transport, &url, signed_operation).await
    }
}

#[async_trait::async_trait]
impl<T: Transport> InboxSender for ManualSender<T> {
    async fn send(&self, payload: &str) -> Result<OperationHash, Error> {
        let source = self.signer.public_key_hash().await?;
        let counter = self.next_counter(&source).await?;
        let gas = self.estimate_gas(&source, counter, payload).await?;
        log::debug!(
            "Adding message from {} with counter {} and gas {}",
            source,
            counter,
            gas
        );
        let forged = self.forge(&source, counter, gas, payload).await?;
        let signed = self
            .signer
            .sign(&format!("{}{}", OPERATION_WATERMARK, forged))
            .await?;
        let signed_operation = signed
            .sbytes
            .strip_prefix(OPERATION_WATERMARK)
            .ok_or_else(|| Error::Signer("signed bytes lost the operation watermark".to_string()))?;
        let hash = self.inject(signed_operation).await?;
        log::info!("Injected operation {}", hash);
        Ok(hash)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::signer::InMemorySigner;
    use crate::transport::scripted::ScriptedTransport;

    const TEZOS: &str = "http://tezos";
    const SECRET_KEY: &str = "edsk3a5SDDdMWw3Q5hPiJwDXUosmZMTuKQkriPqY6UqtSfdLifpZbB";
    const ADDRESS: &str = "tz1QFD9WqLWZmmAuqnnTPPUjfauitYEWdshv";

    fn scripted_sender() -> ManualSender<ScriptedTransport> {
        let transport = ScriptedTransport::new();
        transport.respond_get(
            &format!(
                "{}/chains/main/blocks/head/context/contracts/{}/counter",
                TEZOS, ADDRESS
            ),
            200,
            "\"41\"",
        );
        let head_2 = format!("{}/chains/main/blocks/head~2/hash", TEZOS);
        transport.respond_get(&head_2, 200, "\"BLsimulation\"");
        transport.respond_get(&head_2, 200, "\"BLforge\"");
        transport.respond_get(
            &format!("{}/chains/main/chain_id", TEZOS),
            200,
            "\"NetXdQprcVkpaWU\"",
        );
        transport.respond_post(
            &format!(
                "{}/chains/main/blocks/head/helpers/scripts/simulate_operation",
                TEZOS
            ),
            200,
            r#"{"contents":[{"metadata":{"operation_result":{"status":"applied","consumed_milligas":"1253401"}}}]}"#,
        );
        transport.respond_post(
            &format!("{}/chains/main/blocks/head/helpers/forge/operations", TEZOS),
            200,
            "\"abcdef\"",
        );
        transport.respond_post(
            &format!("{}/injection/operation?chain=main", TEZOS),
            200,
            "\"ooOperation\"",
        );
        let signer = InMemorySigner::from_secret_key(SECRET_KEY).unwrap();
        ManualSender::new(transport, TEZOS, Arc::new(signer))
    }

    #[tokio::test]
    async fn send_runs_the_operation_lifecycle() {
        let sender = scripted_sender();
        let hash = sender.send("74aa").await.unwrap();
        assert_eq!(hash, OperationHash("ooOperation".to_string()));

        let simulated = &sender.transport.posted(&format!(
            "{}/chains/main/blocks/head/helpers/scripts/simulate_operation",
            TEZOS
        ))[0];
        assert_eq!(simulated["chain_id"], "NetXdQprcVkpaWU");
        assert_eq!(simulated["operation"]["branch"], "BLsimulation");
        let content = &simulated["operation"]["contents"][0];
        assert_eq!(content["kind"], "smart_rollup_add_messages");
        assert_eq!(content["source"], ADDRESS);
        assert_eq!(content["counter"], "42");
        assert_eq!(content["fee"], "0");
        assert_eq!(content["gas_limit"], "100000");
        assert_eq!(content["message"], json!(["74aa"]));

        let forged = &sender.transport.posted(&format!(
            "{}/chains/main/blocks/head/helpers/forge/operations",
            TEZOS
        ))[0];
        assert_eq!(forged["branch"], "BLforge");
        let content = &forged["contents"][0];
        assert_eq!(content["fee"], "1254");
        assert_eq!(content["gas_limit"], "1254");
        assert_eq!(content["storage_limit"], "100");
    }

    #[tokio::test]
    async fn injects_signed_bytes_without_watermark() {
        let sender = scripted_sender();
        sender.send("74aa").await.unwrap();
        let injected = &sender
            .transport
            .posted(&format!("{}/injection/operation?chain=main", TEZOS))[0];
        let injected = injected.as_str().unwrap();
        // forged bytes followed by a 64 byte signature
        assert!(injected.starts_with("abcdef"));
        assert_eq!(injected.len(), 6 + 128);
    }

    #[tokio::test]
    async fn simulation_failure_stops_the_flow() {
        let transport = ScriptedTransport::new();
        transport.respond_get(
            &format!(
                "{}/chains/main/blocks/head/context/contracts/{}/counter",
                TEZOS, ADDRESS
            ),
            200,
            "\"1\"",
        );
        transport.respond_get(
            &format!("{}/chains/main/blocks/head~2/hash", TEZOS),
            200,
            "\"BL\"",
        );
        transport.respond_get(&format!("{}/chains/main/chain_id", TEZOS), 200, "\"Net\"");
        transport.respond_post(
            &format!(
                "{}/chains/main/blocks/head/helpers/scripts/simulate_operation",
                TEZOS
            ),
            500,
            "[{\"kind\":\"temporary\"}]",
        );
        let signer = InMemorySigner::from_secret_key(SECRET_KEY).unwrap();
        let sender = ManualSender::new(transport, TEZOS, Arc::new(signer));

        let err = sender.send("74aa").await.unwrap_err();
        assert!(matches!(err, Error::Transport { status: 500, .. }));
        assert!(sender
            .transport
            .posted(&format!("{}/injection/operation?chain=main", TEZOS))
            .is_empty());
    }
}
