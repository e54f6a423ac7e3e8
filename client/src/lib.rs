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

//! Client library to interact with the Tzwitter smart rollup.
//!
//! The [Client] reads the rollup durable state through a [StateReader]. It implements [ClientT].
//! Commands are signed and submitted through a [Session].
//!
//! # Backends
//!
//! [Client::create] reads the state from a rollup node with [RollupNode]. For testing,
//! [Client::new_emulator] returns a client backed by an [Emulator] that runs the rollup in memory.
//! The emulator is also an [InboxSender] so that sessions can submit commands to it.
//!
//! # Example
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use tzwitter_client::*;
//! # async fn example() -> Result<(), Error> {
//! let config = Config::from_env()?;
//! let client = Client::create(&config)?;
//! let signer = Arc::new(InMemorySigner::generate());
//! let session = Session::start_layer1(client, signer, &config.tezos_url).await?;
//! session.post_tweet("Hello world").await?;
//! let tweets = session.client().list_tweets(&Feed::all()).await?;
//! # Ok(())
//! # }
//! ```
use std::sync::Arc;

use chrono::Utc;
use futures::future;

mod backend;
mod config;
mod error;
mod feed;
mod inbox;
mod interface;
mod session;
mod signer;
mod transaction;
mod transport;
mod tweet;

pub use backend::{BlockId, Emulator, RollupNode, StateReader};
pub use config::*;
pub use feed::{resolve, FeedWatcher, Snapshot};
pub use inbox::{DelegatedSender, InboxSender, ManualSender, RollupToolkit};
pub use interface::*;
pub use session::{Session, Submitted};
pub use signer::{InMemorySigner, SignedBytes, Signer};
pub use transport::{get_json, post_json, HttpResponse, HttpTransport, Transport};

/// Client to read the Tzwitter rollup state.
///
/// Cloning a client is cheap. Clones share the state reader.
#[derive(Clone)]
pub struct Client {
    reader: Arc<dyn StateReader>,
    timing: ProtocolTiming,
    magic_byte: u8,
    viewer: Option<PublicKeyHash>,
}

impl Client {
    pub fn new(reader: Arc<dyn StateReader>, timing: ProtocolTiming, magic_byte: u8) -> Self {
        Client {
            reader,
            timing,
            magic_byte,
            viewer: None,
        }
    }

    /// Create a client reading from the rollup node of `config`.
    pub fn create(config: &Config) -> Result<Self, Error> {
        let node = RollupNode::create(&config.rollup_url, &config.durable_backend)?;
        Ok(Client::new(Arc::new(node), config.timing, config.magic_byte))
    }

    /// Create a client backed by a new in memory [Emulator].
    pub fn new_emulator() -> (Self, Emulator) {
        let emulator = Emulator::new();
        let client = Client::new(
            Arc::new(emulator.clone()),
            ProtocolTiming::default(),
            MAGIC_BYTE,
        );
        (client, emulator)
    }

    /// Read tweets as seen by `viewer`, which determines [Tweet::is_liked].
    pub fn with_viewer(self, viewer: Option<PublicKeyHash>) -> Self {
        Client { viewer, ..self }
    }

    pub fn viewer(&self) -> Option<&PublicKeyHash> {
        self.viewer.as_ref()
    }

    pub fn timing(&self) -> &ProtocolTiming {
        &self.timing
    }

    pub fn magic_byte(&self) -> u8 {
        self.magic_byte
    }

    /// Start refreshing `feed` every `period`, see [FeedWatcher].
    pub fn watch_feed(&self, feed: Feed, period: std::time::Duration) -> Result<FeedWatcher, Error> {
        FeedWatcher::spawn(self.clone(), feed, period)
    }
}

#[async_trait::async_trait]
impl ClientT for Client {
    async fn account_nonce(&self, account: &PublicKeyHash) -> Result<Nonce, Error> {
        match self.reader.value(&paths::account_nonce(account)).await {
            Ok(stored) => Ok(Nonce::from_state(stored.map(hex::encode).as_deref())?),
            Err(err) if err.is_not_found() => {
                log::debug!("No nonce stored for {}", account);
                Ok(Nonce::default())
            }
            Err(err) => Err(err),
        }
    }

    async fn get_tweet(&self, id: TweetId) -> Result<Tweet, Error> {
        tweet::aggregate(
            self.reader.as_ref(),
            id,
            self.viewer.as_ref(),
            &self.timing,
            Utc::now(),
        )
        .await
    }

    async fn list_tweet_ids(&self, feed: &Feed) -> Result<Vec<TweetId>, Error> {
        feed::resolve(self.reader.as_ref(), feed).await
    }

    async fn list_tweets(&self, feed: &Feed) -> Result<Vec<Tweet>, Error> {
        let ids = self.list_tweet_ids(feed).await?;
        let now = Utc::now();
        future::try_join_all(ids.into_iter().map(|id| {
            tweet::aggregate(
                self.reader.as_ref(),
                id,
                self.viewer.as_ref(),
                &self.timing,
                now,
            )
        }))
        .await
    }

    async fn head_level(&self) -> Result<Level, Error> {
        self.reader.level(&BlockId::Head).await
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::transport::scripted::ScriptedTransport;

    fn node_client(transport: ScriptedTransport) -> Client {
        let node = RollupNode::new(transport, "http://rollup", "wasm_2_0_0");
        Client::new(Arc::new(node), ProtocolTiming::default(), MAGIC_BYTE)
    }

    const NONCE_URL: &str = "http://rollup/global/block/head/durable/wasm_2_0_0/value?key=/accounts/tz1QFD9WqLWZmmAuqnnTPPUjfauitYEWdshv/nonce";

    fn account() -> PublicKeyHash {
        "tz1QFD9WqLWZmmAuqnnTPPUjfauitYEWdshv".parse().unwrap()
    }

    #[tokio::test]
    async fn nonce_of_new_account() {
        let transport = ScriptedTransport::new();
        transport.respond_get(NONCE_URL, 200, "null");
        let nonce = node_client(transport).account_nonce(&account()).await.unwrap();
        assert_eq!(nonce, Nonce(0));
        assert_eq!(nonce.next().unwrap().to_string(), "00000001");
    }

    #[tokio::test]
    async fn nonce_not_found_is_zero() {
        let nonce = node_client(ScriptedTransport::new())
            .account_nonce(&account())
            .await
            .unwrap();
        assert_eq!(nonce, Nonce(0));
    }

    #[tokio::test]
    async fn stored_nonce() {
        let transport = ScriptedTransport::new();
        transport.respond_get(NONCE_URL, 200, "\"000000000000000a\"");
        let nonce = node_client(transport).account_nonce(&account()).await.unwrap();
        assert_eq!(nonce.next().unwrap().to_string(), "0000000b");
    }

    #[tokio::test]
    async fn nonce_server_error_propagates() {
        let transport = ScriptedTransport::new();
        transport.respond_get(NONCE_URL, 503, "");
        let err = node_client(transport)
            .account_nonce(&account())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport { status: 503, .. }));
    }
}
