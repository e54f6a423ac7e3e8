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

//! Provides [Session], the write side of the client.
use std::sync::Arc;

use crate::inbox::{InboxSender, ManualSender};
use crate::interface::*;
use crate::signer::Signer;
use crate::Client;

/// Result of submitting a command.
///
/// The command is in the inbox but may still be rejected by the kernel, for example if another
/// command of the same account took its nonce.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Submitted {
    pub operation_hash: OperationHash,
    pub nonce: Nonce,
    /// Hex encoded inbox message.
    pub payload: String,
}

/// Signs commands for one account and submits them to the rollup inbox.
///
/// Every command reads the stored nonce of the account and uses its successor. Commands are not
/// queued: submitting a second command before the first one is applied reuses the same nonce
/// and one of them is rejected by the kernel.
pub struct Session {
    client: Client,
    signer: Arc<dyn Signer>,
    sender: Arc<dyn InboxSender>,
    account: PublicKeyHash,
}

impl Session {
    /// Start a session for the account of `signer`.
    pub async fn start(
        client: Client,
        signer: Arc<dyn Signer>,
        sender: Arc<dyn InboxSender>,
    ) -> Result<Self, Error> {
        let account = signer.public_key_hash().await?;
        log::debug!("Starting session for {}", account);
        Ok(Session {
            client: client.with_viewer(Some(account.clone())),
            signer,
            sender,
            account,
        })
    }

    /// Start a session that injects its commands through the Tezos node at `tezos_url`.
    pub async fn start_layer1(
        client: Client,
        signer: Arc<dyn Signer>,
        tezos_url: &str,
    ) -> Result<Self, Error> {
        let sender = ManualSender::create(tezos_url, signer.clone())?;
        Session::start(client, signer, Arc::new(sender)).await
    }

    pub fn account(&self) -> &PublicKeyHash {
        &self.account
    }

    /// Client reading the state as seen by the session account.
    pub fn client(&self) -> &Client {
        &self.client
    }

    pub async fn post_tweet(&self, content: &str) -> Result<Submitted, Error> {
        self.submit_command(Command::PostTweet {
            author: self.account.clone(),
            content: content.to_string(),
        })
        .await
    }

    pub async fn like_tweet(&self, id: TweetId) -> Result<Submitted, Error> {
        self.submit_command(Command::LikeTweet(id)).await
    }

    pub async fn transfer_tweet(
        &self,
        id: TweetId,
        destination: PublicKeyHash,
    ) -> Result<Submitted, Error> {
        self.submit_command(Command::Transfer {
            destination,
            tweet_id: id,
        })
        .await
    }

    pub async fn collect_tweet(&self, id: TweetId) -> Result<Submitted, Error> {
        self.submit_command(Command::Collect(id)).await
    }

    /// Sign `command` with the next nonce of the account and send it to the inbox.
    pub async fn submit_command(&self, command: Command) -> Result<Submitted, Error> {
        let nonce = self.client.account_nonce(&self.account).await?.next()?;
        let transaction = Transaction::new_signed(
            self.signer.as_ref(),
            command,
            nonce,
            self.client.magic_byte(),
        )
        .await?;
        let operation_hash = self.sender.send(transaction.payload()).await?;
        log::info!(
            "Submitted command with nonce {} of {} in {}",
            nonce.0,
            self.account,
            operation_hash
        );
        Ok(Submitted {
            operation_hash,
            nonce,
            payload: transaction.payload().to_string(),
        })
    }

    /// End the session and return its client.
    pub fn end(self) -> Client {
        log::debug!("Ending session for {}", self.account);
        self.client
    }
}
