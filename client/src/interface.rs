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

//! Provide an abstract trait for reading the rollup state and the necessary types.
//!
//! The [ClientT] trait defines the queries a front end needs: account nonces, single tweets and
//! feeds. Writes go through [crate::Session].
pub use tzwitter_core::state::{estimate_mintable_date, paths};
pub use tzwitter_core::*;

pub use crate::error::Error;
pub use crate::feed::{Feed, FeedKind};
pub use crate::inbox::OperationHash;
pub use crate::transaction::Transaction;

/// Trait for clients that read the rollup durable state.
#[async_trait::async_trait]
pub trait ClientT {
    /// Fetch the nonce of the last command accepted from `account`.
    ///
    /// Accounts that never submitted a command have nonce `0`. The next command of the account
    /// must use [Nonce::next].
    async fn account_nonce(&self, account: &PublicKeyHash) -> Result<Nonce, Error>;

    /// Assemble the tweet `id` from the rollup state.
    ///
    /// Missing fields are tolerated since the state of a tweet may be partially written. A
    /// missing author or content is empty and missing likes are `0`.
    async fn get_tweet(&self, id: TweetId) -> Result<Tweet, Error>;

    /// Ids of the tweets in `feed`, newest first.
    async fn list_tweet_ids(&self, feed: &Feed) -> Result<Vec<TweetId>, Error>;

    /// Tweets in `feed`, newest first.
    async fn list_tweets(&self, feed: &Feed) -> Result<Vec<Tweet>, Error>;

    /// Current level of the rollup node.
    async fn head_level(&self) -> Result<Level, Error>;
}
