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

//! Getting started with the client by posting and liking a tweet.
//!
//! To run this example you need a Tezos node and a rollup node running the Tzwitter kernel.
//! Their URLs are read from `TZWITTER_TEZOS_RPC` and `TZWITTER_ROLLUP_RPC`. The account signing
//! the commands is read from `TZWITTER_SECRET_KEY` and needs funds to pay the operation fees.

use std::sync::Arc;

use tzwitter_client::*;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Error> {
    env_logger::init();

    let config = Config::from_env()?;
    let secret_key = std::env::var("TZWITTER_SECRET_KEY")
        .map_err(|_| Error::Config("TZWITTER_SECRET_KEY is not set".to_string()))?;
    let signer = Arc::new(InMemorySigner::from_secret_key(&secret_key)?);

    println!("Connecting to rollup node {}", config.rollup_url);
    let client = Client::create(&config)?;
    println!("Rollup level: {}", client.head_level().await?);

    // The session reads the nonce of the account before every command. Wait for a command to be
    // applied before sending the next one or both will use the same nonce.
    let session = Session::start_layer1(client, signer, &config.tezos_url).await?;
    let nonce = session.client().account_nonce(session.account()).await?;
    println!("Account {} has nonce {}", session.account(), nonce.0);

    let submitted = session.post_tweet("Hello from Rust").await?;
    println!(
        "Tweet submitted with nonce {} in operation {}",
        submitted.nonce.0, submitted.operation_hash
    );

    // Commands are applied once the operation is included and the rollup node processed it.
    let mut applied = false;
    for _ in 0..30 {
        tokio::time::sleep(config.timing.block_time.to_std().unwrap_or_default()).await;
        if session.client().account_nonce(session.account()).await? >= submitted.nonce {
            applied = true;
            break;
        }
    }
    if !applied {
        println!("Tweet not applied yet, giving up");
        return Ok(());
    }

    let written = Feed::of_account(FeedKind::Written, session.account().clone());
    let ids = session.client().list_tweet_ids(&written).await?;
    if let Some(id) = ids.first() {
        let tweet = session.client().get_tweet(*id).await?;
        println!("Tweet {}: {} ({} likes)", tweet.id, tweet.content, tweet.likes);
        session.like_tweet(tweet.id).await?;
        println!("Liked tweet {}", tweet.id);
    }

    session.end();
    Ok(())
}
