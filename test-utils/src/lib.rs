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

//! Miscellaneous helpers used throughout Tzwitter tests.
use std::sync::Arc;

use rand::distributions::Alphanumeric;
use rand::Rng;

use tzwitter_client::*;

/// A session of a fresh random account on a shared emulator.
pub async fn random_session(client: &Client, emulator: &Emulator) -> Session {
    Session::start(
        client.clone(),
        Arc::new(InMemorySigner::generate()),
        Arc::new(emulator.clone()),
    )
    .await
    .unwrap()
}

/// Submit a command and check that the emulator accepted it by consuming its nonce.
///
/// Panics if submission errors or the command is rejected.
pub async fn submit_ok(session: &Session, command: Command) -> Submitted {
    let submitted = session.submit_command(command).await.unwrap();
    let stored = session
        .client()
        .account_nonce(session.account())
        .await
        .unwrap();
    assert_eq!(
        stored, submitted.nonce,
        "Command with nonce {} was rejected",
        submitted.nonce
    );
    submitted
}

/// Post a tweet with random content and return its id.
///
/// Panics if the tweet cannot be found afterwards.
pub async fn post_random_tweet(session: &Session) -> TweetId {
    let content = random_alnum_string(24);
    submit_ok(
        session,
        Command::PostTweet {
            author: session.account().clone(),
            content: content.clone(),
        },
    )
    .await;
    let written = Feed::of_account(FeedKind::Written, session.account().clone());
    let client = session.client();
    for id in client.list_tweet_ids(&written).await.unwrap() {
        if client.get_tweet(id).await.unwrap().content == content {
            return id;
        }
    }
    panic!("Posted tweet not found in the written feed");
}

pub fn random_alnum_string(size: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(size)
        .map(char::from)
        .collect::<String>()
}

/// Address of a random account that never submitted anything.
pub fn random_address() -> PublicKeyHash {
    InMemorySigner::generate().address()
}
