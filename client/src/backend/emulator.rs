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

//! Provides [Emulator] to run the rollup state in memory.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use thiserror::Error as ThisError;

use tzwitter_core::crypto::{self, BLOCK_HASH, OPERATION_HASH};
use tzwitter_core::state::paths;

use crate::backend::{BlockId, StateReader};
use crate::inbox::{InboxSender, OperationHash};
use crate::interface::*;

/// Holds the counter used to allocate tweet ids.
const TWEET_COUNTER_PATH: &str = "/constants/tweet-counter";

/// Value of presence flags.
const FLAG: [u8; 1] = [0x00];

/// [StateReader] and [InboxSender] implementation that applies commands to an in memory durable
/// state, the way the rollup kernel does.
///
/// # Differences with a real rollup
///
/// * Every [InboxSender::send] call creates a new level that only contains the sent message.
///   The state is updated before `send` returns.
///
/// * Levels can be created without messages with [Emulator::bake].
///
/// * Block hashes are derived from the level.
#[derive(Clone)]
pub struct Emulator {
    magic_byte: u8,
    state: Arc<Mutex<EmulatorState>>,
}

/// Mutable state of the emulator.
#[derive(Default)]
struct EmulatorState {
    storage: BTreeMap<String, Vec<u8>>,
    level: Level,
    block_levels: HashMap<String, Level>,
    inbox: Vec<String>,
}

/// Reason a message does not change the state.
#[derive(Debug, ThisError, PartialEq)]
enum Rejection {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Key(#[from] KeyError),
    #[error("expected nonce {expected}, got {actual}")]
    Nonce { expected: Nonce, actual: Nonce },
    #[error("tweets can only be posted by their author")]
    NotAuthor,
    #[error("tweet {0} does not exist")]
    UnknownTweet(TweetId),
    #[error("account does not own tweet {0}")]
    NotOwner(TweetId),
    #[error("tweet {0} has already been collected")]
    AlreadyCollected(TweetId),
}

impl Emulator {
    pub fn new() -> Self {
        Emulator::with_magic_byte(MAGIC_BYTE)
    }

    /// Create an emulator that only accepts messages tagged with `magic_byte`.
    pub fn with_magic_byte(magic_byte: u8) -> Self {
        let mut state = EmulatorState::default();
        state.record_block();
        Emulator {
            magic_byte,
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Create `count` levels without messages.
    pub fn bake(&self, count: u64) {
        let mut state = self.lock();
        for _ in 0..count {
            state.level += 1;
            state.record_block();
        }
    }

    /// Current level.
    pub fn head(&self) -> Level {
        self.lock().level
    }

    /// Hash of the block at `level`.
    pub fn block_hash(&self, level: Level) -> String {
        block_hash(level)
    }

    /// Write a raw value to the durable state.
    pub fn insert_value(&self, path: &str, value: Vec<u8>) {
        self.lock().storage.insert(path.to_string(), value);
    }

    /// Payloads received so far, including rejected ones.
    pub fn inbox(&self) -> Vec<String> {
        self.lock().inbox.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, EmulatorState> {
        // A panic while holding the lock can only happen in a test that already failed.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for Emulator {
    fn default() -> Self {
        Emulator::new()
    }
}

fn block_hash(level: Level) -> String {
    crypto::b58_encode(BLOCK_HASH, &crypto::blake2b_256(&level.to_be_bytes()))
}

impl EmulatorState {
    fn record_block(&mut self) {
        self.block_levels.insert(block_hash(self.level), self.level);
    }

    fn read_u64(&self, path: &str) -> Result<Option<u64>, DecodeError> {
        self.storage
            .get(path)
            .map(|bytes| encoding::u64_from_be_bytes(bytes))
            .transpose()
    }

    fn write_u64(&mut self, path: String, value: u64) {
        self.storage.insert(path, value.to_be_bytes().to_vec());
    }

    fn set_flag(&mut self, path: String) {
        self.storage.insert(path, FLAG.to_vec());
    }

    fn exists(&self, path: &str) -> bool {
        self.storage.contains_key(path)
    }

    fn subkeys(&self, path: &str) -> Vec<String> {
        let prefix = format!("{}/", path.trim_end_matches('/'));
        let keys: BTreeSet<String> = self
            .storage
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .filter_map(|(key, _)| key[prefix.len()..].split('/').next())
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .collect();
        keys.into_iter().collect()
    }

    /// Authenticate the message, consume its nonce and apply its command.
    fn apply(&mut self, magic_byte: u8, payload: &str) -> Result<(), Rejection> {
        let envelope = Envelope::from_payload(magic_byte, payload)?;
        let public_key = envelope.public_key().to_string();
        crypto::verify(&public_key, &envelope.inner.digest(), envelope.signature())?;
        let account = PublicKeyHash::from_public_key(&public_key)?;

        let nonce_path = paths::account_nonce(&account);
        let stored = Nonce(self.read_u64(&nonce_path)?.unwrap_or_default());
        let nonce = envelope.inner.nonce;
        let expected = stored.next()?;
        if nonce != expected {
            return Err(Rejection::Nonce {
                expected,
                actual: nonce,
            });
        }
        self.write_u64(nonce_path, nonce.0);

        match envelope.inner.command {
            Command::PostTweet { author, content } => self.post_tweet(&account, author, content),
            Command::LikeTweet(id) => self.like_tweet(&account, id),
            Command::Transfer {
                destination,
                tweet_id,
            } => self.transfer(&account, &destination, tweet_id),
            Command::Collect(id) => self.collect(&account, id),
        }
    }

    fn post_tweet(
        &mut self,
        account: &PublicKeyHash,
        author: PublicKeyHash,
        content: String,
    ) -> Result<(), Rejection> {
        if *account != author {
            return Err(Rejection::NotAuthor);
        }
        let id = self.read_u64(TWEET_COUNTER_PATH)?.unwrap_or_default();
        self.write_u64(TWEET_COUNTER_PATH.to_string(), id + 1);
        self.storage
            .insert(paths::tweet_author(id), author.as_str().as_bytes().to_vec());
        self.storage
            .insert(paths::tweet_content(id), content.into_bytes());
        self.write_u64(paths::tweet_likes(id), 0);
        self.set_flag(format!("{}/{}", paths::account_written(account), id));
        self.set_flag(format!("{}/{}", paths::account_owned(account), id));
        log::debug!("{} posted tweet {}", account, id);
        Ok(())
    }

    fn like_tweet(&mut self, account: &PublicKeyHash, id: TweetId) -> Result<(), Rejection> {
        let likes_path = paths::tweet_likes(id);
        let likes = self
            .read_u64(&likes_path)?
            .ok_or(Rejection::UnknownTweet(id))?;
        let like_path = paths::account_like(account, id);
        if self.exists(&like_path) {
            return Ok(());
        }
        self.set_flag(like_path);
        self.write_u64(likes_path, likes + 1);
        Ok(())
    }

    fn transfer(
        &mut self,
        account: &PublicKeyHash,
        destination: &PublicKeyHash,
        id: TweetId,
    ) -> Result<(), Rejection> {
        let from = format!("{}/{}", paths::account_owned(account), id);
        let flag = self.storage.remove(&from).ok_or(Rejection::NotOwner(id))?;
        self.storage
            .insert(format!("{}/{}", paths::account_owned(destination), id), flag);
        Ok(())
    }

    fn collect(&mut self, account: &PublicKeyHash, id: TweetId) -> Result<(), Rejection> {
        if !self.exists(&format!("{}/{}", paths::account_owned(account), id)) {
            return Err(Rejection::NotOwner(id));
        }
        let collected_path = paths::tweet_collected(id);
        if self.exists(&collected_path) {
            return Err(Rejection::AlreadyCollected(id));
        }
        // The kernel only knows the hash of the previous block.
        let previous_block = block_hash(self.level.saturating_sub(1));
        self.storage
            .insert(collected_path, previous_block.into_bytes());
        self.set_flag(format!("{}/{}", paths::account_collecting(account), id));
        Ok(())
    }
}

#[async_trait::async_trait]
impl StateReader for Emulator {
    async fn value(&self, path: &str) -> Result<Option<Vec<u8>>, Error> {
        Ok(self.lock().storage.get(path).cloned())
    }

    async fn subkeys(&self, path: &str) -> Result<Vec<String>, Error> {
        Ok(self.lock().subkeys(path))
    }

    async fn level(&self, block: &BlockId) -> Result<Level, Error> {
        let state = self.lock();
        match block {
            BlockId::Head => Ok(state.level),
            BlockId::Hash(hash) => {
                state
                    .block_levels
                    .get(hash)
                    .copied()
                    .ok_or_else(|| Error::Transport {
                        method: "GET",
                        url: format!("emulator/global/block/{}/level", hash),
                        status: 404,
                        body: None,
                    })
            }
        }
    }
}

#[async_trait::async_trait]
impl InboxSender for Emulator {
    async fn send(&self, payload: &str) -> Result<OperationHash, Error> {
        let bytes = hex::decode(payload).map_err(DecodeError::from)?;
        let hash = OperationHash(crypto::b58_encode(
            OPERATION_HASH,
            &crypto::blake2b_256(&bytes),
        ));
        let mut state = self.lock();
        state.inbox.push(payload.to_string());
        state.level += 1;
        state.record_block();
        if let Err(rejection) = state.apply(self.magic_byte, payload) {
            log::warn!("Message {} rejected: {}", hash, rejection);
        }
        Ok(hash)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::signer::InMemorySigner;
    use crate::transaction::Transaction;

    async fn send(emulator: &Emulator, signer: &InMemorySigner, nonce: u64, command: Command) {
        let tx = Transaction::new_signed(signer, command, Nonce(nonce), MAGIC_BYTE)
            .await
            .unwrap();
        emulator.send(tx.payload()).await.unwrap();
    }

    fn post(signer: &InMemorySigner, content: &str) -> Command {
        Command::PostTweet {
            author: signer.address(),
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn post_tweet_writes_kernel_layout() {
        let emulator = Emulator::new();
        let alice = InMemorySigner::generate();
        send(&emulator, &alice, 1, post(&alice, "hello")).await;
        send(&emulator, &alice, 2, post(&alice, "world")).await;

        let author = emulator.value("/tweets/1/author").await.unwrap().unwrap();
        assert_eq!(author, alice.address().as_str().as_bytes());
        assert_eq!(
            emulator.value("/tweets/1/content").await.unwrap(),
            Some(b"world".to_vec())
        );
        assert_eq!(
            emulator.value("/tweets/0/likes").await.unwrap(),
            Some(vec![0; 8])
        );
        assert_eq!(
            emulator
                .subkeys(&paths::account_written(&alice.address()))
                .await
                .unwrap(),
            vec!["0", "1"]
        );
        assert_eq!(
            emulator
                .value(&paths::account_nonce(&alice.address()))
                .await
                .unwrap(),
            Some(2u64.to_be_bytes().to_vec())
        );
        assert_eq!(emulator.head(), 2);
    }

    #[tokio::test]
    async fn rejects_replayed_nonce() {
        let emulator = Emulator::new();
        let alice = InMemorySigner::generate();
        send(&emulator, &alice, 1, post(&alice, "first")).await;
        send(&emulator, &alice, 1, post(&alice, "replay")).await;
        assert_eq!(emulator.subkeys("/tweets").await.unwrap(), vec!["0"]);
        assert_eq!(emulator.inbox().len(), 2);
    }

    #[tokio::test]
    async fn rejects_tweet_for_another_author() {
        let emulator = Emulator::new();
        let alice = InMemorySigner::generate();
        let bob = InMemorySigner::generate();
        send(&emulator, &alice, 1, post(&bob, "not mine")).await;
        assert!(emulator.subkeys("/tweets").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn likes_are_counted_once_per_account() {
        let emulator = Emulator::new();
        let alice = InMemorySigner::generate();
        let bob = InMemorySigner::generate();
        send(&emulator, &alice, 1, post(&alice, "like me")).await;
        send(&emulator, &bob, 1, Command::LikeTweet(0)).await;
        send(&emulator, &bob, 2, Command::LikeTweet(0)).await;
        send(&emulator, &alice, 2, Command::LikeTweet(0)).await;
        assert_eq!(
            emulator.value("/tweets/0/likes").await.unwrap(),
            Some(2u64.to_be_bytes().to_vec())
        );
    }

    #[tokio::test]
    async fn transfer_and_collect_require_ownership() {
        let emulator = Emulator::new();
        let alice = InMemorySigner::generate();
        let bob = InMemorySigner::generate();
        send(&emulator, &alice, 1, post(&alice, "gift")).await;
        let transfer = Command::Transfer {
            destination: bob.address(),
            tweet_id: 0,
        };
        send(&emulator, &alice, 2, transfer).await;
        send(&emulator, &alice, 3, Command::Collect(0)).await;
        assert_eq!(emulator.value("/tweets/0/collected_hash").await.unwrap(), None);

        send(&emulator, &bob, 1, Command::Collect(0)).await;
        let collected = emulator
            .value("/tweets/0/collected_hash")
            .await
            .unwrap()
            .unwrap();
        let hash = String::from_utf8(collected).unwrap();
        assert_eq!(hash, emulator.block_hash(emulator.head() - 1));
        assert_eq!(
            emulator.level(&BlockId::Hash(hash)).await.unwrap(),
            emulator.head() - 1
        );
        assert_eq!(
            emulator
                .subkeys(&paths::account_collecting(&bob.address()))
                .await
                .unwrap(),
            vec!["0"]
        );
    }

    #[tokio::test]
    async fn ignores_foreign_magic_byte() {
        let emulator = Emulator::new();
        let alice = InMemorySigner::generate();
        let tx = Transaction::new_signed(&alice, post(&alice, "x"), Nonce(1), 0x01)
            .await
            .unwrap();
        emulator.send(tx.payload()).await.unwrap();
        assert!(emulator.subkeys("/tweets").await.unwrap().is_empty());
        assert_eq!(emulator.head(), 1);
    }

    #[tokio::test]
    async fn unknown_block_hash() {
        let emulator = Emulator::new();
        emulator.bake(3);
        assert_eq!(emulator.level(&BlockId::Head).await.unwrap(), 3);
        let err = emulator
            .level(&BlockId::Hash("BLunknown".to_string()))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
