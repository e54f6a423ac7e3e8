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

//! Feeds of tweets and their periodic refresh.
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::backend::StateReader;
use crate::interface::*;
use crate::Client;

/// Index of tweets a feed lists.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FeedKind {
    /// Every tweet of the rollup.
    All,
    /// Tweets owned by the account.
    Owned,
    /// Tweets written by the account, whoever owns them now.
    Written,
    /// Tweets the account is collecting.
    Collecting,
}

impl FromStr for FeedKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(FeedKind::All),
            "owned" => Ok(FeedKind::Owned),
            "written" => Ok(FeedKind::Written),
            "collecting" => Ok(FeedKind::Collecting),
            other => Err(format!(
                "unknown feed '{}', expected all, owned, written or collecting",
                other
            )),
        }
    }
}

impl std::fmt::Display for FeedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FeedKind::All => "all",
            FeedKind::Owned => "owned",
            FeedKind::Written => "written",
            FeedKind::Collecting => "collecting",
        };
        f.write_str(name)
    }
}

/// A [FeedKind] for a given account.
///
/// Without an account every kind lists all tweets.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Feed {
    pub kind: FeedKind,
    pub account: Option<PublicKeyHash>,
}

impl Feed {
    pub fn all() -> Self {
        Feed {
            kind: FeedKind::All,
            account: None,
        }
    }

    pub fn of_account(kind: FeedKind, account: PublicKeyHash) -> Self {
        Feed {
            kind,
            account: Some(account),
        }
    }

    /// State path whose subkeys are the tweet ids of the feed.
    pub fn index_path(&self) -> String {
        match (self.kind, &self.account) {
            (FeedKind::All, _) | (_, None) => paths::tweets(),
            (FeedKind::Owned, Some(account)) => paths::account_owned(account),
            (FeedKind::Written, Some(account)) => paths::account_written(account),
            (FeedKind::Collecting, Some(account)) => paths::account_collecting(account),
        }
    }
}

/// List the tweet ids of `feed`, highest id first.
///
/// Subkeys that are not tweet ids are skipped.
pub async fn resolve(reader: &dyn StateReader, feed: &Feed) -> Result<Vec<TweetId>, Error> {
    let path = feed.index_path();
    let mut ids: Vec<TweetId> = reader
        .subkeys(&path)
        .await?
        .into_iter()
        .filter_map(|key| match key.parse() {
            Ok(id) => Some(id),
            Err(_) => {
                log::warn!("Ignoring subkey '{}' of {}", key, path);
                None
            }
        })
        .collect();
    ids.sort_unstable_by(|a, b| b.cmp(a));
    ids.dedup();
    Ok(ids)
}

/// Tweets of a feed produced by one refresh cycle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// Number of the refresh cycle that produced the snapshot. `0` before the first refresh.
    pub epoch: u64,
    pub tweets: Vec<Tweet>,
}

/// Refreshes a feed periodically and publishes every refresh as a [Snapshot].
///
/// Each refresh runs in its own task. A snapshot is only published if no later refresh
/// published one already, so a slow refresh never overwrites fresher data. Failed refreshes are
/// logged and keep the previous snapshot.
///
/// The refresh timer stops when the watcher is cancelled or dropped. Refreshes in flight at that
/// point still complete but their results are discarded.
pub struct FeedWatcher {
    receiver: watch::Receiver<Snapshot>,
    cancelled: Arc<AtomicBool>,
    ticker: JoinHandle<()>,
}

impl FeedWatcher {
    /// Start refreshing `feed` every `period`. The first refresh starts immediately.
    ///
    /// Must be called within a tokio runtime.
    pub fn spawn(client: Client, feed: Feed, period: Duration) -> Result<Self, Error> {
        if period.is_zero() {
            return Err(Error::Config(
                "feed refresh interval must not be zero".to_string(),
            ));
        }
        let (sender, receiver) = watch::channel(Snapshot::default());
        let sender = Arc::new(sender);
        let cancelled = Arc::new(AtomicBool::new(false));
        let ticker = tokio::spawn(refresh_loop(
            client,
            feed,
            period,
            sender,
            cancelled.clone(),
        ));
        Ok(FeedWatcher {
            receiver,
            cancelled,
            ticker,
        })
    }

    /// Latest published snapshot.
    pub fn latest(&self) -> Snapshot {
        self.receiver.borrow().clone()
    }

    /// Receiver notified on every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.receiver.clone()
    }

    /// Wait for a snapshot newer than the last one seen by this watcher.
    ///
    /// Returns `None` once the watcher is cancelled and no refresh is in flight.
    pub async fn next(&mut self) -> Option<Snapshot> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    /// Stop the refresh timer and discard the results of refreshes in flight.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.ticker.abort();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Drop for FeedWatcher {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn refresh_loop(
    client: Client,
    feed: Feed,
    period: Duration,
    sender: Arc<watch::Sender<Snapshot>>,
    cancelled: Arc<AtomicBool>,
) {
    let mut interval = tokio::time::interval(period);
    let mut epoch = 0u64;
    loop {
        interval.tick().await;
        if cancelled.load(Ordering::SeqCst) {
            break;
        }
        epoch += 1;
        tokio::spawn(refresh(
            client.clone(),
            feed.clone(),
            epoch,
            sender.clone(),
            cancelled.clone(),
        ));
    }
}

async fn refresh(
    client: Client,
    feed: Feed,
    epoch: u64,
    sender: Arc<watch::Sender<Snapshot>>,
    cancelled: Arc<AtomicBool>,
) {
    let tweets = match client.list_tweets(&feed).await {
        Ok(tweets) => tweets,
        Err(err) => {
            log::error!("Refresh {} of the {} feed failed: {}", epoch, feed.kind, err);
            return;
        }
    };
    if cancelled.load(Ordering::SeqCst) {
        log::debug!("Discarding refresh {} of cancelled feed", epoch);
        return;
    }
    let published = sender.send_if_modified(|current| {
        if epoch > current.epoch {
            *current = Snapshot { epoch, tweets };
            true
        } else {
            false
        }
    });
    if !published {
        log::debug!("Discarding out of order refresh {}", epoch);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::backend::{BlockId, Emulator};
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    /// Reader whose first listing waits for [GatedReader::release] and then returns no tweets.
    /// Later listings go straight to the emulator.
    struct GatedReader {
        inner: Emulator,
        listings: AtomicUsize,
        release: Notify,
    }

    impl GatedReader {
        fn new(inner: Emulator) -> Arc<Self> {
            Arc::new(GatedReader {
                inner,
                listings: AtomicUsize::new(0),
                release: Notify::new(),
            })
        }

        fn release(&self) {
            self.release.notify_one();
        }
    }

    #[async_trait::async_trait]
    impl StateReader for GatedReader {
        async fn value(&self, path: &str) -> Result<Option<Vec<u8>>, Error> {
            self.inner.value(path).await
        }

        async fn subkeys(&self, path: &str) -> Result<Vec<String>, Error> {
            if self.listings.fetch_add(1, Ordering::SeqCst) == 0 {
                self.release.notified().await;
                return Ok(vec![]);
            }
            self.inner.subkeys(path).await
        }

        async fn level(&self, block: &BlockId) -> Result<Level, Error> {
            self.inner.level(block).await
        }
    }

    fn gated_client() -> (Client, Arc<GatedReader>) {
        let emulator = Emulator::new();
        emulator.insert_value(&paths::tweet_author(0), account().to_string().into_bytes());
        emulator.insert_value(&paths::tweet_content(0), b"hello".to_vec());
        let reader = GatedReader::new(emulator);
        let client = Client::new(
            reader.clone() as Arc<dyn StateReader>,
            ProtocolTiming::default(),
            MAGIC_BYTE,
        );
        (client, reader)
    }

    fn account() -> PublicKeyHash {
        "tz1QFD9WqLWZmmAuqnnTPPUjfauitYEWdshv".parse().unwrap()
    }

    #[test]
    fn feed_kind_names() {
        for kind in &[
            FeedKind::All,
            FeedKind::Owned,
            FeedKind::Written,
            FeedKind::Collecting,
        ] {
            assert_eq!(kind.to_string().parse::<FeedKind>(), Ok(*kind));
        }
        assert!("liked".parse::<FeedKind>().is_err());
    }

    #[test]
    fn index_paths() {
        assert_eq!(Feed::all().index_path(), "/tweets");
        assert_eq!(
            Feed {
                kind: FeedKind::Owned,
                account: None
            }
            .index_path(),
            "/tweets"
        );
        assert_eq!(
            Feed::of_account(FeedKind::Collecting, account()).index_path(),
            "/accounts/tz1QFD9WqLWZmmAuqnnTPPUjfauitYEWdshv/collecting"
        );
        assert_eq!(
            Feed::of_account(FeedKind::Written, account()).index_path(),
            "/accounts/tz1QFD9WqLWZmmAuqnnTPPUjfauitYEWdshv/tweets/written"
        );
    }

    #[tokio::test]
    async fn numeric_descending_order() {
        let emulator = Emulator::new();
        for id in &["9", "10", "2", "constants"] {
            emulator.insert_value(&format!("/tweets/{}/author", id), vec![]);
        }
        let ids = resolve(&emulator, &Feed::all()).await.unwrap();
        assert_eq!(ids, vec![10, 9, 2]);
    }

    #[tokio::test]
    async fn empty_account_feed() {
        let emulator = Emulator::new();
        let feed = Feed::of_account(FeedKind::Owned, account());
        assert!(resolve(&emulator, &feed).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn account_feeds_resolve_in_stable_order() {
        let emulator = Emulator::new();
        for kind in &[FeedKind::Owned, FeedKind::Written, FeedKind::Collecting] {
            let feed = Feed::of_account(*kind, account());
            for id in &[9, 10, 2] {
                emulator.insert_value(&format!("{}/{}", feed.index_path(), id), vec![0]);
            }
            let first = resolve(&emulator, &feed).await.unwrap();
            let second = resolve(&emulator, &feed).await.unwrap();
            assert_eq!(first, vec![10, 9, 2], "{} feed", kind);
            assert_eq!(first, second, "{} feed", kind);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn late_refresh_does_not_overwrite_newer_snapshot() {
        let (client, reader) = gated_client();
        let mut watcher =
            FeedWatcher::spawn(client, Feed::all(), Duration::from_secs(10)).unwrap();

        // The first refresh is held back, so the second one publishes first.
        let snapshot = watcher.next().await.unwrap();
        assert_eq!(snapshot.epoch, 2);
        assert_eq!(snapshot.tweets.len(), 1);

        reader.release();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(reader.listings.load(Ordering::SeqCst), 2);
        assert_eq!(watcher.latest(), snapshot);
        assert!(!watcher.subscribe().has_changed().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_discards_refresh_in_flight() {
        let (client, reader) = gated_client();
        let mut watcher =
            FeedWatcher::spawn(client, Feed::all(), Duration::from_secs(10)).unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(reader.listings.load(Ordering::SeqCst), 1);

        watcher.cancel();
        reader.release();
        tokio::time::sleep(Duration::from_secs(30)).await;

        assert_eq!(reader.listings.load(Ordering::SeqCst), 1);
        assert_eq!(watcher.latest(), Snapshot::default());
        assert_eq!(watcher.next().await, None);
    }

    #[tokio::test]
    async fn zero_period_is_rejected() {
        let (client, _emulator) = Client::new_emulator();
        assert!(FeedWatcher::spawn(client, Feed::all(), Duration::from_secs(0)).is_err());
    }
}
