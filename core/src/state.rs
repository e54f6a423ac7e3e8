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

//! Entities reconstructed from the rollup durable state and the layout of that state.
use std::convert::TryFrom;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{Level, TweetId};

/// Snapshot of a tweet assembled from several durable state paths.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Tweet {
    pub id: TweetId,
    pub author: String,
    pub content: String,
    pub likes: u64,
    /// Whether the viewing account likes the tweet. Always `false` without a viewer.
    pub is_liked: bool,
    pub collected: Option<CollectedData>,
}

/// Present on tweets that are being collected into a base chain token.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CollectedData {
    /// Rollup level at which the collect command was applied.
    pub level: Level,
    /// Pessimistic estimate of the moment the token can be minted on the base chain.
    pub mintable_date: DateTime<Utc>,
}

/// Timing constants of the rollup protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProtocolTiming {
    /// Time between two blocks.
    pub block_time: Duration,
    /// Number of blocks between two commitments.
    pub commitment_interval: u64,
    /// Number of blocks before a commitment is cemented.
    pub cemented_period: u64,
}

impl Default for ProtocolTiming {
    fn default() -> Self {
        ProtocolTiming {
            block_time: Duration::seconds(30),
            commitment_interval: 40,
            cemented_period: 40,
        }
    }
}

impl ProtocolTiming {
    /// Duration of `count` blocks, which may be negative. `None` on overflow.
    fn blocks(&self, count: i64) -> Option<Duration> {
        self.block_time.checked_mul(i32::try_from(count).ok()?)
    }
}

/// Estimate when a tweet collected at `collected_level` becomes mintable.
///
/// The estimate assumes the collect was included right at the start of a commitment period and
/// that the commitment then takes the full cementing period.
///
/// Returns `None` if the date cannot be represented.
pub fn estimate_mintable_date(
    now: DateTime<Utc>,
    current_level: Level,
    collected_level: Level,
    timing: &ProtocolTiming,
) -> Option<DateTime<Utc>> {
    let elapsed = i64::try_from(current_level.saturating_sub(collected_level)).ok()?;
    let period = i64::try_from(timing.commitment_interval)
        .ok()?
        .checked_add(i64::try_from(timing.cemented_period).ok()?)?;
    let remaining = timing.blocks(period.checked_sub(elapsed)?)?;
    now.checked_add_signed(remaining)
}

/// Paths of the durable state written by the rollup kernel.
pub mod paths {
    use crate::{PublicKeyHash, TweetId};

    pub fn tweets() -> String {
        "/tweets".to_string()
    }

    fn tweet_field(id: TweetId, field: &str) -> String {
        format!("/tweets/{}/{}", id, field)
    }

    pub fn tweet_author(id: TweetId) -> String {
        tweet_field(id, "author")
    }

    pub fn tweet_content(id: TweetId) -> String {
        tweet_field(id, "content")
    }

    pub fn tweet_likes(id: TweetId) -> String {
        tweet_field(id, "likes")
    }

    /// Holds the hash of the base chain block preceding the collect.
    pub fn tweet_collected(id: TweetId) -> String {
        tweet_field(id, "collected_hash")
    }

    fn account_field(account: &PublicKeyHash, field: &str) -> String {
        format!("/accounts/{}/{}", account, field)
    }

    pub fn account_nonce(account: &PublicKeyHash) -> String {
        account_field(account, "nonce")
    }

    pub fn account_owned(account: &PublicKeyHash) -> String {
        account_field(account, "tweets/owned")
    }

    pub fn account_written(account: &PublicKeyHash) -> String {
        account_field(account, "tweets/written")
    }

    pub fn account_likes(account: &PublicKeyHash) -> String {
        account_field(account, "likes")
    }

    pub fn account_like(account: &PublicKeyHash, id: TweetId) -> String {
        format!("{}/{}", account_likes(account), id)
    }

    pub fn account_collecting(account: &PublicKeyHash) -> String {
        account_field(account, "collecting")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone as _;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 4, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn mintable_date_right_after_collect() {
        let timing = ProtocolTiming::default();
        let date = estimate_mintable_date(now(), 100, 100, &timing).unwrap();
        assert_eq!(date - now(), Duration::seconds(2400));
    }

    #[test]
    fn mintable_date_moves_closer_with_levels() {
        let timing = ProtocolTiming::default();
        let date = estimate_mintable_date(now(), 110, 100, &timing).unwrap();
        assert_eq!(date - now(), Duration::seconds(2400 - 300));
    }

    #[test]
    fn mintable_date_with_head_behind_collect() {
        let timing = ProtocolTiming {
            block_time: Duration::seconds(15),
            commitment_interval: 20,
            cemented_period: 10,
        };
        let date = estimate_mintable_date(now(), 5, 6, &timing).unwrap();
        assert_eq!(date - now(), Duration::seconds(450));
    }

    #[test]
    fn mintable_date_long_after_collect_is_in_the_past() {
        let timing = ProtocolTiming::default();
        let date = estimate_mintable_date(now(), 1100, 1000, &timing).unwrap();
        assert_eq!(date - now(), Duration::seconds(-600));
    }

    #[test]
    fn mintable_date_out_of_range() {
        let huge_blocks = ProtocolTiming {
            block_time: Duration::seconds(1_000_000_000_000),
            ..ProtocolTiming::default()
        };
        assert_eq!(estimate_mintable_date(now(), 100, 100, &huge_blocks), None);

        let huge_periods = ProtocolTiming {
            commitment_interval: u64::MAX,
            ..ProtocolTiming::default()
        };
        assert_eq!(estimate_mintable_date(now(), 100, 100, &huge_periods), None);
    }

    #[test]
    fn state_paths() {
        let account = "tz1QFD9WqLWZmmAuqnnTPPUjfauitYEWdshv".parse().unwrap();
        assert_eq!(paths::tweet_collected(3), "/tweets/3/collected_hash");
        assert_eq!(
            paths::account_nonce(&account),
            "/accounts/tz1QFD9WqLWZmmAuqnnTPPUjfauitYEWdshv/nonce"
        );
        assert_eq!(
            paths::account_like(&account, 12),
            "/accounts/tz1QFD9WqLWZmmAuqnnTPPUjfauitYEWdshv/likes/12"
        );
        assert_eq!(
            paths::account_owned(&account),
            "/accounts/tz1QFD9WqLWZmmAuqnnTPPUjfauitYEWdshv/tweets/owned"
        );
    }
}
