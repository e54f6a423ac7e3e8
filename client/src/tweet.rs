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

//! Reconstruction of [Tweet]s from the paths of the durable state.
use chrono::{DateTime, Utc};
use futures::future;

use crate::backend::{BlockId, StateReader};
use crate::interface::*;

/// Assemble the tweet `id` as seen by `viewer` at `now`.
///
/// All fields are fetched concurrently. A missing author or content is empty and missing likes
/// are `0`. Without a viewer the tweet is never liked.
pub async fn aggregate(
    reader: &dyn StateReader,
    id: TweetId,
    viewer: Option<&PublicKeyHash>,
    timing: &ProtocolTiming,
    now: DateTime<Utc>,
) -> Result<Tweet, Error> {
    let author = async {
        let bytes = reader.value(&paths::tweet_author(id)).await?;
        text_or_empty(bytes)
    };
    let content = async {
        let bytes = reader.value(&paths::tweet_content(id)).await?;
        text_or_empty(bytes)
    };
    let likes = async {
        match reader.value(&paths::tweet_likes(id)).await? {
            Some(bytes) => Ok::<_, Error>(encoding::u64_from_be_bytes(&bytes)?),
            None => Ok(0),
        }
    };
    let is_liked = async {
        match viewer {
            Some(viewer) => Ok::<_, Error>(
                reader
                    .value(&paths::account_like(viewer, id))
                    .await?
                    .is_some(),
            ),
            None => Ok(false),
        }
    };
    let collected_path = paths::tweet_collected(id);
    let collected_block = reader.value(&collected_path);

    let (author, content, likes, is_liked, collected_block) =
        future::try_join5(author, content, likes, is_liked, collected_block).await?;

    let collected = match collected_block {
        Some(bytes) => Some(collected_data(reader, bytes, timing, now).await?),
        None => None,
    };

    Ok(Tweet {
        id,
        author,
        content,
        likes,
        is_liked,
        collected,
    })
}

fn text_or_empty(bytes: Option<Vec<u8>>) -> Result<String, Error> {
    match bytes {
        Some(bytes) => Ok(encoding::utf8_from_bytes(bytes)?),
        None => Ok(String::new()),
    }
}

/// Resolve the block the tweet was collected in and estimate when it becomes mintable.
async fn collected_data(
    reader: &dyn StateReader,
    block_hash: Vec<u8>,
    timing: &ProtocolTiming,
    now: DateTime<Utc>,
) -> Result<CollectedData, Error> {
    let block = BlockId::Hash(encoding::utf8_from_bytes(block_hash)?);
    let (level, current_level) =
        future::try_join(reader.level(&block), reader.level(&BlockId::Head)).await?;
    let mintable_date =
        estimate_mintable_date(now, current_level, level, timing).ok_or_else(|| {
            Error::InvalidResponse(format!(
                "mintable date of a tweet collected at level {} is out of range",
                level
            ))
        })?;
    Ok(CollectedData {
        level,
        mintable_date,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::backend::Emulator;
    use chrono::{Duration, TimeZone as _};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 5, 2, 8, 30, 0).unwrap()
    }

    fn account() -> PublicKeyHash {
        "tz1QFD9WqLWZmmAuqnnTPPUjfauitYEWdshv".parse().unwrap()
    }

    #[tokio::test]
    async fn missing_fields_default() {
        let emulator = Emulator::new();
        emulator.insert_value("/tweets/4/content", b"partial".to_vec());
        let tweet = aggregate(&emulator, 4, None, &ProtocolTiming::default(), now())
            .await
            .unwrap();
        assert_eq!(
            tweet,
            Tweet {
                id: 4,
                author: String::new(),
                content: "partial".to_string(),
                likes: 0,
                is_liked: false,
                collected: None,
            }
        );
    }

    #[tokio::test]
    async fn liked_by_viewer() {
        let emulator = Emulator::new();
        emulator.insert_value("/tweets/1/likes", 7u64.to_be_bytes().to_vec());
        emulator.insert_value(&paths::account_like(&account(), 1), vec![0]);
        let timing = ProtocolTiming::default();

        let tweet = aggregate(&emulator, 1, Some(&account()), &timing, now())
            .await
            .unwrap();
        assert_eq!(tweet.likes, 7);
        assert!(tweet.is_liked);

        let anonymous = aggregate(&emulator, 1, None, &timing, now()).await.unwrap();
        assert!(!anonymous.is_liked);
    }

    #[tokio::test]
    async fn collected_tweet_has_mintable_date() {
        let emulator = Emulator::new();
        emulator.bake(20);
        let hash = emulator.block_hash(12);
        emulator.insert_value("/tweets/2/collected_hash", hash.into_bytes());

        let timing = ProtocolTiming::default();
        let tweet = aggregate(&emulator, 2, None, &timing, now()).await.unwrap();
        let collected = tweet.collected.unwrap();
        assert_eq!(collected.level, 12);
        // 8 levels elapsed out of 40 + 40
        assert_eq!(
            collected.mintable_date,
            now() + Duration::seconds(30 * (80 - 8))
        );
    }

    #[tokio::test]
    async fn mintable_date_out_of_range_fails() {
        let emulator = Emulator::new();
        emulator.bake(2);
        let hash = emulator.block_hash(1);
        emulator.insert_value("/tweets/5/collected_hash", hash.into_bytes());

        let timing = ProtocolTiming {
            block_time: Duration::seconds(1_000_000_000_000),
            ..ProtocolTiming::default()
        };
        let result = aggregate(&emulator, 5, None, &timing, now()).await;
        assert!(matches!(result, Err(Error::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn unknown_collect_block_fails() {
        let emulator = Emulator::new();
        emulator.insert_value("/tweets/2/collected_hash", b"BLnope".to_vec());
        let result = aggregate(&emulator, 2, None, &ProtocolTiming::default(), now()).await;
        assert!(result.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn invalid_likes() {
        let emulator = Emulator::new();
        emulator.insert_value("/tweets/3/likes", vec![1; 9]);
        let result = aggregate(&emulator, 3, None, &ProtocolTiming::default(), now()).await;
        assert!(matches!(
            result,
            Err(Error::Decode(DecodeError::IntegerTooLong(9)))
        ));
    }
}
