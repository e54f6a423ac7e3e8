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

//! Define the commands supported by the CLI related to feeds.

use std::time::Duration;

use super::*;

/// Feed related commands
#[derive(StructOpt, Debug, Clone)]
pub enum Command {
    /// List the tweets of a feed, newest first.
    List(List),
    /// Show a feed and refresh it periodically until interrupted.
    Watch(Watch),
}

#[async_trait::async_trait]
impl CommandT for Command {
    async fn run(&self, ctx: &CommandContext) -> Result<(), CommandError> {
        match self {
            Command::List(cmd) => cmd.run(ctx).await,
            Command::Watch(cmd) => cmd.run(ctx).await,
        }
    }
}

/// Feed selection shared by the feed commands.
#[derive(StructOpt, Debug, Clone)]
pub struct FeedOptions {
    /// One of all, owned, written or collecting.
    #[structopt(default_value = "all")]
    kind: FeedKind,

    /// tz1 address of the account whose feed is listed. Defaults to the `--author` key pair.
    #[structopt(long, parse(try_from_str = parse_address))]
    account: Option<PublicKeyHash>,
}

impl FeedOptions {
    /// Build the feed and a client that sees likes of the `--author` key pair.
    fn feed_and_client(&self, ctx: &CommandContext) -> Result<(Feed, Client), CommandError> {
        let author = match ctx.signer() {
            Ok(signer) => Some(signer.address()),
            Err(CommandError::MissingAuthor) => None,
            Err(err) => return Err(err),
        };
        let account = match (self.kind, &self.account) {
            (FeedKind::All, _) => None,
            (_, Some(account)) => Some(account.clone()),
            (_, None) => author.clone(),
        };
        let feed = Feed {
            kind: self.kind,
            account,
        };
        Ok((feed, ctx.client()?.with_viewer(author)))
    }
}

#[derive(StructOpt, Debug, Clone)]
pub struct List {
    #[structopt(flatten)]
    feed: FeedOptions,
}

#[async_trait::async_trait]
impl CommandT for List {
    async fn run(&self, ctx: &CommandContext) -> Result<(), CommandError> {
        let (feed, client) = self.feed.feed_and_client(ctx)?;
        let tweets = client.list_tweets(&feed).await?;
        println!("Tweets ({})\n", tweets.len());
        for tweet in &tweets {
            print_tweet(tweet);
            println!();
        }
        Ok(())
    }
}

#[derive(StructOpt, Debug, Clone)]
pub struct Watch {
    #[structopt(flatten)]
    feed: FeedOptions,

    /// Seconds between two refreshes.
    #[structopt(long, default_value = "5", value_name = "seconds")]
    interval: u64,
}

#[async_trait::async_trait]
impl CommandT for Watch {
    async fn run(&self, ctx: &CommandContext) -> Result<(), CommandError> {
        let (feed, client) = self.feed.feed_and_client(ctx)?;
        let mut watcher = client.watch_feed(feed, Duration::from_secs(self.interval))?;
        loop {
            tokio::select! {
                snapshot = watcher.next() => match snapshot {
                    Some(snapshot) => {
                        println!("Refresh {} ({} tweets)\n", snapshot.epoch, snapshot.tweets.len());
                        for tweet in &snapshot.tweets {
                            print_tweet(tweet);
                            println!();
                        }
                    }
                    None => break,
                },
                _ = tokio::signal::ctrl_c() => {
                    watcher.cancel();
                    break;
                }
            }
        }
        Ok(())
    }
}
