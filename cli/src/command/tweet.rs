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

//! Define the commands supported by the CLI related to tweets.

use super::*;

/// Tweet related commands
#[derive(StructOpt, Debug, Clone)]
pub enum Command {
    /// Post a tweet signed by the `--author` key pair.
    Post(Post),
    /// Like a tweet.
    Like(Like),
    /// Transfer the ownership of a tweet to another account.
    Transfer(Transfer),
    /// Start collecting a tweet into a base chain token.
    Collect(Collect),
    /// Show a tweet.
    Show(Show),
}

#[async_trait::async_trait]
impl CommandT for Command {
    async fn run(&self, ctx: &CommandContext) -> Result<(), CommandError> {
        match self {
            Command::Post(cmd) => cmd.run(ctx).await,
            Command::Like(cmd) => cmd.run(ctx).await,
            Command::Transfer(cmd) => cmd.run(ctx).await,
            Command::Collect(cmd) => cmd.run(ctx).await,
            Command::Show(cmd) => cmd.run(ctx).await,
        }
    }
}

#[derive(StructOpt, Debug, Clone)]
pub struct Post {
    /// Text of the tweet.
    content: String,
}

#[async_trait::async_trait]
impl CommandT for Post {
    async fn run(&self, ctx: &CommandContext) -> Result<(), CommandError> {
        let session = ctx.session().await?;
        let submitted = session.post_tweet(&self.content).await?;
        announce_submitted("Tweet", &submitted);
        Ok(())
    }
}

#[derive(StructOpt, Debug, Clone)]
pub struct Like {
    /// Id of the tweet to like.
    id: TweetId,
}

#[async_trait::async_trait]
impl CommandT for Like {
    async fn run(&self, ctx: &CommandContext) -> Result<(), CommandError> {
        let session = ctx.session().await?;
        let submitted = session.like_tweet(self.id).await?;
        announce_submitted("Like", &submitted);
        Ok(())
    }
}

#[derive(StructOpt, Debug, Clone)]
pub struct Transfer {
    /// Id of the tweet to transfer.
    id: TweetId,

    /// tz1 address of the new owner.
    #[structopt(value_name = "destination", parse(try_from_str = parse_address))]
    destination: PublicKeyHash,
}

#[async_trait::async_trait]
impl CommandT for Transfer {
    async fn run(&self, ctx: &CommandContext) -> Result<(), CommandError> {
        let session = ctx.session().await?;
        let submitted = session
            .transfer_tweet(self.id, self.destination.clone())
            .await?;
        announce_submitted("Transfer", &submitted);
        Ok(())
    }
}

#[derive(StructOpt, Debug, Clone)]
pub struct Collect {
    /// Id of the tweet to collect.
    id: TweetId,
}

#[async_trait::async_trait]
impl CommandT for Collect {
    async fn run(&self, ctx: &CommandContext) -> Result<(), CommandError> {
        let session = ctx.session().await?;
        let submitted = session.collect_tweet(self.id).await?;
        announce_submitted("Collect", &submitted);
        Ok(())
    }
}

#[derive(StructOpt, Debug, Clone)]
pub struct Show {
    /// Id of the tweet to show.
    id: TweetId,
}

#[async_trait::async_trait]
impl CommandT for Show {
    async fn run(&self, ctx: &CommandContext) -> Result<(), CommandError> {
        let client = match ctx.signer() {
            Ok(signer) => ctx.client()?.with_viewer(Some(signer.address())),
            Err(CommandError::MissingAuthor) => ctx.client()?,
            Err(err) => return Err(err),
        };
        let tweet = client.get_tweet(self.id).await?;
        if tweet.author.is_empty() && tweet.content.is_empty() {
            return Err(CommandError::TweetNotFound { id: self.id });
        }
        print_tweet(&tweet);
        Ok(())
    }
}
