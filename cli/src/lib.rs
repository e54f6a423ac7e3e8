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

//! Define the command line parser and interface.

#![allow(clippy::large_enum_variant)]

use std::sync::Arc;

use structopt::StructOpt;
use thiserror::Error as ThisError;
use tzwitter_client::*;

pub mod key_pair_storage;

mod command;
use command::{account, feed, key_pair, tweet};

/// The type that captures the command line.
#[derive(StructOpt, Clone, Debug)]
#[structopt(name = "tzwitter", max_term_width = 80)]
pub struct CommandLine {
    #[structopt(flatten)]
    pub options: GlobalOptions,

    #[structopt(subcommand)]
    pub command: Command,
}

impl CommandLine {
    pub async fn run(self) -> Result<(), CommandError> {
        let ctx = self.options.context();
        self.command.run(&ctx).await
    }
}

/// Options shared by all commands.
#[derive(StructOpt, Clone, Debug)]
pub struct GlobalOptions {
    #[structopt(flatten)]
    pub network: NetworkOptions,

    #[structopt(flatten)]
    pub timing: TimingOptions,

    /// The name of the local key pair used to sign commands.
    #[structopt(long, env = "TZWITTER_AUTHOR", value_name = "key_pair_name")]
    pub author: Option<String>,

    /// Log every request sent to the nodes.
    #[structopt(short, long)]
    pub verbose: bool,
}

impl GlobalOptions {
    pub fn config(&self) -> Config {
        Config {
            rollup_url: self.network.rollup_url.clone(),
            tezos_url: self.network.tezos_url.clone(),
            timing: self.timing.protocol_timing(),
            ..Config::default()
        }
    }

    pub fn context(&self) -> CommandContext {
        CommandContext {
            config: self.config(),
            author: self.author.clone(),
        }
    }
}

/// Network-related command-line options
#[derive(StructOpt, Clone, Debug)]
pub struct NetworkOptions {
    /// URL of the smart rollup node RPC
    #[structopt(
        long,
        default_value = DEFAULT_ROLLUP_URL,
        env = ROLLUP_RPC_VAR,
        parse(try_from_str = parse_rollup_url),
    )]
    pub rollup_url: String,

    /// URL of the Tezos node RPC used to inject commands
    #[structopt(
        long,
        default_value = DEFAULT_TEZOS_URL,
        env = TEZOS_RPC_VAR,
        parse(try_from_str = parse_tezos_url),
    )]
    pub tezos_url: String,
}

fn parse_rollup_url(value: &str) -> Result<String, Error> {
    parse_url("rollup URL", value)
}

fn parse_tezos_url(value: &str) -> Result<String, Error> {
    parse_url("Tezos URL", value)
}

/// Protocol timing command-line options used to estimate when collected tweets can be minted.
#[derive(StructOpt, Clone, Debug)]
pub struct TimingOptions {
    /// Time between two blocks, in seconds
    #[structopt(
        long,
        default_value = "30",
        env = BLOCK_TIME_VAR,
        value_name = "seconds",
        parse(try_from_str = parse_block_time),
    )]
    pub block_time: chrono::Duration,

    /// Number of blocks between two commitments
    #[structopt(long, default_value = "40", env = COMMITMENT_PERIOD_VAR, value_name = "blocks")]
    pub commitment_interval: u64,

    /// Number of blocks before a commitment is cemented
    #[structopt(long, default_value = "40", env = CEMENTED_PERIOD_VAR, value_name = "blocks")]
    pub cemented_period: u64,
}

impl TimingOptions {
    pub fn protocol_timing(&self) -> ProtocolTiming {
        ProtocolTiming {
            block_time: self.block_time,
            commitment_interval: self.commitment_interval,
            cemented_period: self.cemented_period,
        }
    }
}

/// Contextual data for running commands. Created from command line options.
pub struct CommandContext {
    pub config: Config,
    /// Name of the key pair signing commands.
    pub author: Option<String>,
}

impl CommandContext {
    pub fn client(&self) -> Result<Client, CommandError> {
        Ok(Client::create(&self.config)?)
    }

    /// Signer of the `--author` key pair.
    pub fn signer(&self) -> Result<InMemorySigner, CommandError> {
        let name = self.author.as_ref().ok_or(CommandError::MissingAuthor)?;
        log::debug!("Signing with key pair '{}'", name);
        let data = key_pair_storage::get(name)?;
        Ok(InMemorySigner::from_secret_key(&data.secret_key)?)
    }

    /// Start a session of the `--author` key pair that injects commands through the Tezos node.
    pub async fn session(&self) -> Result<Session, CommandError> {
        let signer = Arc::new(self.signer()?);
        let session = Session::start_layer1(self.client()?, signer, &self.config.tezos_url).await?;
        Ok(session)
    }
}

/// The supported [CommandLine] commands.
/// The commands are grouped by domain.
#[derive(StructOpt, Clone, Debug)]
pub enum Command {
    Account(account::Command),
    Feed(feed::Command),
    KeyPair(key_pair::Command),
    Tweet(tweet::Command),
}

#[async_trait::async_trait]
impl CommandT for Command {
    async fn run(&self, ctx: &CommandContext) -> Result<(), CommandError> {
        match self {
            Command::Account(cmd) => cmd.run(ctx).await,
            Command::Feed(cmd) => cmd.run(ctx).await,
            Command::KeyPair(cmd) => cmd.run(ctx).await,
            Command::Tweet(cmd) => cmd.run(ctx).await,
        }
    }
}

/// The trait that every command must implement.
#[async_trait::async_trait]
pub trait CommandT {
    async fn run(&self, ctx: &CommandContext) -> Result<(), CommandError>;
}

/// Error returned by [CommandT::run].
///
/// Implements [From] for client errors and [key_pair_storage] errors.
#[derive(Debug, ThisError)]
pub enum CommandError {
    #[error("client error: {0}")]
    ClientError(#[from] Error),

    #[error("invalid key: {0}")]
    InvalidKey(#[from] KeyError),

    #[error("no key pair to sign with, pass --author or set TZWITTER_AUTHOR")]
    MissingAuthor,

    #[error("cannot find tweet {id}")]
    TweetNotFound { id: TweetId },

    #[error(transparent)]
    KeyPairStorageError(#[from] key_pair_storage::Error),
}

#[cfg(test)]
mod test {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn defaults() {
        let cmd = CommandLine::from_iter_safe(&["tzwitter", "feed", "list"]).unwrap();
        let config = cmd.options.config();
        assert_eq!(config.rollup_url, DEFAULT_ROLLUP_URL);
        assert_eq!(config.tezos_url, DEFAULT_TEZOS_URL);
        assert_eq!(config.timing, ProtocolTiming::default());
        assert_eq!(cmd.options.author, None);
    }

    #[test]
    #[serial]
    fn options_from_environment() {
        std::env::set_var(ROLLUP_RPC_VAR, "http://rollup.test:8932/");
        std::env::set_var(BLOCK_TIME_VAR, "8");
        let cmd = CommandLine::from_iter_safe(&[
            "tzwitter",
            "--author",
            "alice",
            "tweet",
            "like",
            "3",
        ]);
        std::env::remove_var(ROLLUP_RPC_VAR);
        std::env::remove_var(BLOCK_TIME_VAR);

        let options = cmd.unwrap().options;
        let config = options.config();
        assert_eq!(config.rollup_url, "http://rollup.test:8932");
        assert_eq!(config.timing.block_time, chrono::Duration::seconds(8));
        assert_eq!(options.author, Some("alice".to_string()));
    }

    #[test]
    #[serial]
    fn invalid_url() {
        assert!(
            CommandLine::from_iter_safe(&["tzwitter", "--tezos-url", "nope", "feed", "list"])
                .is_err()
        );
    }

    #[test]
    #[serial]
    fn invalid_block_time() {
        for value in &["0", "-30", "9223372036854776"] {
            let result = CommandLine::from_iter_safe(&[
                "tzwitter",
                "--block-time",
                value,
                "feed",
                "list",
            ]);
            assert!(result.is_err(), "block time {} accepted", value);
        }
    }

    #[test]
    fn missing_author() {
        let ctx = CommandContext {
            config: Config::default(),
            author: None,
        };
        assert!(matches!(ctx.signer(), Err(CommandError::MissingAuthor)));
    }
}
