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

//! Define the commands supported by the CLI.

use crate::{CommandContext, CommandError, CommandT};
use tzwitter_client::*;

use structopt::StructOpt;

pub mod account;
pub mod feed;
pub mod key_pair;
pub mod tweet;

fn parse_address(data: &str) -> Result<PublicKeyHash, String> {
    data.parse().map_err(|err: KeyError| err.to_string())
}

fn announce_submitted(what: &str, submitted: &Submitted) {
    println!("✓ {} submitted in operation {}", what, submitted.operation_hash);
    println!("ⓘ Command nonce: {}", submitted.nonce.0);
    println!("⏳ Commands are applied once the operation is included. Please wait...");
}

fn print_tweet(tweet: &Tweet) {
    println!("#{} by {}", tweet.id, tweet.author);
    println!("  {}", tweet.content);
    let liked = if tweet.is_liked { " (liked)" } else { "" };
    println!("  ♥ {}{}", tweet.likes, liked);
    if let Some(collected) = &tweet.collected {
        println!(
            "  collected at level {}, mintable around {}",
            collected.level,
            collected.mintable_date.to_rfc3339()
        );
    }
}
