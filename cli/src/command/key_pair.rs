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

//! Define the commands supported by the CLI related to key-pairs.

use super::*;
use crate::key_pair_storage;

/// Key-pair related commands
#[derive(StructOpt, Debug, Clone)]
pub enum Command {
    /// Generate a random key-pair identified by `name` and
    /// store it on disk. Fail if there is already a key-pair
    /// with the given `name`.
    Generate(Generate),
    /// Store an existing `edsk` secret key under `name`.
    Import(Import),
    /// List all the local key pairs.
    List(List),
}

#[async_trait::async_trait]
impl CommandT for Command {
    async fn run(&self, ctx: &CommandContext) -> Result<(), CommandError> {
        match self {
            Command::Generate(cmd) => cmd.run(ctx).await,
            Command::Import(cmd) => cmd.run(ctx).await,
            Command::List(cmd) => cmd.run(ctx).await,
        }
    }
}

#[derive(StructOpt, Debug, Clone)]
pub struct Generate {
    /// The name that uniquely identifies the key-pair locally.
    name: String,
}

#[async_trait::async_trait]
impl CommandT for Generate {
    async fn run(&self, _ctx: &CommandContext) -> Result<(), CommandError> {
        let signer = InMemorySigner::generate();
        key_pair_storage::add(
            self.name.clone(),
            key_pair_storage::KeyPairData {
                secret_key: signer.secret_key(),
            },
        )?;
        println!("✓ Key-pair generated successfully");
        println!("ⓘ Address: {}", signer.address());
        Ok(())
    }
}

#[derive(StructOpt, Debug, Clone)]
pub struct Import {
    /// The name that uniquely identifies the key-pair locally.
    name: String,

    /// Secret key in base58 `edsk` form.
    secret_key: String,
}

#[async_trait::async_trait]
impl CommandT for Import {
    async fn run(&self, _ctx: &CommandContext) -> Result<(), CommandError> {
        let signer = InMemorySigner::from_secret_key(&self.secret_key)?;
        // Store the seed form whatever form was given.
        key_pair_storage::add(
            self.name.clone(),
            key_pair_storage::KeyPairData {
                secret_key: signer.secret_key(),
            },
        )?;
        println!("✓ Key-pair imported successfully");
        println!("ⓘ Address: {}", signer.address());
        Ok(())
    }
}

#[derive(StructOpt, Debug, Clone)]
pub struct List {}

#[async_trait::async_trait]
impl CommandT for List {
    async fn run(&self, _ctx: &CommandContext) -> Result<(), CommandError> {
        let key_pairs = key_pair_storage::list()?;
        println!("Key-pairs ({})\n", key_pairs.len());
        for (name, data) in key_pairs {
            println!("  '{}'", name);
            match InMemorySigner::from_secret_key(&data.secret_key) {
                Ok(signer) => println!("  address: {}\n", signer.address()),
                Err(err) => println!("  invalid secret key: {}\n", err),
            }
        }
        Ok(())
    }
}
