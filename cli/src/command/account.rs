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

//! Define the commands supported by the CLI related to accounts.

use super::*;

/// Account related commands
#[derive(StructOpt, Debug, Clone)]
pub enum Command {
    /// Show the nonce of the last command accepted from an account.
    Nonce(ShowNonce),
    /// Show the address of the `--author` key pair.
    Address(ShowAddress),
}

#[async_trait::async_trait]
impl CommandT for Command {
    async fn run(&self, ctx: &CommandContext) -> Result<(), CommandError> {
        match self {
            Command::Nonce(cmd) => cmd.run(ctx).await,
            Command::Address(cmd) => cmd.run(ctx).await,
        }
    }
}

#[derive(StructOpt, Debug, Clone)]
pub struct ShowNonce {
    /// tz1 address of the account
    #[structopt(value_name = "address", parse(try_from_str = parse_address))]
    account: PublicKeyHash,
}

#[async_trait::async_trait]
impl CommandT for ShowNonce {
    async fn run(&self, ctx: &CommandContext) -> Result<(), CommandError> {
        let nonce = ctx.client()?.account_nonce(&self.account).await?;
        println!("Nonce: {}", nonce.0);
        println!("Next command nonce: {}", nonce.next().map_err(Error::from)?.0);
        Ok(())
    }
}

#[derive(StructOpt, Debug, Clone)]
pub struct ShowAddress {}

#[async_trait::async_trait]
impl CommandT for ShowAddress {
    async fn run(&self, ctx: &CommandContext) -> Result<(), CommandError> {
        let signer = ctx.signer()?;
        println!("Address: {}", signer.address());
        println!("Public key: {}", signer.public_key().await?);
        Ok(())
    }
}
