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

//! Provides [Transaction], a signed command ready for the inbox.
use crate::interface::*;
use crate::signer::Signer;

/// Command signed by its author, ready to be submitted to the rollup inbox.
///
/// A transaction is created with [Transaction::new_signed]. The nonce must be the successor of
/// the author nonce stored in the rollup, see [crate::ClientT::account_nonce]. The kernel drops
/// transactions with any other nonce.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    envelope: Envelope,
    payload: String,
}

impl Transaction {
    /// Sign `command` with `nonce` and encode it as an inbox payload tagged with `magic_byte`.
    pub async fn new_signed(
        signer: &dyn Signer,
        command: Command,
        nonce: Nonce,
        magic_byte: u8,
    ) -> Result<Self, Error> {
        let unsigned = UnsignedCommand::new(nonce, command);
        let signed = signer.sign(&hex::encode(unsigned.digest())).await?;
        let public_key = signer.public_key().await?;
        let envelope = unsigned.into_envelope(public_key, signed.prefix_sig);
        let payload = envelope.to_payload(magic_byte);
        Ok(Transaction { envelope, payload })
    }

    pub fn nonce(&self) -> Nonce {
        self.envelope.inner.nonce
    }

    pub fn command(&self) -> &Command {
        &self.envelope.inner.command
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Hex encoded inbox message.
    pub fn payload(&self) -> &str {
        &self.payload
    }
}
