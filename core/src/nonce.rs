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

use serde::{Deserialize, Serialize};

use crate::{encoding, DecodeError};

/// Per-account counter that prevents the replay of signed commands.
///
/// The rollup stores the nonce of the last accepted command of every account. A new command must
/// carry the stored nonce plus one.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Nonce(pub u64);

impl Nonce {
    /// Parse the nonce stored in the rollup state.
    ///
    /// An absent or empty value means that the account never submitted a command.
    pub fn from_state(stored: Option<&str>) -> Result<Self, DecodeError> {
        match stored {
            None => Ok(Nonce::default()),
            Some(hex) => encoding::u64_from_be_hex(hex).map(Nonce),
        }
    }

    /// Nonce of the command that follows this one. Fails on the largest nonce.
    pub fn next(self) -> Result<Nonce, DecodeError> {
        self.0
            .checked_add(1)
            .map(Nonce)
            .ok_or(DecodeError::NonceOverflow(self.0))
    }
}

/// Zero padded lowercase hex with at least 8 digits. This is the form that is hashed.
impl std::fmt::Display for Nonce {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

impl From<u64> for Nonce {
    fn from(value: u64) -> Self {
        Nonce(value)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn absent_nonce_is_zero() {
        assert_eq!(Nonce::from_state(None), Ok(Nonce(0)));
        assert_eq!(Nonce::from_state(Some("")), Ok(Nonce(0)));
        assert_eq!(
            Nonce::from_state(None).unwrap().next().unwrap().to_string(),
            "00000001"
        );
    }

    #[test]
    fn stored_nonce_is_incremented() {
        let next = Nonce::from_state(Some("0000000a")).unwrap().next().unwrap();
        assert_eq!(next, Nonce(11));
        assert_eq!(next.to_string(), "0000000b");
    }

    #[test]
    fn largest_nonce_has_no_successor() {
        let last = Nonce::from_state(Some("ffffffffffffffff")).unwrap();
        assert_eq!(last, Nonce(u64::MAX));
        assert_eq!(last.next(), Err(DecodeError::NonceOverflow(u64::MAX)));
    }

    #[test]
    fn display_grows_past_eight_digits() {
        assert_eq!(Nonce(0x1_0000_0000).to_string(), "100000000");
    }
}
