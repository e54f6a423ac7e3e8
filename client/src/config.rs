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

//! Provides [Config], the endpoints and protocol constants used by the client.
use std::str::FromStr;
use std::time::Duration;

use tzwitter_core::{ProtocolTiming, MAGIC_BYTE};

use crate::Error;

/// Environment variable holding the rollup node URL.
pub const ROLLUP_RPC_VAR: &str = "TZWITTER_ROLLUP_RPC";
/// Environment variable holding the Tezos node URL.
pub const TEZOS_RPC_VAR: &str = "TZWITTER_TEZOS_RPC";
/// Environment variable holding the block time in seconds.
pub const BLOCK_TIME_VAR: &str = "BLOCK_TIME";
/// Environment variable holding the number of blocks between commitments.
pub const COMMITMENT_PERIOD_VAR: &str = "COMMITMENT_PERIOD";
/// Environment variable holding the number of blocks before a commitment is cemented.
pub const CEMENTED_PERIOD_VAR: &str = "CEMENTED_PERIOD";

pub const DEFAULT_ROLLUP_URL: &str = "http://localhost:8932";
pub const DEFAULT_TEZOS_URL: &str = "http://localhost:18731";
/// Durable storage backend of WASM kernels.
pub const DEFAULT_DURABLE_BACKEND: &str = "wasm_2_0_0";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the smart rollup node RPC.
    pub rollup_url: String,
    /// Base URL of the Tezos node RPC. Only used to inject operations.
    pub tezos_url: String,
    /// Durable storage backend identifier in the rollup node RPC paths.
    pub durable_backend: String,
    pub magic_byte: u8,
    pub timing: ProtocolTiming,
    /// Period of feed refreshes.
    pub refresh_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            rollup_url: DEFAULT_ROLLUP_URL.to_string(),
            tezos_url: DEFAULT_TEZOS_URL.to_string(),
            durable_backend: DEFAULT_DURABLE_BACKEND.to_string(),
            magic_byte: MAGIC_BYTE,
            timing: ProtocolTiming::default(),
            refresh_interval: Duration::from_secs(5),
        }
    }
}

impl Config {
    /// Build the configuration from the process environment, using defaults for unset variables.
    pub fn from_env() -> Result<Self, Error> {
        Config::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let mut config = Config::default();
        if let Some(url) = lookup(ROLLUP_RPC_VAR) {
            config.rollup_url = parse_url(ROLLUP_RPC_VAR, &url)?;
        }
        if let Some(url) = lookup(TEZOS_RPC_VAR) {
            config.tezos_url = parse_url(TEZOS_RPC_VAR, &url)?;
        }
        if let Some(seconds) = lookup(BLOCK_TIME_VAR) {
            config.timing.block_time = parse_block_time(&seconds)?;
        }
        if let Some(blocks) = lookup(COMMITMENT_PERIOD_VAR) {
            config.timing.commitment_interval = parse_number(COMMITMENT_PERIOD_VAR, &blocks)?;
        }
        if let Some(blocks) = lookup(CEMENTED_PERIOD_VAR) {
            config.timing.cemented_period = parse_number(CEMENTED_PERIOD_VAR, &blocks)?;
        }
        Ok(config)
    }
}

/// Validate a base URL and strip its trailing slash.
pub fn parse_url(name: &str, value: &str) -> Result<String, Error> {
    url::Url::parse(value).map_err(|err| Error::Config(format!("{}: {}", name, err)))?;
    Ok(value.trim_end_matches('/').to_string())
}

/// Parse a block time given in whole seconds. It must be positive.
pub fn parse_block_time(value: &str) -> Result<chrono::Duration, Error> {
    let seconds: i64 = parse_number(BLOCK_TIME_VAR, value)?;
    if seconds <= 0 {
        return Err(Error::Config(format!(
            "{} must be positive, got {}",
            BLOCK_TIME_VAR, seconds
        )));
    }
    chrono::Duration::try_seconds(seconds)
        .ok_or_else(|| Error::Config(format!("{} is too large: {}", BLOCK_TIME_VAR, seconds)))
}

fn parse_number<T: FromStr>(name: &str, value: &str) -> Result<T, Error> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("{} must be a number, got '{}'", name, value)))
}
