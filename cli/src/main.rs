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

//! The `tzwitter` command line tool.
use structopt::StructOpt;
use tzwitter_cli::CommandLine;

#[tokio::main]
async fn main() {
    let cmd_line = CommandLine::from_args();
    init_logger(cmd_line.options.verbose);
    let result = cmd_line.run().await;
    if let Err(error) = result {
        eprintln!("ERROR: {}", error);
        let mut source = std::error::Error::source(&error);
        while let Some(cause) = source {
            eprintln!("  caused by: {}", cause);
            source = cause.source();
        }
        std::process::exit(1);
    }
}

/// `RUST_LOG` takes precedence over `--verbose`.
fn init_logger(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string());
    pretty_env_logger::formatted_builder()
        .parse_filters(&filter)
        .init();
}
