//! Synchronizes a league's tournaments with the Challonge bracket service.
//!
//! A tournament stored by the league is either created on Challonge or, if it
//! already exists there, updated in place. See [`reconcile`] for the rules.
//!
//! ## Data Files
//!
//! Everything lives in the data folder (`$XDG_DATA_HOME/bracket-sync` on
//! Linux):
//!
//! * `league.ron` - accounts, with their Challonge credentials, and tournaments
//! * `sync.ron` - optional [`config::SyncConfig`] settings

// This file is part of bracket-sync.
//
// bracket-sync is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// bracket-sync is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

#![deny(clippy::panic)]

pub mod accounts;
pub mod challonge;
pub mod config;
pub mod error;
pub mod league;
pub mod reconcile;
pub mod tournament;
pub mod utils;

pub type Id = u64;
pub const HOME: &str = "bracket-sync";
pub const CONFIG_FILE: &str = "sync.ron";
pub const LEAGUE_FILE: &str = "league.ron";

pub const COPYRIGHT: &str = r".SH COPYRIGHT
This program is free software: you can redistribute it and/or modify
it under the terms of the GNU Affero General Public License as published by
the Free Software Foundation, either version 3 of the License, or
(at your option) any later version.

This program is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
GNU Affero General Public License for more details.

You should have received a copy of the GNU Affero General Public License
along with this program.  If not, see <https://www.gnu.org/licenses/>.
";

pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "
Licensed under the AGPLv3"
);
