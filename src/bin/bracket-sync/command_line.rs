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

use std::io::Write as _;

use bracket_sync::{COPYRIGHT, Id, LONG_VERSION, config::SyncConfig};
use clap::{CommandFactory, Parser};

/// Challonge Tournament Sync
///
/// Creates a league tournament on Challonge, or updates it if it is already
/// there.
#[allow(clippy::struct_excessive_bools)]
#[derive(Parser, Debug)]
#[command(long_version = LONG_VERSION, about = "Challonge Tournament Sync")]
pub(crate) struct Args {
    /// The local id of the tournament to synchronize
    #[arg(long)]
    pub tournament: Option<Id>,

    /// Whether the tournament was edited rather than newly created
    #[arg(long)]
    pub update: bool,

    /// The Challonge address the tournament had before it was edited
    #[arg(long, value_name = "ADDRESS")]
    pub old_url: Option<String>,

    /// Give the tournament a new Challonge address, renaming it in place
    #[arg(long, value_name = "ADDRESS")]
    pub rename: Option<String>,

    /// Print the tournament's state on Challonge and exit
    #[arg(long)]
    pub status: bool,

    /// The Challonge API to talk to
    #[arg(long, value_name = "URL")]
    pub api_base: Option<String>,

    /// Seconds to wait for each Challonge request
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Don't guess when Challonge can't be asked
    ///
    /// - refuse to create a tournament that can't be confirmed absent
    /// - keep the start time when the tournament's state is unknown
    #[arg(long)]
    pub strict: bool,

    /// Whether to log on the debug level
    #[arg(long)]
    pub debug: bool,

    /// Whether the application is being run by systemd
    #[arg(long)]
    pub systemd: bool,

    /// Build the manpage
    #[arg(long)]
    pub man: bool,
}

impl Args {
    pub(crate) fn generate_man_page() -> anyhow::Result<()> {
        let mut buffer: Vec<u8> = Vec::default();
        let cmd = Self::command().name("bracket-sync").long_version(None);
        let man = clap_mangen::Man::new(cmd).date("2025-11-02");

        man.render(&mut buffer)?;
        write!(buffer, "{COPYRIGHT}")?;

        std::fs::write("bracket-sync.1", buffer)?;
        Ok(())
    }

    pub(crate) fn apply(&self, config: &mut SyncConfig) {
        if let Some(api_base) = &self.api_base {
            config.api_base.clone_from(api_base);
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        if self.strict {
            config.strict_existence_check = true;
            config.strict_status_probe = true;
        }
    }
}
