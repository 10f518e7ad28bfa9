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

use std::{fs, io::ErrorKind, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

pub const CHALLONGE_API: &str = "https://api.challonge.com/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Settings read from `sync.ron`, overridable on the command line.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct SyncConfig {
    pub api_base: String,
    /// Per request. Zero means the default.
    pub timeout_secs: u64,
    /// Challonge's id for the league's game, sent when creating a tournament.
    pub game_id: Option<u64>,
    /// Refuse to create a tournament when Challonge can't confirm it is absent.
    pub strict_existence_check: bool,
    /// Treat a failed status probe as "already started".
    pub strict_status_probe: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            api_base: CHALLONGE_API.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            game_id: None,
            strict_existence_check: false,
            strict_status_probe: false,
        }
    }
}

impl SyncConfig {
    /// A missing file gives the defaults.
    ///
    /// # Errors
    ///
    /// If the file can't be read or isn't valid RON.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        match fs::read_to_string(path) {
            Ok(string) => match ron::from_str(&string) {
                Ok(config) => Ok(config),
                Err(err) => Err(anyhow::Error::msg(format!(
                    "RON: {}: {err}",
                    path.display()
                ))),
            },
            Err(err) => match err.kind() {
                ErrorKind::NotFound => Ok(Self::default()),
                _ => Err(anyhow::Error::msg(err.to_string())),
            },
        }
    }

    /// The timeout for each request to Challonge, never zero.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        if self.timeout_secs == 0 {
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        } else {
            Duration::from_secs(self.timeout_secs)
        }
    }
}
