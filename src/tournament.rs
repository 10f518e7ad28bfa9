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

use std::{collections::HashMap, fmt, str::FromStr};

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::{Id, error::SyncError};

/// How long after "now" a tournament without a date starts.
pub const DEFAULT_START_DELAY_HOURS: i64 = 24;

/// A tournament as the league stores it.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct LocalTournament {
    pub id: Id,
    /// The Challonge address (the `url` slug). The owner may change it at any
    /// time.
    #[serde(default)]
    pub external_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub scheduled_date: Option<DateTime<Utc>>,
    pub owner: Id,
}

impl LocalTournament {
    /// # Errors
    ///
    /// If the name is empty or the address is empty or not usable in a URL.
    pub fn validate(&self) -> Result<(), SyncError> {
        if self.name.trim().is_empty() {
            return Err(SyncError::InvalidTournament(format!(
                "tournament {} has no name",
                self.id
            )));
        }

        validate_address(&self.external_id)
    }

    #[must_use]
    pub fn start_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.scheduled_date
            .unwrap_or(now + TimeDelta::hours(DEFAULT_START_DELAY_HOURS))
    }
}

/// Challonge addresses are letters, digits and underscores, with a hyphen
/// separating an organization's subdomain.
///
/// # Errors
///
/// If the address is empty or has any other character.
pub fn validate_address(address: &str) -> Result<(), SyncError> {
    if address.is_empty() {
        return Err(SyncError::InvalidTournament(
            "the Challonge address is empty".to_string(),
        ));
    }

    if let Some(ch) = address
        .chars()
        .find(|ch| !(ch.is_ascii_alphanumeric() || *ch == '_' || *ch == '-'))
    {
        return Err(SyncError::InvalidTournament(format!(
            "the Challonge address '{address}' contains '{ch}'"
        )));
    }

    Ok(())
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Tournaments(pub HashMap<Id, LocalTournament>);

/// The lifecycle state Challonge reports for a tournament.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum TournamentState {
    #[default]
    Signup,
    Underway,
    Verified,
    Complete,
    Other(String),
}

impl TournamentState {
    /// Once a tournament leaves sign up Challonge rejects start time changes.
    #[must_use]
    pub fn has_started(&self) -> bool {
        *self != Self::Signup
    }
}

impl fmt::Display for TournamentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signup => write!(f, "signup"),
            Self::Underway => write!(f, "underway"),
            Self::Verified => write!(f, "verified"),
            Self::Complete => write!(f, "complete"),
            Self::Other(state) => write!(f, "{state}"),
        }
    }
}

impl FromStr for TournamentState {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> anyhow::Result<Self> {
        match value.trim() {
            "" => Err(anyhow::Error::msg("invalid tournament state: empty")),
            "signup" => Ok(Self::Signup),
            "underway" => Ok(Self::Underway),
            "verified" => Ok(Self::Verified),
            "complete" => Ok(Self::Complete),
            state => Ok(Self::Other(state.to_string())),
        }
    }
}
