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

use std::{collections::HashMap, fmt};

use serde::{Deserialize, Serialize};

use crate::{Id, error::SyncError};

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Account {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub challonge_username: String,
    #[serde(default)]
    pub challonge_api_key: Option<String>,
}

impl Account {
    /// # Errors
    ///
    /// If the account has no Challonge API key.
    pub fn credentials(&self) -> Result<OwnerCredentials, SyncError> {
        match &self.challonge_api_key {
            Some(api_key) if !api_key.trim().is_empty() => Ok(OwnerCredentials {
                username: self.challonge_username.clone(),
                api_key: api_key.clone(),
            }),
            _ => Err(SyncError::Configuration(format!(
                "{} has no Challonge API key",
                self.username
            ))),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Accounts(pub HashMap<Id, Account>);

/// What Challonge's basic auth needs.
#[derive(Clone, Eq, PartialEq)]
pub struct OwnerCredentials {
    pub username: String,
    pub api_key: String,
}

impl fmt::Debug for OwnerCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnerCredentials")
            .field("username", &self.username)
            .field("api_key", &"[redacted]")
            .finish()
    }
}
