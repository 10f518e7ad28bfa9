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

//! Decides whether a local tournament is created on Challonge or updated there.
//!
//! * A fresh tournament is looked up by its address first. If Challonge
//!   already has it (an earlier create went through but was never recorded
//!   locally) it is updated, otherwise it is created.
//! * An edited tournament is updated at the address it had before the edit,
//!   and a changed address is sent along so Challonge renames it in place.
//! * Challonge rejects start time changes once a tournament has left sign up,
//!   so an update only carries `start_at` while the tournament is in sign up.

use chrono::Utc;
use log::{error, info, warn};
use serde::Serialize;
use serde_json::Value;

use crate::{
    accounts::{Account, OwnerCredentials},
    challonge::{
        ApiResponse, BracketApi, CreateRequest, NewTournament, TournamentChanges, UpdateRequest,
        timestamp,
    },
    config::SyncConfig,
    error::SyncError,
    tournament::{LocalTournament, TournamentState, validate_address},
};

/// What the caller meant to do with the tournament.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum Intent {
    #[default]
    Create,
    Update {
        /// The address the tournament had on Challonge before this edit.
        old_address: Option<String>,
    },
}

impl Intent {
    #[must_use]
    pub fn new(is_update: bool, old_address: Option<String>) -> Self {
        if is_update {
            Self::Update {
                old_address: old_address
                    .map(|address| address.trim().to_string())
                    .filter(|address| !address.is_empty()),
            }
        } else {
            Self::Create
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Created,
    Updated,
}

/// The outcome of a successful reconciliation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Reconciliation {
    pub action: Action,
    /// Where the tournament now lives on Challonge. Callers store this as the
    /// tournament's `external_id`.
    pub address: String,
    pub message: String,
    pub payload: Value,
}

/// The result of looking a tournament up by its address.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Existence {
    Present,
    Absent,
    Unknown(String),
}

#[derive(Clone, Debug)]
pub struct Reconciler<A> {
    api: A,
    game_id: Option<u64>,
    strict_existence_check: bool,
    strict_status_probe: bool,
}

impl<A: BracketApi> Reconciler<A> {
    #[must_use]
    pub fn new(api: A, config: &SyncConfig) -> Self {
        Self {
            api,
            game_id: config.game_id,
            strict_existence_check: config.strict_existence_check,
            strict_status_probe: config.strict_status_probe,
        }
    }

    #[must_use]
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Creates or updates `tournament` on Challonge with the owner's
    /// credentials. Nothing local is changed.
    ///
    /// # Errors
    ///
    /// If the owner has no API key, the tournament or the old address is
    /// invalid, Challonge can't be reached, or Challonge rejects the create or
    /// update.
    pub fn reconcile(
        &self,
        tournament: &LocalTournament,
        owner: &Account,
        intent: &Intent,
    ) -> Result<Reconciliation, SyncError> {
        let credentials = owner.credentials()?;
        tournament.validate()?;
        if let Intent::Update {
            old_address: Some(old_address),
        } = intent
        {
            validate_address(old_address)?;
        }

        match intent {
            Intent::Update {
                old_address: Some(old_address),
            } => self.update(&credentials, tournament, old_address),
            Intent::Update { old_address: None } => {
                self.update(&credentials, tournament, &tournament.external_id)
            }
            Intent::Create => match self.existence(&credentials, &tournament.external_id) {
                Existence::Present => {
                    info!(
                        "{} already exists on Challonge, updating it instead",
                        tournament.external_id
                    );
                    self.update(&credentials, tournament, &tournament.external_id)
                }
                Existence::Unknown(reason) if self.strict_existence_check => {
                    Err(SyncError::Indeterminate(format!(
                        "can't confirm {} is absent from Challonge: {reason}",
                        tournament.external_id
                    )))
                }
                Existence::Absent | Existence::Unknown(_) => self.create(&credentials, tournament),
            },
        }
    }

    /// Looks the address up on Challonge. Never fails; the reason for an
    /// unknown answer is logged.
    pub fn existence(&self, credentials: &OwnerCredentials, address: &str) -> Existence {
        match self.api.show(credentials, address) {
            Ok(response) if response.is_success() => Existence::Present,
            Ok(response) if response.status == 404 => Existence::Absent,
            Ok(response) => {
                let reason = format!("HTTP {}", response.status);
                warn!("existence check for {address}: {reason}");
                Existence::Unknown(reason)
            }
            Err(error) => {
                warn!("existence check for {address}: {error}");
                Existence::Unknown(error.to_string())
            }
        }
    }

    /// The tournament's lifecycle state, `None` if Challonge didn't report one.
    ///
    /// # Errors
    ///
    /// If the tournament can't be fetched.
    pub fn probe_state(
        &self,
        credentials: &OwnerCredentials,
        address: &str,
    ) -> Result<Option<TournamentState>, SyncError> {
        let response = self.api.show(credentials, address)?;
        if !response.is_success() {
            return Err(SyncError::external(response.status, response.body));
        }

        let state = response
            .tournament()
            .and_then(|tournament| tournament.get("state"))
            .and_then(Value::as_str)
            .and_then(|state| state.parse().ok());

        Ok(state)
    }

    /// Whether the tournament has left sign up. A failed probe counts as not
    /// started unless the status probe is strict.
    pub fn has_started(&self, credentials: &OwnerCredentials, address: &str) -> bool {
        match self.probe_state(credentials, address) {
            Ok(state) => state.is_some_and(|state| state.has_started()),
            Err(error) => {
                warn!(
                    "status probe for {address}: {error}, assuming {}",
                    if self.strict_status_probe {
                        "started"
                    } else {
                        "not started"
                    }
                );
                self.strict_status_probe
            }
        }
    }

    fn create(
        &self,
        credentials: &OwnerCredentials,
        tournament: &LocalTournament,
    ) -> Result<Reconciliation, SyncError> {
        let start_at = tournament.start_at(Utc::now());
        let request = CreateRequest {
            tournament: NewTournament::new(tournament, start_at, self.game_id),
        };

        let response = self.api.create(credentials, &request)?;
        let response = Self::check(response)?;

        let mut address = tournament.external_id.clone();
        if let Some(url) = response
            .tournament()
            .and_then(|tournament| tournament.get("url"))
            .and_then(Value::as_str)
            && url != tournament.external_id
        {
            error!(
                "Challonge created {} at {url} instead of {}",
                tournament.name, tournament.external_id
            );
            address = url.to_string();
        }

        info!("created {address} on Challonge");
        Ok(Reconciliation {
            action: Action::Created,
            message: format!("Tournament created on Challonge at {address}"),
            address,
            payload: response.body,
        })
    }

    fn update(
        &self,
        credentials: &OwnerCredentials,
        tournament: &LocalTournament,
        address: &str,
    ) -> Result<Reconciliation, SyncError> {
        let start_at = if self.has_started(credentials, address) {
            info!("{address} has started, leaving its start time alone");
            None
        } else {
            Some(timestamp(tournament.start_at(Utc::now())))
        };

        let url = (tournament.external_id != address).then(|| {
            info!("renaming {address} to {}", tournament.external_id);
            tournament.external_id.clone()
        });

        let request = UpdateRequest {
            tournament: TournamentChanges {
                name: tournament.name.clone(),
                description: tournament.description.clone(),
                start_at,
                url,
            },
        };

        let response = self.api.update(credentials, address, &request)?;
        let response = Self::check(response)?;

        info!("updated {} on Challonge", tournament.external_id);
        Ok(Reconciliation {
            action: Action::Updated,
            address: tournament.external_id.clone(),
            message: format!(
                "Tournament updated on Challonge at {}",
                tournament.external_id
            ),
            payload: response.body,
        })
    }

    fn check(response: ApiResponse) -> Result<ApiResponse, SyncError> {
        if response.is_success() {
            Ok(response)
        } else {
            Err(SyncError::external(response.status, response.body))
        }
    }
}
