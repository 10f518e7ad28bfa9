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

use std::{
    fs::{self, File},
    io::{ErrorKind, Write},
    path::Path,
};

use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    Id,
    accounts::{Account, Accounts},
    challonge::BracketApi,
    error::SyncError,
    reconcile::{Intent, Reconciler, Reconciliation},
    tournament::{LocalTournament, Tournaments, validate_address},
};

/// The league's accounts and tournaments, as kept in `league.ron`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct League {
    #[serde(default)]
    pub accounts: Accounts,
    #[serde(default)]
    pub tournaments: Tournaments,
}

impl League {
    /// A missing file gives an empty league.
    ///
    /// # Errors
    ///
    /// If the file can't be read or isn't valid RON.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        match &fs::read_to_string(path) {
            Ok(string) => match ron::from_str(string.as_str()) {
                Ok(league) => Ok(league),
                Err(err) => Err(anyhow::Error::msg(format!(
                    "RON: {}: {err}",
                    path.display(),
                ))),
            },
            Err(err) => match err.kind() {
                ErrorKind::NotFound => Ok(Self::default()),
                _ => Err(anyhow::Error::msg(err.to_string())),
            },
        }
    }

    /// # Errors
    ///
    /// If the league can't be serialized or written.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        let mut file = File::create(path)?;
        file.write_all(string.as_bytes())?;
        Ok(())
    }

    /// # Errors
    ///
    /// If there is no such tournament, or its owner has no account.
    pub fn owner_of(&self, id: Id) -> Result<(&LocalTournament, &Account), SyncError> {
        let Some(tournament) = self.tournaments.0.get(&id) else {
            return Err(SyncError::InvalidTournament(format!(
                "there is no tournament {id}"
            )));
        };

        let Some(owner) = self.accounts.0.get(&tournament.owner) else {
            return Err(SyncError::Configuration(format!(
                "the owner {} of tournament {id} has no account",
                tournament.owner
            )));
        };

        Ok((tournament, owner))
    }

    /// Gives the tournament a new Challonge address and returns the old one.
    ///
    /// # Errors
    ///
    /// If there is no such tournament or the address is invalid.
    pub fn rename_tournament(&mut self, id: Id, address: &str) -> Result<String, SyncError> {
        validate_address(address)?;

        let Some(tournament) = self.tournaments.0.get_mut(&id) else {
            return Err(SyncError::InvalidTournament(format!(
                "there is no tournament {id}"
            )));
        };

        Ok(std::mem::replace(
            &mut tournament.external_id,
            address.to_string(),
        ))
    }

    /// Reconciles one tournament and records where it lives on Challonge.
    /// Nothing changes if reconciliation fails.
    ///
    /// # Errors
    ///
    /// See [`Reconciler::reconcile`] and [`League::owner_of`].
    pub fn sync_tournament<A: BracketApi>(
        &mut self,
        reconciler: &Reconciler<A>,
        id: Id,
        intent: &Intent,
    ) -> Result<Reconciliation, SyncError> {
        let (tournament, owner) = self.owner_of(id)?;
        let reconciliation = reconciler.reconcile(tournament, owner, intent)?;

        if let Some(tournament) = self.tournaments.0.get_mut(&id)
            && tournament.external_id != reconciliation.address
        {
            info!(
                "tournament {id}: {} -> {}",
                tournament.external_id, reconciliation.address
            );
            tournament.external_id.clone_from(&reconciliation.address);
        }

        Ok(reconciliation)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{
        config::SyncConfig,
        reconcile::{
            Action,
            tests::{FakeApi, not_found, ok, owner, tournament},
        },
    };

    use super::*;

    fn league() -> League {
        let mut league = League::default();
        league.accounts.0.insert(1, owner());
        league.tournaments.0.insert(12, tournament("spring_open"));
        league
    }

    #[test]
    fn sync_records_the_challonge_address() -> anyhow::Result<()> {
        let mut league = league();
        let reconciler = Reconciler::new(
            FakeApi::default()
                .show_returns(Ok(not_found()))
                .write_returns(Ok(ok(json!({"tournament": {"url": "spring_open_2"}})))),
            &SyncConfig::default(),
        );

        let result = league.sync_tournament(&reconciler, 12, &Intent::Create)?;

        assert_eq!(result.action, Action::Created);
        assert_eq!(league.tournaments.0[&12].external_id, "spring_open_2");
        Ok(())
    }

    #[test]
    fn rename_then_update() -> anyhow::Result<()> {
        let mut league = league();
        let reconciler = Reconciler::new(FakeApi::default(), &SyncConfig::default());

        let old_address = league.rename_tournament(12, "spring_major")?;
        assert_eq!(old_address, "spring_open");

        let intent = Intent::Update {
            old_address: Some(old_address),
        };
        league.sync_tournament(&reconciler, 12, &intent)?;

        let updates = reconciler.api().updates();
        assert_eq!(updates[0].0, "spring_open");
        assert_eq!(updates[0].1.tournament.url.as_deref(), Some("spring_major"));
        assert_eq!(league.tournaments.0[&12].external_id, "spring_major");
        Ok(())
    }

    #[test]
    fn rename_rejects_bad_addresses() {
        let mut league = league();

        assert!(league.rename_tournament(12, "spring major").is_err());
        assert!(league.rename_tournament(99, "spring_major").is_err());
        assert_eq!(league.tournaments.0[&12].external_id, "spring_open");
    }

    #[test]
    fn unknown_tournament_or_owner() {
        let mut league = league();
        let reconciler = Reconciler::new(FakeApi::default(), &SyncConfig::default());

        assert!(matches!(
            league.sync_tournament(&reconciler, 99, &Intent::Create),
            Err(SyncError::InvalidTournament(_))
        ));

        league.accounts.0.clear();
        assert!(matches!(
            league.sync_tournament(&reconciler, 12, &Intent::Create),
            Err(SyncError::Configuration(_))
        ));
        assert!(reconciler.api().calls.borrow().is_empty());
    }

    #[test]
    fn failed_sync_changes_nothing() {
        let mut league = league();
        league.accounts.0.insert(
            1,
            Account {
                username: "ash".to_string(),
                ..Account::default()
            },
        );
        let before = league.clone();
        let reconciler = Reconciler::new(FakeApi::default(), &SyncConfig::default());

        assert!(
            league
                .sync_tournament(&reconciler, 12, &Intent::Create)
                .is_err()
        );
        assert_eq!(league, before);
    }

    #[test]
    fn save_and_load() -> anyhow::Result<()> {
        let path = std::env::temp_dir().join(format!("bracket-sync-{}.ron", std::process::id()));
        let mut league = league();
        if let Some(tournament) = league.tournaments.0.get_mut(&12) {
            tournament.scheduled_date = Some("2025-05-03T16:00:00Z".parse()?);
        }

        league.save(&path)?;
        let loaded = League::load(&path)?;
        fs::remove_file(&path)?;

        assert_eq!(loaded, league);
        Ok(())
    }

    #[test]
    fn missing_file_is_an_empty_league() -> anyhow::Result<()> {
        let path = std::env::temp_dir().join("bracket-sync-no-such-league.ron");
        assert_eq!(League::load(&path)?, League::default());
        Ok(())
    }
}
