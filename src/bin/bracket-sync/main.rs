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

#![deny(clippy::expect_used)]
#![deny(clippy::indexing_slicing)]
#![deny(clippy::panic)]
#![deny(clippy::unwrap_used)]

mod command_line;

use bracket_sync::{
    CONFIG_FILE, LEAGUE_FILE,
    challonge::ChallongeClient,
    config::SyncConfig,
    league::League,
    reconcile::{Intent, Reconciler},
    utils::{self, create_data_folder, data_file},
};
use clap::Parser;
use log::{error, info};

use crate::command_line::Args;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    utils::init_logger(args.debug, args.systemd);

    if args.man {
        return Args::generate_man_page();
    }

    let Some(id) = args.tournament else {
        return Err(anyhow::Error::msg("--tournament is required"));
    };

    create_data_folder()?;

    let mut config = SyncConfig::load(&data_file(CONFIG_FILE))?;
    args.apply(&mut config);

    let league_file = data_file(LEAGUE_FILE);
    let mut league = League::load(&league_file)?;
    let reconciler = Reconciler::new(ChallongeClient::new(&config)?, &config);

    if args.status {
        let (tournament, owner) = league.owner_of(id)?;
        let state = reconciler.probe_state(&owner.credentials()?, &tournament.external_id)?;

        match state {
            Some(state) => println!("{} {state}", tournament.external_id),
            None => println!("{} unknown", tournament.external_id),
        }
        return Ok(());
    }

    let mut intent = Intent::new(args.update, args.old_url.clone());
    if let Some(address) = &args.rename {
        let old_address = league.rename_tournament(id, address)?;
        info!("tournament {id}: renaming {old_address} to {address}");
        intent = Intent::Update {
            old_address: Some(old_address),
        };
    }

    match league.sync_tournament(&reconciler, id, &intent) {
        Ok(reconciliation) => {
            league.save(&league_file)?;
            println!("{}", serde_json::to_string_pretty(&reconciliation)?);
            Ok(())
        }
        Err(err) => {
            if err.is_retryable() {
                error!("tournament {id}: {err} (retryable)");
            } else {
                error!("tournament {id}: {err}");
            }
            Err(err.into())
        }
    }
}
