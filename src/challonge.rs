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

use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, trace};
use reqwest::blocking::{Client, RequestBuilder};
use serde::Serialize;
use serde_json::Value;

use crate::{
    accounts::OwnerCredentials, config::SyncConfig, error::SyncError,
    tournament::LocalTournament,
};

pub const TIE_BREAKS: [&str; 3] = ["match wins vs tied", "median buchholz", "points scored"];

/// A response from Challonge, whatever its status.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The `tournament` object Challonge wraps every answer in.
    #[must_use]
    pub fn tournament(&self) -> Option<&Value> {
        self.body.get("tournament")
    }
}

/// The three Challonge calls reconciliation needs.
///
/// Only a failure to get any response is an error; non-2xx statuses come back
/// as an [`ApiResponse`].
pub trait BracketApi {
    /// `GET /tournaments/{address}.json`
    ///
    /// # Errors
    ///
    /// If no response was received.
    fn show(
        &self,
        credentials: &OwnerCredentials,
        address: &str,
    ) -> Result<ApiResponse, SyncError>;

    /// `POST /tournaments.json`
    ///
    /// # Errors
    ///
    /// If no response was received.
    fn create(
        &self,
        credentials: &OwnerCredentials,
        request: &CreateRequest,
    ) -> Result<ApiResponse, SyncError>;

    /// `PUT /tournaments/{address}.json`
    ///
    /// # Errors
    ///
    /// If no response was received.
    fn update(
        &self,
        credentials: &OwnerCredentials,
        address: &str,
        request: &UpdateRequest,
    ) -> Result<ApiResponse, SyncError>;
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CreateRequest {
    pub tournament: NewTournament,
}

/// A Swiss group stage followed by a single elimination bracket.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewTournament {
    pub name: String,
    pub url: String,
    pub tournament_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_id: Option<u64>,
    pub description: String,
    pub start_at: String,
    pub group_stages_enabled: bool,
    pub tie_breaks: Vec<String>,
    pub group_stage_type: String,
    pub swiss_rounds: u32,
    pub show_rounds: bool,
    pub accept_attachments: bool,
    pub ranked_by: String,
    pub allow_participant_match_reporting: bool,
    pub pts_for_match_win: String,
    pub pts_for_match_tie: String,
    pub pts_for_bye: String,
    pub consolation_matches_target_rank: u32,
    pub hold_third_place_match: bool,
}

impl NewTournament {
    #[must_use]
    pub fn new(
        tournament: &LocalTournament,
        start_at: DateTime<Utc>,
        game_id: Option<u64>,
    ) -> Self {
        Self {
            name: tournament.name.clone(),
            url: tournament.external_id.clone(),
            tournament_type: "single elimination".to_string(),
            game_id,
            description: tournament.description.clone(),
            start_at: timestamp(start_at),
            group_stages_enabled: true,
            tie_breaks: TIE_BREAKS.iter().map(ToString::to_string).collect(),
            group_stage_type: "swiss".to_string(),
            swiss_rounds: 4,
            show_rounds: true,
            accept_attachments: true,
            ranked_by: "swiss system points".to_string(),
            allow_participant_match_reporting: true,
            pts_for_match_win: "1.0".to_string(),
            pts_for_match_tie: "0.5".to_string(),
            pts_for_bye: "1.0".to_string(),
            consolation_matches_target_rank: 4,
            hold_third_place_match: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UpdateRequest {
    pub tournament: TournamentChanges,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TournamentChanges {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_at: Option<String>,
    /// A new address, renaming the tournament in place.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[must_use]
pub fn timestamp(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// The real Challonge v1 API over blocking HTTP.
#[derive(Clone, Debug)]
pub struct ChallongeClient {
    client: Client,
    api_base: String,
}

impl ChallongeClient {
    /// # Errors
    ///
    /// If the HTTP client can't be built.
    pub fn new(config: &SyncConfig) -> Result<Self, SyncError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("bracket-sync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|error| SyncError::Configuration(format!("HTTP client: {error}")))?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    fn tournament_url(&self, address: &str) -> String {
        format!("{}/tournaments/{address}.json", self.api_base)
    }

    fn send(
        request: RequestBuilder,
        credentials: &OwnerCredentials,
    ) -> Result<ApiResponse, SyncError> {
        let response = request
            .basic_auth(&credentials.username, Some(&credentials.api_key))
            .header("Accept", "application/json")
            .send()
            .map_err(|error| SyncError::Transport(error.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .map_err(|error| SyncError::Transport(error.to_string()))?;
        trace!("challonge {status}: {text}");

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        Ok(ApiResponse { status, body })
    }
}

impl BracketApi for ChallongeClient {
    fn show(
        &self,
        credentials: &OwnerCredentials,
        address: &str,
    ) -> Result<ApiResponse, SyncError> {
        let url = self.tournament_url(address);
        debug!("GET {url}");

        Self::send(self.client.get(url), credentials)
    }

    fn create(
        &self,
        credentials: &OwnerCredentials,
        request: &CreateRequest,
    ) -> Result<ApiResponse, SyncError> {
        let url = format!("{}/tournaments.json", self.api_base);
        debug!("POST {url} {request:?}");

        Self::send(self.client.post(url).json(request), credentials)
    }

    fn update(
        &self,
        credentials: &OwnerCredentials,
        address: &str,
        request: &UpdateRequest,
    ) -> Result<ApiResponse, SyncError> {
        let url = self.tournament_url(address);
        debug!("PUT {url} {request:?}");

        Self::send(self.client.put(url).json(request), credentials)
    }
}
