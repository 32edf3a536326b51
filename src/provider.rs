use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use crate::config::Config;
use crate::error::FetchError;
use crate::http_client::http_client;
use crate::season::{self, SeasonBatch, SeasonRange};
use crate::standings::{self, StandingsTable};
use crate::state::{Delta, ProviderCommand};

/// Where the worker gets league data from.
pub trait ResultsSource {
    fn standings(&self) -> Result<StandingsTable, FetchError>;

    fn season(
        &self,
        participant_id: &str,
        range: SeasonRange,
        active_team: Option<&str>,
    ) -> Result<SeasonBatch, FetchError>;
}

#[derive(Debug, Clone)]
pub struct GraphQlSource {
    config: Config,
}

impl GraphQlSource {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ResultsSource for GraphQlSource {
    fn standings(&self) -> Result<StandingsTable, FetchError> {
        let client = http_client(self.config.request_timeout)?;
        standings::fetch_standings(client, &self.config)
    }

    fn season(
        &self,
        participant_id: &str,
        range: SeasonRange,
        active_team: Option<&str>,
    ) -> Result<SeasonBatch, FetchError> {
        let client = http_client(self.config.request_timeout)?;
        season::fetch_season(client, &self.config, participant_id, range, active_team)
    }
}

pub fn spawn_provider<S>(source: S, tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>)
where
    S: ResultsSource + Send + 'static,
{
    thread::spawn(move || {
        for cmd in cmd_rx {
            if tx.send(handle_command(&source, cmd)).is_err() {
                log::info!("ui gone, provider exiting");
                return;
            }
        }
    });
}

pub fn handle_command<S: ResultsSource + ?Sized>(source: &S, cmd: ProviderCommand) -> Delta {
    match cmd {
        ProviderCommand::FetchStandings => {
            log::info!("fetching standings");
            match source.standings() {
                Ok(table) => Delta::SetStandings(table),
                Err(error) => {
                    log::warn!("standings fetch failed: {error}");
                    Delta::StandingsFailed { error }
                }
            }
        }
        ProviderCommand::FetchSeason {
            generation,
            participant_id,
            team,
            range,
        } => {
            log::info!(
                "fetching season {}..{} for {participant_id} (gen {generation})",
                range.from_param(),
                range.to_param()
            );
            match source.season(&participant_id, range, team.as_deref()) {
                Ok(batch) => {
                    if batch.unmatched > 0 {
                        log::warn!(
                            "{} event(s) for {participant_id} did not name {:?}",
                            batch.unmatched,
                            team
                        );
                    }
                    Delta::SetSeason {
                        generation,
                        participant_id,
                        batch,
                    }
                }
                Err(error) => {
                    log::warn!("season fetch failed for {participant_id}: {error}");
                    Delta::SeasonFailed { generation, error }
                }
            }
        }
    }
}
