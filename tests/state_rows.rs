use eliteserien_terminal::season::{SeasonRange, SeasonRow};
use eliteserien_terminal::standings::{StandingsRow, StandingsTable};
use eliteserien_terminal::state::{
    AppState, Delta, Focus, LoadStatus, ProviderCommand, SeasonSort, SortMode, apply_delta,
};

fn row(id: &str, team: &str, rank: u32, points: Option<f64>, gf: f64, ga: f64) -> StandingsRow {
    let mut row = StandingsRow::new(id, team, rank);
    row.points = points;
    row.goals_for = Some(gf);
    row.goals_against = Some(ga);
    row
}

fn loaded_state() -> AppState {
    let mut state = AppState::new();
    apply_delta(
        &mut state,
        Delta::SetStandings(StandingsTable {
            stage_name: Some("Eliteserien".to_string()),
            rows: vec![
                row("t1", "Bodø/Glimt", 1, Some(60.0), 40.0, 20.0),
                row("t2", "Molde", 2, Some(59.0), 58.0, 31.0),
                row("t3", "Aalesund", 3, None, 10.0, 12.0),
            ],
        }),
    );
    state
}

fn range() -> SeasonRange {
    SeasonRange::for_year(2022).expect("valid year")
}

#[test]
fn standings_request_is_issued_once() {
    let mut state = AppState::new();
    assert_eq!(state.request_standings(), Some(ProviderCommand::FetchStandings));
    assert_eq!(state.standings_status, LoadStatus::Loading);
    assert_eq!(state.request_standings(), None);
}

#[test]
fn standings_request_skipped_when_rows_present() {
    let mut state = loaded_state();
    assert_eq!(state.standings_status, LoadStatus::Loaded);
    assert_eq!(state.request_standings(), None);
    assert_eq!(state.retry_standings(), None);
}

#[test]
fn select_row_without_id_is_noop() {
    let mut state = loaded_state();
    state.season = vec![];
    let before = state.season_generation;
    assert_eq!(state.select_row(None, None, range()), None);
    assert_eq!(state.season_generation, before);
    assert_eq!(state.season_status, LoadStatus::Idle);
    assert!(state.season.is_empty());
}

#[test]
fn select_row_issues_season_fetch_every_time() {
    let mut state = loaded_state();
    let first = state.select_row(
        Some("t1".to_string()),
        Some("Bodø/Glimt".to_string()),
        range(),
    );
    let second = state.select_row(
        Some("t1".to_string()),
        Some("Bodø/Glimt".to_string()),
        range(),
    );

    assert!(matches!(first, Some(ProviderCommand::FetchSeason { generation: 1, .. })));
    match second {
        Some(ProviderCommand::FetchSeason {
            generation,
            participant_id,
            team,
            range: r,
        }) => {
            assert_eq!(generation, 2);
            assert_eq!(participant_id, "t1");
            assert_eq!(team.as_deref(), Some("Bodø/Glimt"));
            assert_eq!(r.from_param(), "2022-01-01");
            assert_eq!(r.to_param(), "2022-12-31");
        }
        other => panic!("expected season fetch, got {other:?}"),
    }
    assert_eq!(state.season_status, LoadStatus::Loading);
    assert_eq!(state.active_team_id.as_deref(), Some("t1"));
}

#[test]
fn heading_switches_on_active_team() {
    let mut state = loaded_state();
    assert_eq!(
        state.season_heading(),
        "Select a team to view matches this season"
    );
    state.select_current(range());
    assert_eq!(state.season_heading(), "Bodø/Glimt 2022 Season");
}

#[test]
fn sort_changes_view_not_held_order() {
    let mut state = loaded_state();
    state.sort = SortMode::GoalsFor;
    let view: Vec<_> = state.standings_view().iter().map(|r| r.id.clone()).collect();
    assert_eq!(view, ["t2", "t1", "t3"]);

    let held: Vec<_> = state.standings.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(held, ["t1", "t2", "t3"]);
}

#[test]
fn missing_stats_sort_last() {
    let mut state = loaded_state();
    state.sort = SortMode::Points;
    let view: Vec<_> = state.standings_view().iter().map(|r| r.id.clone()).collect();
    assert_eq!(view, ["t1", "t2", "t3"]);

    state.sort = SortMode::Team;
    let view: Vec<_> = state.standings_view().iter().map(|r| r.id.clone()).collect();
    assert_eq!(view, ["t3", "t1", "t2"]);
}

#[test]
fn cycle_sort_keeps_cursor_on_same_team() {
    let mut state = loaded_state();
    state.selected = 1;
    // Table -> Points: Molde stays second.
    state.cycle_sort();
    assert_eq!(state.selected_row().map(|r| r.id.as_str()), Some("t2"));
    // Points -> Wins: no wins recorded, stable order keeps Molde second.
    state.cycle_sort();
    assert_eq!(state.sort, SortMode::Wins);
    assert_eq!(state.selected_row().map(|r| r.id.as_str()), Some("t2"));
    // Wins -> GoalsFor: Molde moves to the top.
    state.cycle_sort();
    assert_eq!(state.selected, 0);
    assert_eq!(state.selected_row().map(|r| r.id.as_str()), Some("t2"));
}

#[test]
fn movement_respects_focus() {
    let mut state = loaded_state();
    state.select_next();
    state.select_next();
    state.select_next();
    assert_eq!(state.selected, 2);

    state.toggle_focus();
    assert_eq!(state.focus, Focus::Season);
    state.select_next();
    assert_eq!(state.selected, 2);
    assert_eq!(state.season_scroll, 0);
}

#[test]
fn logs_are_bounded() {
    let mut state = AppState::new();
    for i in 0..250 {
        state.push_log(format!("line {i}"));
    }
    assert_eq!(state.logs.len(), 200);
    assert_eq!(state.logs.front().map(String::as_str), Some("line 50"));
}

fn match_row(date: &str, opponent: &str, stage: &str) -> SeasonRow {
    SeasonRow {
        date: date.to_string(),
        opponent: opponent.to_string(),
        stage: stage.to_string(),
    }
}

#[test]
fn season_sort_changes_view_not_held_order() {
    let mut state = loaded_state();
    state.season = vec![
        match_row("2022-06-12", "Tromsø", "NM Cup"),
        match_row("2022-05-01", "Molde", "Eliteserien"),
        match_row("2022-05-08", "Brann", "Eliteserien"),
    ];
    let opponents = |state: &AppState| -> Vec<String> {
        state.season_view().iter().map(|r| r.opponent.clone()).collect()
    };

    assert_eq!(opponents(&state), ["Tromsø", "Molde", "Brann"]);

    state.focus = Focus::Season;
    state.season_scroll = 2;
    state.cycle_focused_sort();
    assert_eq!(state.season_sort, SeasonSort::Date);
    assert_eq!(state.season_scroll, 0);
    assert_eq!(opponents(&state), ["Molde", "Brann", "Tromsø"]);

    state.cycle_focused_sort();
    assert_eq!(opponents(&state), ["Brann", "Molde", "Tromsø"]);

    state.cycle_focused_sort();
    assert_eq!(state.season_sort, SeasonSort::Stage);
    // Stable: both league matches keep their listed order ahead of the cup tie.
    assert_eq!(opponents(&state), ["Molde", "Brann", "Tromsø"]);

    let held: Vec<_> = state.season.iter().map(|r| r.opponent.as_str()).collect();
    assert_eq!(held, ["Tromsø", "Molde", "Brann"]);
    assert_eq!(state.sort, SortMode::Table);
}
