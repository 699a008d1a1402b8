//! Text command surface for the Battle Tower.
//!
//! These functions turn tower state into plain text replies. The console
//! driver and the MCP server both go through them, so they stay free of any
//! transport detail.

use crate::host::BattleHost;
use crate::tower::{BattleOutcome, BattleTower, RunResult};
use schema::{PlayerId, RosterEntity};

/// Handles `start [args]`: begin or continue the player's run.
pub fn handle_start<H: BattleHost + ?Sized>(
    tower: &mut BattleTower,
    host: &mut H,
    player: &PlayerId,
    args: &str,
) -> Result<String, String> {
    if !args.trim().is_empty() {
        return Err(
            "Start no longer accepts a team ID. Use 'teams' to see the available Pokémon pools."
                .to_string(),
        );
    }

    let started = tower.start_run(player, host).map_err(|e| e.to_string())?;
    let mut output = format!(
        "Starting a Battle Tower match with a team of {} Pokémon...\n",
        started.team.len()
    );
    output.push_str(&format!(
        "Battle: {} ({})\n",
        started.handle.title, started.handle.battle_id
    ));
    output.push_str(&format!(
        "Your team: {}\n",
        species_list(&started.team)
    ));
    output.push_str(&format!(
        "Opponent brings {} Pokémon.",
        started.opponent.len()
    ));
    Ok(output)
}

/// Handles `team [team id]`: the player's current team, or a named rental team.
pub fn handle_view_team(tower: &BattleTower, player: &PlayerId, target: &str) -> Result<String, String> {
    let target = target.trim();
    if target.is_empty() {
        display_current_team(tower, player)
    } else {
        display_rental_team(tower, target)
    }
}

pub fn display_current_team(tower: &BattleTower, player: &PlayerId) -> Result<String, String> {
    let team = tower
        .active_team(player)
        .map_err(|e| format!("{} Use 'start' to begin a run.", e))?;
    Ok(format_team("Your Current Battle Tower Team", team))
}

pub fn display_rental_team(tower: &BattleTower, team_id: &str) -> Result<String, String> {
    let team = tower
        .rental_team(team_id)
        .map_err(|e| format!("{} Use 'teams' to see available teams.", e))?;
    Ok(format_team(&format!("{} Team", team.name), &team.pokemons))
}

/// Lists the rental teams whose members make up the player pool.
pub fn display_team_list(tower: &BattleTower) -> String {
    let teams = tower.rental_teams();
    if teams.is_empty() {
        return "There are no rental Pokémon pools available at this time.".to_string();
    }

    let policy = tower.policy();
    let mut output = String::from("Available Rental Pokémon Pools:\n");
    output.push_str(&format!(
        "Your team starts with 1 random Pokémon from these pools and gains one more every {} wins, up to {}.\n",
        policy.growth_interval, policy.max_team_size
    ));
    for team in &teams {
        output.push_str(&format!("  - {} ({})\n", team.name, team.id));
    }
    output.push_str("Use 'start' to begin your battle.");
    output
}

pub fn display_streak(tower: &BattleTower, player: &PlayerId) -> String {
    let record = tower.streak(player);
    format!(
        "{} has a current win streak of {} and a max win streak of {}.",
        player, record.current, record.max
    )
}

pub fn display_leaderboard(tower: &BattleTower) -> String {
    let entries = tower.leaderboard(tower.config().leaderboard_size);
    if entries.is_empty() {
        return "There are no win streaks to display yet.".to_string();
    }

    let mut output = format!(
        "{:<5} {:<20} {:>8} {:>8}\n",
        "Rank", "Player", "Current", "Max"
    );
    for (i, entry) in entries.iter().enumerate() {
        output.push_str(&format!(
            "{:<5} {:<20} {:>8} {:>8}\n",
            i + 1,
            entry.player,
            entry.record.current,
            entry.record.max
        ));
    }
    output
}

pub fn display_battle_outcome(outcome: &BattleOutcome) -> String {
    match outcome.result {
        RunResult::Won => format!(
            "Congratulations, {}! You've won!\nCurrent Win Streak: {} (Max: {})\nYour team size for the next battle will be {} Pokémon.",
            outcome.player,
            outcome.record.current,
            outcome.record.max,
            outcome.next_team_size
        ),
        RunResult::Lost => format!(
            "Defeat! {}'s Battle Tower run has ended. Use 'start' to try again.",
            outcome.player
        ),
    }
}

pub fn help_text() -> String {
    [
        "start <player> - Starts a new Battle Tower match or resumes the current run.",
        "teams - Shows the pools of Pokémon used to generate teams.",
        "team <player> [team id] - Displays the player's current Battle Tower team, or a rental team.",
        "pool <team id> - Displays a pre-defined team from the rental pool.",
        "streak <player> - Checks the current and max win streaks of a player.",
        "top - Displays the top win streaks.",
    ]
    .join("\n")
}

fn species_list(team: &[RosterEntity]) -> String {
    team.iter()
        .map(|p| p.species.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_team(title: &str, team: &[RosterEntity]) -> String {
    let mut output = format!("--- {} ---\n", title);
    for (i, pokemon) in team.iter().enumerate() {
        let pokemon_display = pokemon.to_string();
        let mut lines = pokemon_display.lines();
        if let Some(first_line) = lines.next() {
            output.push_str(&format!(" {}. {}\n", i + 1, first_line));
        }
        for line in lines {
            output.push_str(&format!("    {}\n", line));
        }
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::LocalBattleHost;
    use crate::tests::common::TowerFixture;

    #[test]
    fn test_start_rejects_arguments() {
        let mut fixture = TowerFixture::new();
        let mut host = LocalBattleHost::new();
        let result = handle_start(&mut fixture.tower, &mut host, &PlayerId::new("ash"), "sandcore");
        assert!(result.unwrap_err().contains("no longer accepts"));
        assert_eq!(host.battles().count(), 0);
    }

    #[test]
    fn test_start_reports_team_size() {
        let mut fixture = TowerFixture::new();
        let mut host = LocalBattleHost::new();
        let text = handle_start(&mut fixture.tower, &mut host, &PlayerId::new("ash"), "").unwrap();
        assert!(text.starts_with("Starting a Battle Tower match with a team of 1 Pokémon"));
        assert!(text.contains("battletower-1"));
    }

    #[test]
    fn test_start_twice_reports_already_active() {
        let mut fixture = TowerFixture::new();
        let mut host = LocalBattleHost::new();
        let ash = PlayerId::new("ash");
        handle_start(&mut fixture.tower, &mut host, &ash, "").unwrap();
        let err = handle_start(&mut fixture.tower, &mut host, &ash, "").unwrap_err();
        assert!(err.contains("already in a Battle Tower battle"));
    }

    #[test]
    fn test_view_team_without_run() {
        let fixture = TowerFixture::new();
        let err = handle_view_team(&fixture.tower, &PlayerId::new("ash"), "").unwrap_err();
        assert!(err.contains("does not have an active Battle Tower team"));
    }

    #[test]
    fn test_view_named_rental_team() {
        let fixture = TowerFixture::new();
        let text = handle_view_team(&fixture.tower, &PlayerId::new("ash"), "Kanto").unwrap();
        assert!(text.starts_with("--- Kanto Classics Team ---"));
        assert!(text.contains(" 1. Pikachu"));
        assert!(handle_view_team(&fixture.tower, &PlayerId::new("ash"), "missing").is_err());
    }

    #[test]
    fn test_team_list_names_every_team() {
        let fixture = TowerFixture::new();
        let text = display_team_list(&fixture.tower);
        assert!(text.contains("Kanto Classics (kanto)"));
        assert!(text.contains("Johto Picks (johto)"));
    }

    #[test]
    fn test_empty_leaderboard_placeholder() {
        let fixture = TowerFixture::new();
        assert_eq!(
            display_leaderboard(&fixture.tower),
            "There are no win streaks to display yet."
        );
    }

    #[test]
    fn test_streak_for_unknown_player_is_zero() {
        let fixture = TowerFixture::new();
        assert_eq!(
            display_streak(&fixture.tower, &PlayerId::new("Gary")),
            "gary has a current win streak of 0 and a max win streak of 0."
        );
    }

    #[test]
    fn test_win_outcome_mentions_next_team_size() {
        let mut fixture = TowerFixture::new();
        let mut host = LocalBattleHost::new();
        let ash = PlayerId::new("ash");
        let started = fixture.tower.start_run(&ash, &mut host).unwrap();
        let outcome = fixture
            .tower
            .on_battle_end(&started.handle.battle_id, Some(&ash), &[ash.clone()])
            .unwrap();
        let text = display_battle_outcome(&outcome);
        assert!(text.contains("Current Win Streak: 1 (Max: 1)"));
        assert!(text.contains("next battle will be 1 Pokémon"));
    }
}
