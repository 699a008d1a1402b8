//! Console driver for the Battle Tower.
//!
//! Reads one command per line from stdin. Battles are held by an in-process
//! host; report their results with `end <battle id> [winner]`.

use battle_tower::logging::init_tracing;
use battle_tower::tower_interface::*;
use battle_tower::{BattleTower, LocalBattleHost, PlayerId, TowerConfig};
use std::io::{self, BufRead, Write};
use std::path::Path;

fn main() {
    init_tracing();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "tower.ron".to_string());
    let config = match TowerConfig::load(Path::new(&config_path)) {
        Ok(config) => config.with_env_overrides(),
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return;
        }
    };

    let mut tower = BattleTower::open(config);
    let mut host = LocalBattleHost::new();

    println!("Battle Tower console. Type 'help' for commands, 'quit' to exit.");
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                eprintln!("Error reading input: {}", e);
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" || line == "exit" {
            break;
        }

        let reply = handle_line(&mut tower, &mut host, line);
        println!("{}", reply);
        let _ = io::stdout().flush();
    }

    tower.save();
}

fn handle_line(tower: &mut BattleTower, host: &mut LocalBattleHost, line: &str) -> String {
    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    match command.to_lowercase().as_str() {
        "start" => {
            let (name, args) = rest.split_once(' ').unwrap_or((rest, ""));
            if name.is_empty() {
                return "Who is starting? (e.g., 'start ash')".to_string();
            }
            reply(handle_start(tower, host, &PlayerId::new(name), args))
        }
        "team" => {
            let (name, target) = rest.split_once(' ').unwrap_or((rest, ""));
            if name.is_empty() {
                return "Whose team? (e.g., 'team ash')".to_string();
            }
            reply(handle_view_team(tower, &PlayerId::new(name), target))
        }
        "pool" => {
            if rest.is_empty() {
                return "Which team? Use 'teams' to list them.".to_string();
            }
            reply(display_rental_team(tower, rest))
        }
        "teams" => display_team_list(tower),
        "streak" => {
            if rest.is_empty() {
                return "Whose streak? (e.g., 'streak ash')".to_string();
            }
            display_streak(tower, &PlayerId::new(rest))
        }
        "top" => display_leaderboard(tower),
        "battles" => {
            let lines: Vec<String> = host
                .battles()
                .map(|(id, request)| format!("  {} - {}", id, request.title))
                .collect();
            if lines.is_empty() {
                "No battles in progress.".to_string()
            } else {
                format!("Battles in progress:\n{}", lines.join("\n"))
            }
        }
        "end" => handle_end(tower, host, rest),
        "reload" => {
            tower.reload_pools();
            display_team_list(tower)
        }
        "help" => help_text(),
        _ => format!("Unknown command '{}'. Type 'help' for commands.", command),
    }
}

fn handle_end(tower: &mut BattleTower, host: &mut LocalBattleHost, args: &str) -> String {
    let mut parts = args.split_whitespace();
    let Some(battle_id) = parts.next() else {
        return "Which battle? (e.g., 'end battletower-1 ash')".to_string();
    };
    let winner = parts.next().map(PlayerId::new);

    let Some(request) = host.finish(battle_id) else {
        return format!("No battle '{}' is in progress.", battle_id);
    };
    match tower.on_battle_end(battle_id, winner.as_ref(), &request.participants()) {
        Some(outcome) => display_battle_outcome(&outcome),
        None => format!("Battle '{}' was not a tracked Battle Tower match.", battle_id),
    }
}

fn reply(result: Result<String, String>) -> String {
    match result {
        Ok(text) => text,
        Err(e) => format!("Error: {}", e),
    }
}
