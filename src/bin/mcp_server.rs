//! Battle Tower MCP Server
//!
//! A Model Context Protocol server (rmcp over stdio) that exposes the Battle
//! Tower command surface as tools. Battles are held by an in-process host and
//! their results are reported back through `report_battle_end`.

use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;

use battle_tower::logging::init_tracing;
use battle_tower::tower_interface::*;
use battle_tower::{BattleTower, LocalBattleHost, PlayerId, TowerConfig};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ErrorData as McpError, *},
    schemars, tool, tool_handler, tool_router, ServerHandler, ServiceExt,
};
use serde::Deserialize;
use tokio::io::{stdin, stdout};
use tokio::sync::Mutex;
use tracing::info;

/// Tower state shared across tool calls
#[derive(Debug)]
struct TowerState {
    tower: BattleTower,
    host: LocalBattleHost,
}

#[derive(Debug, Clone)]
pub struct BattleTowerService {
    tool_router: ToolRouter<BattleTowerService>,
    state: Arc<Mutex<TowerState>>,
}

// Tool request structures
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PlayerRequest {
    #[schemars(description = "Name of the player")]
    pub player: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ViewTeamRequest {
    #[schemars(description = "Name of the player")]
    pub player: String,
    #[schemars(description = "Optional rental team ID to show instead of the player's team")]
    pub team_id: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PoolTeamRequest {
    #[schemars(description = "ID of a rental team, as shown by list_teams")]
    pub team_id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct BattleEndRequest {
    #[schemars(description = "ID of the finished battle, as shown by list_battles")]
    pub battle_id: String,
    #[schemars(description = "Name of the winner; omit for a draw")]
    pub winner: Option<String>,
}

fn text(output: String) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(output)]))
}

fn reply(result: Result<String, String>) -> Result<CallToolResult, McpError> {
    match result {
        Ok(output) => text(output),
        Err(e) => text(format!("Error: {}", e)),
    }
}

#[tool_router]
impl BattleTowerService {
    pub fn new(tower: BattleTower) -> Self {
        Self {
            tool_router: Self::tool_router(),
            state: Arc::new(Mutex::new(TowerState {
                tower,
                host: LocalBattleHost::new(),
            })),
        }
    }

    #[tool(description = "List the rental teams whose Pokemon make up the player pool")]
    async fn list_teams(&self) -> Result<CallToolResult, McpError> {
        let state = self.state.lock().await;
        text(display_team_list(&state.tower))
    }

    #[tool(description = "Show one pre-defined rental team")]
    async fn view_pool_team(
        &self,
        Parameters(request): Parameters<PoolTeamRequest>,
    ) -> Result<CallToolResult, McpError> {
        let state = self.state.lock().await;
        reply(display_rental_team(&state.tower, &request.team_id))
    }

    #[tool(description = "Start a new Battle Tower match or resume the player's current run")]
    async fn start_run(
        &self,
        Parameters(request): Parameters<PlayerRequest>,
    ) -> Result<CallToolResult, McpError> {
        if request.player.trim().is_empty() {
            return Err(McpError {
                code: ErrorCode(-32602),
                message: Cow::from("A player name is required"),
                data: None,
            });
        }
        let mut state = self.state.lock().await;
        let TowerState { tower, host } = &mut *state;
        reply(handle_start(tower, host, &PlayerId::new(&request.player), ""))
    }

    #[tool(description = "Show the player's current Battle Tower team, or a rental team by ID")]
    async fn view_team(
        &self,
        Parameters(request): Parameters<ViewTeamRequest>,
    ) -> Result<CallToolResult, McpError> {
        let state = self.state.lock().await;
        reply(handle_view_team(
            &state.tower,
            &PlayerId::new(&request.player),
            request.team_id.as_deref().unwrap_or(""),
        ))
    }

    #[tool(description = "Check a player's current and max win streak")]
    async fn get_streak(
        &self,
        Parameters(request): Parameters<PlayerRequest>,
    ) -> Result<CallToolResult, McpError> {
        let state = self.state.lock().await;
        text(display_streak(&state.tower, &PlayerId::new(&request.player)))
    }

    #[tool(description = "Show the top win streaks")]
    async fn leaderboard(&self) -> Result<CallToolResult, McpError> {
        let state = self.state.lock().await;
        text(display_leaderboard(&state.tower))
    }

    #[tool(description = "List Battle Tower battles waiting for a result")]
    async fn list_battles(&self) -> Result<CallToolResult, McpError> {
        let state = self.state.lock().await;
        let lines: Vec<String> = state
            .host
            .battles()
            .map(|(id, request)| format!("  {} - {}", id, request.title))
            .collect();
        if lines.is_empty() {
            text("No battles in progress.".to_string())
        } else {
            text(format!("Battles in progress:\n{}", lines.join("\n")))
        }
    }

    #[tool(description = "Report that a battle has ended and who won")]
    async fn report_battle_end(
        &self,
        Parameters(request): Parameters<BattleEndRequest>,
    ) -> Result<CallToolResult, McpError> {
        let mut state = self.state.lock().await;
        let TowerState { tower, host } = &mut *state;

        let Some(battle) = host.finish(&request.battle_id) else {
            return text(format!("No battle '{}' is in progress.", request.battle_id));
        };
        let winner = request.winner.as_deref().map(PlayerId::new);
        // Resolution flushes the ledger with blocking file I/O.
        let outcome = tokio::task::block_in_place(|| {
            tower.on_battle_end(&request.battle_id, winner.as_ref(), &battle.participants())
        });
        match outcome {
            Some(outcome) => text(display_battle_outcome(&outcome)),
            None => text(format!(
                "Battle '{}' was not a tracked Battle Tower match.",
                request.battle_id
            )),
        }
    }

    #[tool(description = "Reload the rental and opponent pools from their definition files")]
    async fn reload_pools(&self) -> Result<CallToolResult, McpError> {
        let state = self.state.lock().await;
        tokio::task::block_in_place(|| state.tower.reload_pools());
        text(display_team_list(&state.tower))
    }

    #[tool(description = "Show the available Battle Tower commands")]
    async fn help(&self) -> Result<CallToolResult, McpError> {
        text(help_text())
    }
}

#[tool_handler]
impl ServerHandler for BattleTowerService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Battle Tower: start runs, check streaks, and report battle results.".into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "tower.ron".to_string());
    let config = TowerConfig::load(Path::new(&config_path))?.with_env_overrides();
    let service = BattleTowerService::new(BattleTower::open(config));
    let state = Arc::clone(&service.state);

    info!("Battle Tower MCP server starting");
    let server = service.serve((stdin(), stdout())).await?;
    let quit_reason = server.waiting().await?;
    info!(reason = ?quit_reason, "Battle Tower MCP server exiting");

    state.lock().await.tower.save();
    Ok(())
}
