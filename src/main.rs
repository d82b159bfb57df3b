use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use league_standings::api::state::AppState;
use league_standings::calculate::{StandingsTable, StandingsView};
use league_standings::config::AppConfig;
use league_standings::draft::DraftBoard;
use league_standings::models::{DraftClass, PlayoffStatus, TeamId};

#[derive(Parser)]
#[command(name = "league-standings")]
#[command(about = "Hockey league standings, playoff badges and draft tracking")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: String,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print standings tables
    Standings {
        /// League key (defaults to standings.default_league)
        #[arg(long)]
        league: Option<String>,

        /// Grouping: division, conference or overall
        #[arg(long, default_value = "division")]
        view: StandingsView,

        /// Print JSON instead of text tables
        #[arg(long)]
        json: bool,
    },

    /// Recompute standings and print a summary
    Refresh {
        #[arg(long)]
        league: Option<String>,
    },

    /// Assign a playoff status to a team ("none" clears it)
    SetPlayoffStatus {
        team: String,
        status: String,
    },

    /// Manage drafts
    Draft {
        #[command(subcommand)]
        action: DraftAction,
    },

    /// Start the API server
    Serve {
        /// Bind address (overrides server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port number (overrides server.port)
        #[arg(long)]
        port: Option<u16>,
    },
}

#[derive(Subcommand)]
enum DraftAction {
    /// Create a draft class if needed and issue its picks
    Generate {
        class_id: String,

        /// Season the class belongs to
        #[arg(long)]
        season: u32,

        #[arg(long)]
        league: Option<String>,

        /// Team ids in selection order, comma-separated
        #[arg(long, value_delimiter = ',')]
        order: Vec<String>,

        /// Number of rounds (defaults to draft.rounds)
        #[arg(long)]
        rounds: Option<u32>,
    },

    /// Open a draft for picks
    Start { class_id: String },

    /// Close a draft
    Finish { class_id: String },

    /// Show the pick board
    Board {
        class_id: String,

        /// Only show one round
        #[arg(long)]
        round: Option<u32>,
    },

    /// Spend the current pick on a player
    Pick { class_id: String, player_id: String },

    /// List players still available to a draft
    Players { class_id: String },

    /// Show completed drafts of a league
    History {
        #[arg(long)]
        league: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    let json_layer = cli
        .json_logs
        .then(|| tracing_subscriber::fmt::layer().json());
    let text_layer = (!cli.json_logs).then(|| tracing_subscriber::fmt::layer());

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();

    tracing::info!("Starting league-standings v{}", env!("CARGO_PKG_VERSION"));

    let mut config = AppConfig::load_or_default(&PathBuf::from(&cli.config))
        .with_context(|| format!("loading {}", cli.config))?;
    if let Some(data_dir) = &cli.data_dir {
        config.data_dir = PathBuf::from(data_dir);
    }
    config.validate()?;

    match cli.command {
        Commands::Standings { league, view, json } => {
            let state = AppState::from_config(config)?;
            let league = league.unwrap_or_else(|| state.default_league().to_string());
            let snapshot = state.standings.load(&league).await?;
            if !snapshot.is_complete() {
                tracing::warn!("Standings for {} are incomplete; see errors above", snapshot.league);
            }
            let tables = snapshot.tables(view);
            if json {
                println!("{}", serde_json::to_string_pretty(&tables)?);
            } else {
                for table in &tables {
                    print_table(table);
                }
            }
        }
        Commands::Refresh { league } => {
            let state = AppState::from_config(config)?;
            let league = league.unwrap_or_else(|| state.default_league().to_string());
            let snapshot = state.standings.refresh(&league).await?;
            println!(
                "{}: {} teams (teams loaded: {}, games loaded: {})",
                snapshot.league,
                snapshot.records.len(),
                snapshot.teams_loaded,
                snapshot.games_loaded
            );
        }
        Commands::SetPlayoffStatus { team, status } => {
            let status = PlayoffStatus::parse_optional(&status)?;
            let state = AppState::from_config(config)?;
            let team = state
                .standings
                .set_playoff_status(&TeamId::from(team), status)
                .await?;
            match team.playoff_status {
                Some(status) => println!("{}: {} ({})", team.name(), status, status.badge().text),
                None => println!("{}: playoff status cleared", team.name()),
            }
        }
        Commands::Draft { action } => run_draft(config, action).await?,
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            let addr = format!("{}:{}", config.server.host, config.server.port);
            let state = AppState::from_config(config)?;
            let app = league_standings::api::build_router(state);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}

async fn run_draft(config: AppConfig, action: DraftAction) -> Result<()> {
    let default_league = config.standings.default_league.clone();
    let state = AppState::from_config(config)?;
    let drafts = &state.drafts;

    match action {
        DraftAction::Generate {
            class_id,
            season,
            league,
            order,
            rounds,
        } => {
            let league = league.unwrap_or(default_league);
            let class = drafts
                .ensure_class(DraftClass::new(class_id.as_str(), season).with_league(league))
                .await?;
            let order = (!order.is_empty()).then(|| order.into_iter().map(TeamId::from).collect());
            let board = drafts.generate(&class.id, order, rounds).await?;
            println!(
                "Generated {} picks over {} rounds for {}",
                board.picks().len(),
                board.rounds(),
                class_id
            );
        }
        DraftAction::Start { class_id } => {
            let class = drafts.start(&class_id.into()).await?;
            println!("{} is {}", class.id, class.status);
        }
        DraftAction::Finish { class_id } => {
            let class = drafts.finish(&class_id.into()).await?;
            println!("{} is {}", class.id, class.status);
        }
        DraftAction::Board { class_id, round } => {
            let (class, board) = drafts.board(&class_id.into()).await?;
            print_board(&class, &board, round);
        }
        DraftAction::Pick {
            class_id,
            player_id,
        } => {
            let pick = drafts.make_pick(&class_id.into(), player_id.into()).await?;
            println!(
                "Round {}, pick {}: {} selects {}",
                pick.round,
                pick.pick,
                pick.team_id,
                pick.player_id.map(|p| p.to_string()).unwrap_or_default()
            );
        }
        DraftAction::Players { class_id } => {
            let players = drafts.available_players(&class_id.into()).await?;
            if players.is_empty() {
                println!("No players available");
            }
            for player in players {
                println!("{:<12} {:<28} {}", player.id, player.name(), player.position);
            }
        }
        DraftAction::History { league } => {
            let league = league.unwrap_or(default_league);
            let history = drafts.history(&league).await?;
            if history.is_empty() {
                println!("No completed drafts for {}", league);
            }
            for (class, board) in &history {
                print_board(class, board, None);
                println!();
            }
        }
    }

    Ok(())
}

fn print_table(table: &StandingsTable) {
    println!("{}", table.title);
    println!(
        "{:>3}  {:<28} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>5} {:>4} {:>6}",
        "#", "Team", "GP", "W", "L", "OTL", "GF", "GA", "DIFF", "PTS", "P%"
    );
    for row in &table.rows {
        let r = &row.record;
        let name = match &row.badge {
            Some(badge) => format!("{} - {}", badge.text, r.name),
            None => r.name.clone(),
        };
        println!(
            "{:>3}  {:<28} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>+5} {:>4} {:>6.3}",
            row.rank,
            name,
            r.games_played,
            r.wins,
            r.losses,
            r.overtime_losses,
            r.goals_for,
            r.goals_against,
            r.goal_differential,
            r.points,
            r.point_percentage
        );
    }
    println!();
}

fn print_board(class: &DraftClass, board: &DraftBoard, round: Option<u32>) {
    println!("{} ({} {}, {})", class.id, class.league, class.season, class.status);
    match board.current_pick() {
        Some(pick) => println!("On the clock: round {}, pick {} ({})", pick.round, pick.pick, pick.team_id),
        None if board.is_complete() => println!("All picks made"),
        None => println!("No picks issued"),
    }

    let picks = match round {
        Some(round) => board.picks_for_round(round),
        None => board.picks().iter().collect(),
    };
    for pick in picks {
        println!(
            "{:>2}.{:<3} {:<12} {}",
            pick.round,
            pick.pick,
            pick.team_id,
            pick.player_id.as_ref().map(|p| p.as_str()).unwrap_or("-")
        );
    }
}
