//! Standings calculation engine.
//!
//! Computes derived standings from stored league data:
//! - Per-team win/loss/overtime-loss and goal counters
//! - Points and point percentage
//! - Tie-break ordering within a league, conference or division

mod aggregate;
mod rank;

pub use aggregate::*;
pub use rank::*;

/// Points earned per win.
pub const POINTS_PER_WIN: u32 = 2;

/// Points earned per overtime or shootout loss.
pub const POINTS_PER_OVERTIME_LOSS: u32 = 1;

/// Standings points: two per win, one per overtime loss.
pub fn calculate_points(wins: u32, overtime_losses: u32) -> u32 {
    POINTS_PER_WIN * wins + POINTS_PER_OVERTIME_LOSS * overtime_losses
}

/// Share of the maximum available points, 0.0 before any game is played.
pub fn calculate_point_percentage(points: u32, games_played: u32) -> f64 {
    if games_played == 0 {
        0.0
    } else {
        points as f64 / (POINTS_PER_WIN * games_played) as f64
    }
}
