//! Core data models for league standings and the draft.

mod draft;
mod game;
mod ids;
mod player;
mod standings;
mod team;

pub use draft::*;
pub use game::*;
pub use ids::*;
pub use player::*;
pub use standings::*;
pub use team::*;
