//! Player character state and progression.

pub mod player;
pub mod progression;

pub use player::{PlayerCharacter, PlayerFlag, ShopEntry};
pub use progression::{check_level_up, xp_to_next_level};
