pub mod card;
pub mod category;
pub mod guess;
pub mod player;
pub mod registry;
