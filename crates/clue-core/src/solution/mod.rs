mod best_guess;
mod space;

pub use best_guess::{BestGuess, GuessTag};
pub use space::SolutionSpace;
