pub mod board;
pub mod eval;
pub mod game;
pub mod knowledge;
pub mod model;
pub mod solution;

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "clue-solver"
    }

    pub const fn codename() -> &'static str {
        "Envelope"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}
