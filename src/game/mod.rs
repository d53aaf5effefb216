pub mod logic;
pub mod state;
pub mod view;

pub use state::{GameState, Phase, PlayerId, Role, Seat, Winner};
pub use view::{ClientGameState, PlayerData};
