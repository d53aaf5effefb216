// Library crate for the Undercover game server
// This file exposes the public API for integration tests

pub mod game;
pub mod room;
pub mod shared;
pub mod websockets;
pub mod words;

// Re-export commonly used types for easier access in tests
pub use game::{GameState, Phase, Role, Winner};
pub use room::{InMemoryRoomRepository, RoomRepository, RoomService};
pub use shared::{AppState, GameError};
pub use websockets::{
    BroadcastGateway, ConnectionManager, InMemoryConnectionManager, MessageType, WebSocketMessage,
};
pub use words::{BuiltinWordBank, WordPair, WordSource};
