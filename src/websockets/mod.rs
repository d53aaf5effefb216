pub mod connection_manager;
pub mod gateway;
pub mod handler;
pub mod messages;
pub mod socket;

pub use connection_manager::{ConnectionManager, InMemoryConnectionManager};
pub use gateway::{BroadcastGateway, WsGateway};
pub use handler::{websocket_handler, CommandDispatcher};
pub use messages::{MessageType, WebSocketMessage};
pub use socket::{Connection, MessageHandler, SocketWrapper};
