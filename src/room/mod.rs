pub mod cleanup_task;
pub mod code;
pub mod models;
pub mod repository;
pub mod service;

pub use models::RoomModel;
pub use repository::{InMemoryRoomRepository, RoomRepository, SharedRoom};
pub use service::RoomService;
