pub mod board_service;
pub mod card_service;
pub mod lifecycle;

pub use board_service::{BoardService, NewBoard};
pub use card_service::CardService;
pub use lifecycle::LifecycleEngine;
