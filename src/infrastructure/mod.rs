pub mod db;
pub mod gateway;
pub mod queries;

pub use gateway::{CardGateway, SqliteGateway};
