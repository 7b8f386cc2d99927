pub mod account;
pub mod position;
pub mod sizing;

pub use account::Account;
pub use position::Position;
pub use sizing::PositionSizer;
