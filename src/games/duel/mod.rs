//! Two-player duel: each round both peers play one single-use attack or
//! block value, and the host resolves the pair.
pub mod error;
pub mod game;
pub mod log;
pub mod pool;
pub mod protocol;
pub mod renderer;
pub mod resolve;
pub mod session;
pub mod setup;

pub use error::DuelError;
pub use game::DuelGame;
pub use protocol::{Message, Move, MoveKind, Role};
pub use renderer::DuelRenderer;
pub use resolve::{resolve, Resolution, Standing};
pub use session::{Phase, Session};
pub use setup::GameSetup;
