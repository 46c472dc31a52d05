// src/grid/mod.rs
// Engine-agnostic grid core. Nothing in here touches bevy systems or the database.

pub mod bulk;
pub mod cache;
pub mod command;
pub mod edit;
pub mod fetch;
pub mod params;
pub mod session;
pub mod transaction;
pub mod virtualize;

pub use cache::PageCache;
pub use command::{execute, GridCommand, GridResult};
pub use edit::{CellPosition, Direction, EditInput, EditState};
pub use fetch::RetryPolicy;
pub use session::{GridConfig, GridSession, Notice, NoticeLevel};
pub use virtualize::{VirtualRow, VirtualWindow, VirtualizerConfig};
