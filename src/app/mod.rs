// src/app/mod.rs
pub mod events;
pub mod plugin;
pub mod resources;
pub mod systems;

pub use events::{DirectoryRequest, GridFeedback, GridResultEvent, OpenTableRequest};
pub use plugin::GridPlugin;
pub use resources::{ActiveGrid, GridCommandQueue, SharedService, TableDirectory};
