// src/app/plugin.rs
use super::events::{DirectoryLoaded, DirectoryRequest, GridFeedback, GridResultEvent, OpenTableRequest};
use super::resources::{ActiveGrid, GridCommandQueue, TableDirectory};
use super::systems::*;
use crate::settings::AppSettings;
use bevy::prelude::*;

/// Database, grid session and the background execution of grid commands.
pub struct GridPlugin;

impl Plugin for GridPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AppSettings>()
            .init_resource::<ActiveGrid>()
            .init_resource::<GridCommandQueue>()
            .init_resource::<TableDirectory>()
            .add_event::<GridResultEvent>()
            .add_event::<OpenTableRequest>()
            .add_event::<DirectoryRequest>()
            .add_event::<DirectoryLoaded>()
            .add_event::<GridFeedback>()
            .add_systems(Startup, setup_database)
            .add_systems(
                Update,
                (
                    handle_directory_requests,
                    apply_directory_results,
                    handle_open_table,
                    tick_grid,
                    apply_grid_results,
                    execute_grid_commands,
                    drain_grid_notices,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    apply_frame_pacing.run_if(resource_changed::<AppSettings>),
                    persist_settings.run_if(
                        resource_changed::<AppSettings>.and(not(resource_added::<AppSettings>)),
                    ),
                ),
            );

        info!("GridPlugin initialized.");
    }
}
