// src/app/systems.rs
use super::events::{DirectoryLoaded, DirectoryRequest, GridFeedback, GridResultEvent, OpenTableRequest};
use super::resources::{ActiveGrid, GridCommandQueue, SharedService, TableDirectory};
use crate::data::{Base, DataConfig, DataError, DataResult, DataService, SqliteDataService, Table, TableId};
use crate::grid::{execute, GridCommand, GridResult, GridSession, RetryPolicy};
use crate::settings::{io::save_settings_to_file, AppSettings};
use bevy::prelude::*;
use bevy_framepace::FramepaceSettings;
use bevy_tokio_tasks::TokioTasksRuntime;

/// Opens the database, makes sure there is something to show, and opens it.
pub fn setup_database(
    mut commands: Commands,
    settings: Res<AppSettings>,
    mut directory: ResMut<TableDirectory>,
    mut open_writer: EventWriter<OpenTableRequest>,
    mut feedback_writer: EventWriter<GridFeedback>,
) {
    let config = DataConfig::resolve(settings.database_path.clone());
    let service = match SqliteDataService::open(&config.database_path) {
        Ok(service) => service,
        Err(e) => {
            error!("Failed to open database {:?}: {}", config.database_path, e);
            feedback_writer.write(GridFeedback {
                message: format!("Could not open {:?}, changes will not be saved: {}", config.database_path, e),
                is_error: true,
            });
            match SqliteDataService::open_in_memory() {
                Ok(service) => service,
                Err(e) => {
                    error!("In-memory fallback database failed too: {}", e);
                    return;
                }
            }
        }
    };

    match service.ensure_starter_table() {
        Ok(table) => {
            open_writer.write(OpenTableRequest { table });
        }
        Err(e) => error!("Could not prepare a starter table: {}", e),
    }
    match load_directory(&service) {
        Ok((bases, tables)) => {
            directory.bases = bases;
            directory.tables = tables;
        }
        Err(e) => error!("Could not list tables: {}", e),
    }
    commands.insert_resource(SharedService::new(service));
    info!("Database ready at {:?}", config.database_path);
}

fn load_directory(service: &SqliteDataService) -> DataResult<(Vec<Base>, Vec<Table>)> {
    let bases = service.list_bases()?;
    let mut tables = Vec::new();
    for base in &bases {
        tables.extend(service.list_tables(&base.id)?);
    }
    Ok((bases, tables))
}

pub fn handle_open_table(
    mut events: EventReader<OpenTableRequest>,
    mut grid: ResMut<ActiveGrid>,
    mut queue: ResMut<GridCommandQueue>,
    settings: Res<AppSettings>,
) {
    let Some(request) = events.read().last() else {
        return;
    };
    if grid.is_open(&request.table.id) {
        return;
    }
    let mut session = GridSession::new(request.table.clone(), settings.grid_config());
    // Commands still queued for the old session are dropped with it.
    queue.commands.clear();
    queue.extend(session.open());
    let epoch = grid.open(session);
    debug!("Opened table {} as session {}", request.table.id, epoch);
}

/// Drives the filter debounce.
pub fn tick_grid(time: Res<Time>, mut grid: ResMut<ActiveGrid>, mut queue: ResMut<GridCommandQueue>) {
    if let Some(session) = grid.session.as_mut() {
        queue.extend(session.tick(time.elapsed()));
    }
}

pub fn apply_grid_results(
    mut events: ResMut<Events<GridResultEvent>>,
    mut grid: ResMut<ActiveGrid>,
    mut queue: ResMut<GridCommandQueue>,
) {
    for event in events.drain() {
        match grid.session_for(event.epoch) {
            Some(session) => queue.extend(session.apply(event.result)),
            None => debug!(
                "Dropping result of closed session {} (table {})",
                event.epoch, event.table_id
            ),
        }
    }
}

pub fn execute_grid_commands(
    mut queue: ResMut<GridCommandQueue>,
    grid: Res<ActiveGrid>,
    service: Option<Res<SharedService>>,
    runtime: Res<TokioTasksRuntime>,
) {
    if queue.commands.is_empty() {
        return;
    }
    let (Some(session), Some(service)) = (grid.session.as_ref(), service) else {
        warn!("Dropping {} grid command(s): no open table or database", queue.commands.len());
        queue.commands.clear();
        return;
    };
    let epoch = grid.epoch();
    for command in queue.commands.drain(..) {
        spawn_grid_task(&runtime, (*service).clone(), epoch, session.table_id().clone(), command);
    }
}

fn spawn_grid_task(
    runtime: &TokioTasksRuntime,
    service: SharedService,
    epoch: u64,
    table_id: TableId,
    command: GridCommand,
) {
    debug!("Dispatching {} for table {}", command.label(), table_id);
    runtime.spawn_background_task(move |mut ctx| async move {
        let policy = RetryPolicy::default();
        let mut attempt = 1;
        let result = loop {
            let worker_service = service.clone();
            let worker_command = command.clone();
            let result = tokio::task::spawn_blocking(move || match worker_service.lock() {
                Ok(guard) => execute(&*guard, &worker_command),
                Err(e) => GridResult::failure(&worker_command, e),
            })
            .await
            .unwrap_or_else(|e| {
                GridResult::failure(&command, DataError::Transient(format!("worker task failed: {}", e)))
            });

            match result.retryable_error().and_then(|e| policy.should_retry(e, attempt)) {
                Some(delay) => {
                    warn!(
                        "{} for table {} failed (attempt {}), retrying in {:?}",
                        command.label(),
                        table_id,
                        attempt,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                None => break result,
            }
        };
        ctx.run_on_main_thread(move |world_ctx| {
            world_ctx.world.send_event(GridResultEvent { epoch, table_id, result });
        })
        .await;
    });
}

pub fn drain_grid_notices(mut grid: ResMut<ActiveGrid>, mut feedback_writer: EventWriter<GridFeedback>) {
    let Some(session) = grid.session.as_mut() else {
        return;
    };
    for notice in session.drain_notices() {
        feedback_writer.write(GridFeedback {
            is_error: notice.is_error(),
            message: notice.message,
        });
    }
}

pub fn handle_directory_requests(
    mut events: EventReader<DirectoryRequest>,
    mut directory: ResMut<TableDirectory>,
    service: Option<Res<SharedService>>,
    runtime: Res<TokioTasksRuntime>,
) {
    let Some(service) = service else {
        events.clear();
        return;
    };
    for request in events.read() {
        let request = request.clone();
        let service = (*service).clone();
        directory.loading = true;
        runtime.spawn_background_task(move |mut ctx| async move {
            let worker_service = service.clone();
            let loaded = tokio::task::spawn_blocking(move || -> DataResult<(Vec<Base>, Vec<Table>, Option<Table>)> {
                let guard = worker_service.lock()?;
                let created = match &request {
                    DirectoryRequest::CreateTable { base_id, name } => Some(guard.create_table(base_id, name)?),
                    DirectoryRequest::Reload => None,
                };
                let (bases, tables) = load_directory(&guard)?;
                Ok((bases, tables, created))
            })
            .await
            .unwrap_or_else(|e| Err(DataError::Transient(format!("worker task failed: {}", e))));

            let event = match loaded {
                Ok((bases, tables, created)) => DirectoryLoaded {
                    result: Ok((bases, tables)),
                    created,
                },
                Err(e) => DirectoryLoaded {
                    result: Err(e),
                    created: None,
                },
            };
            ctx.run_on_main_thread(move |world_ctx| {
                world_ctx.world.send_event(event);
            })
            .await;
        });
    }
}

pub fn apply_directory_results(
    mut events: ResMut<Events<DirectoryLoaded>>,
    mut directory: ResMut<TableDirectory>,
    mut open_writer: EventWriter<OpenTableRequest>,
    mut feedback_writer: EventWriter<GridFeedback>,
) {
    for event in events.drain() {
        directory.loading = false;
        match event.result {
            Ok((bases, tables)) => {
                directory.bases = bases;
                directory.tables = tables;
                if let Some(table) = event.created {
                    feedback_writer.write(GridFeedback {
                        message: format!("Created table '{}'", table.name),
                        is_error: false,
                    });
                    open_writer.write(OpenTableRequest { table });
                }
            }
            Err(e) => {
                feedback_writer.write(GridFeedback {
                    message: e.user_message(),
                    is_error: true,
                });
            }
        }
    }
}

pub fn apply_frame_pacing(settings: Res<AppSettings>, mut framepace: ResMut<FramepaceSettings>) {
    framepace.limiter = settings.fps_setting.limiter();
    info!("Frame limiter set to {:?}", settings.fps_setting);
}

pub fn persist_settings(settings: Res<AppSettings>) {
    if let Err(e) = save_settings_to_file(&*settings) {
        error!("Failed to save settings: {}", e);
    }
}
