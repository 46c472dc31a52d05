// src/main.rs

#![cfg_attr(all(not(debug_assertions), target_os = "windows"), windows_subsystem = "windows")]

use bevy::{
    log::LogPlugin,
    prelude::*,
    window::WindowPlugin,
    winit::{UpdateMode, WinitSettings},
};
use bevy_egui::EguiPlugin;
use bevy_framepace::FramepacePlugin;
use bevy_tokio_tasks::TokioTasksPlugin;
use clap::Parser;
use std::time::Duration;

use gridbase::app::GridPlugin;
use gridbase::cli::{self, Cli};
use gridbase::settings::{io::load_settings_from_file, AppSettings};
use gridbase::ui::GridUiPlugin;

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Some(command) = cli.command {
        if let Err(e) = cli::run(cli.db, command) {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        return;
    }

    let mut settings: AppSettings = load_settings_from_file().unwrap_or_else(|e| {
        eprintln!("Using default settings: {}", e);
        AppSettings::default()
    });
    if cli.db.is_some() {
        settings.database_path = cli.db;
    }

    App::new()
        .insert_resource(WinitSettings {
            focused_mode: UpdateMode::Continuous,
            unfocused_mode: UpdateMode::reactive_low_power(Duration::from_secs_f32(1.0 / 5.0)),
        })
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "GridBase".into(),
                        ..default()
                    }),
                    ..default()
                })
                .set(LogPlugin {
                    level: bevy::log::Level::INFO,
                    filter: "wgpu=error,naga=warn,bevy_tokio_tasks=warn".to_string(),
                    ..default()
                }),
        )
        .add_plugins(EguiPlugin {
            enable_multipass_for_primary_context: true,
        })
        .add_plugins(TokioTasksPlugin::default())
        .add_plugins(FramepacePlugin)
        .insert_resource(settings)
        .add_plugins(GridPlugin)
        .add_plugins(GridUiPlugin)
        .run();
}
