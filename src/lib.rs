mod commands;
mod config;
mod database;
pub mod error;
mod pipeline;

use config::Config;
use database::Database;
use pipeline::IngestPipeline;
use std::sync::Arc;
use tauri::Manager;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .plugin(tauri_plugin_fs::init())
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_process::init())
        .setup(|app| {
            // Setup logging
            if cfg!(debug_assertions) {
                app.handle().plugin(
                    tauri_plugin_log::Builder::default()
                        .level(log::LevelFilter::Info)
                        .build(),
                )?;
            }

            // Configuration: defaults unless a config.yaml overrides them.
            let config = Config::load().expect("Failed to load configuration");
            config
                .ensure_dirs()
                .expect("Failed to create app directories");

            // Schema is provisioned here; a storage failure aborts startup.
            let db = Database::new(&config.database_path).expect("Failed to initialize database");
            let db = Arc::new(db);

            let ingest_pipeline = Arc::new(IngestPipeline::from_config(&config));

            app.manage(db);
            app.manage(ingest_pipeline);

            log::info!("VoiceLab initialized");

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            // User directory commands
            commands::get_users,
            commands::create_user,
            commands::update_user,
            commands::delete_user,
            // Ingest commands
            commands::ingest_audio,
            commands::get_audio_files,
            // Result view commands
            commands::get_latest_transcription,
            commands::get_recent_grammar_findings,
            commands::get_recent_pos_tags,
            commands::get_latest_emotion,
            commands::get_latest_voice_quality,
            commands::get_stats,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
