//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `mediatek_core` linkage and database bootstrap from a shell.
//! - Run one dispatched read: `mediatek_cli [TABLE [FILTER_JSON]]`.
//!
//! Settings come from `MEDIATEK_DB_PATH`, `MEDIATEK_LOG_LEVEL` and
//! `MEDIATEK_LOG_DIR`.

use log::info;
use mediatek_core::{
    core_version, init_logging, open_db, AccessConfig, AccessService, FieldMap, SqliteExecutor,
};
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = AccessConfig::from_env()?;
    if let Some(log_dir) = &config.log_dir {
        init_logging(config.log_level, log_dir)?;
    }

    println!("mediatek_core version={}", core_version());

    let mut args = std::env::args().skip(1);
    let Some(table) = args.next() else {
        return Ok(());
    };
    let filter: Option<FieldMap> = args
        .next()
        .map(|raw| serde_json::from_str(&raw))
        .transpose()?;

    let conn = open_db(&config.database_path)?;
    let service = AccessService::new(SqliteExecutor::new(&conn));
    let rows = service.select(&table, filter.as_ref())?;

    println!("{}", serde_json::to_string_pretty(&rows)?);
    info!("event=cli_select module=cli status=ok rows={}", rows.len());
    Ok(())
}
