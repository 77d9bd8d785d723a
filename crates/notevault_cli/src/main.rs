//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `notevault_core` linkage, configuration and schema bootstrap.
//! - Report note counts for the given session, issuing a new one when absent.
//!
//! Usage: `notevault [SESSION_ID]`, configured through `NOTEVAULT_*` env vars.

use notevault_core::db::{open_db, open_db_in_memory};
use notevault_core::{
    init_from_config, CoreConfig, NoteRepository, SessionCookie, SessionProvider,
    SqliteNoteRepository, UuidSessionProvider,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("notevault_core ping={}", notevault_core::ping());
    println!("notevault_core version={}", notevault_core::core_version());

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("event=cli_run module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = CoreConfig::from_env();
    let file_logging = init_from_config(&config)?;
    println!("logging file_output={file_logging} level={}", config.log_level);

    let mut conn = match config.db_path.as_deref() {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    let repo = SqliteNoteRepository::try_new(&mut conn)?;
    println!("db ready");

    let arg = std::env::args().nth(1);
    let session = UuidSessionProvider.resolve(arg.as_deref());
    if session.issued {
        let cookie = SessionCookie::for_session(session.id.clone(), config.secure_cookies);
        println!("issued Set-Cookie: {}", cookie.header_value());
    }
    println!(
        "session={} active={} trash={}",
        session.id.log_prefix(),
        repo.count_notes(&session.id, false)?,
        repo.count_notes(&session.id, true)?
    );
    Ok(())
}
