//! Main application entry point (native).

use imagemarker_app::{AppError, AppResult, Session, replay};
use imagemarker_core::FileImageLoader;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn run(path: &Path) -> AppResult<()> {
    let session = Session::load(path)?;
    let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let loader = FileImageLoader::with_base(base);

    let report = pollster::block_on(replay(session, &loader))?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Starting ImageMarker");

    let result = match std::env::args_os().nth(1) {
        Some(path) => run(&PathBuf::from(path)),
        None => Err(AppError::Usage("imagemarker <session.json>".to_string())),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
