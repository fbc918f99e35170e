mod cli;
mod commands;
mod render;

use recruit_recovery::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
