//! Hands the rendered paper to the system print spooler via `lpr`.

use crate::error::PrintError;
use std::ffi::OsString;
use std::path::Path;
use tokio::process::Command;
use tracing::{info, instrument};

/// Arguments for `lpr`: an optional `-P <printer>` then the file.
fn lpr_args(file_path: &Path, printer_name: Option<&str>) -> Vec<OsString> {
    let mut args = Vec::new();
    if let Some(name) = printer_name.map(str::trim).filter(|n| !n.is_empty()) {
        args.push(OsString::from("-P"));
        args.push(OsString::from(name));
    }
    args.push(file_path.as_os_str().to_os_string());
    args
}

/// Send `file_path` to `printer_name`, or the default printer when `None`.
#[instrument(level = "info", fields(path = %file_path.display()))]
pub async fn print(file_path: &Path, printer_name: Option<&str>) -> Result<(), PrintError> {
    if !file_path.is_file() {
        return Err(PrintError::MissingFile(file_path.to_path_buf()));
    }

    let status = Command::new("lpr")
        .args(lpr_args(file_path, printer_name))
        .status()
        .await?;
    if !status.success() {
        return Err(PrintError::Failed(status));
    }

    info!(printer = printer_name.unwrap_or("default"), "Sent paper to printer");
    Ok(())
}
