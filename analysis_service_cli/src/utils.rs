use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

pub fn save_json<T: Serialize + ?Sized>(data: &T, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut file = create(path)?;
    file.write_all(serde_json::to_string_pretty(data)?.as_bytes())?;
    log::info!("{} written", path.display());
    Ok(())
}

pub fn save_text(content: &str, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut file = create(path)?;
    file.write_all(content.as_bytes())?;
    log::info!("{} written", path.display());
    Ok(())
}

fn create(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    File::create(path)
}
