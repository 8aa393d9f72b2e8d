//! Object storage commands

use crate::StorageCommand;
use anyhow::{Context, Result};
use chaos_storage::{storage_client, FileInfo, Storage};
use std::fs::File;
use std::path::Path;
use tracing::info;

pub(crate) fn run(config_path: &Path, command: StorageCommand) -> Result<()> {
    let storage = Storage::load_from(config_path)
        .with_context(|| format!("Failed to load storage settings from {}", config_path.display()))?;
    info!("Using {:?} storage, bucket {:?}", storage.server, storage.config.bucket);
    let client = storage_client(storage)?;

    match command {
        StorageCommand::Upload {
            file,
            key,
            content_type,
        } => {
            let mut input = File::open(&file).with_context(|| format!("Failed to open {}", file.display()))?;

            let mut info = FileInfo::new(key);
            if let Some(name) = file.file_name() {
                info = info.with_name(name.to_string_lossy());
            }
            if let Some(content_type) = content_type {
                info = info.with_content_type(content_type);
            }

            let uploaded = client.upload(&mut input, info)?;
            println!("{}", serde_json::to_string_pretty(&uploaded)?);
        }

        StorageCommand::Delete { keys } => {
            if let [key] = keys.as_slice() {
                client.delete(key)?;
            } else {
                client.delete_all(&keys)?;
            }
            info!("Deleted {} object(s)", keys.len());
        }
    }

    Ok(())
}
