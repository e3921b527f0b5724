// File: src/persistence.rs
use crate::core::context::ContextModel;
use bincode::Options;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

const MAGIC: &[u8; 4] = b"MKLD";
const FORMAT_VERSION: u8 = 2;
/// Upper bound on decoded payload size; rejects absurd length prefixes in
/// damaged files before anything is allocated.
const MAX_PAYLOAD_BYTES: u64 = 64 * 1024 * 1024;

/// The serializable learned state.
#[derive(serde::Serialize, serde::Deserialize)]
struct SerializableState {
    context_model: ContextModel,
}

fn codec() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_limit(MAX_PAYLOAD_BYTES)
}

/// Writes the model atomically: a temp file in the target directory is
/// filled, then renamed over `path`.
pub fn save_to_disk(model: &ContextModel, path: &Path) -> Result<(), crate::Error> {
    let parent_dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir)?;

    let state = SerializableState { context_model: model.clone() };

    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let mut writer = BufWriter::new(&temp_file);
        writer.write_all(MAGIC)?;
        writer.write_all(&[FORMAT_VERSION])?;
        codec()
            .serialize_into(&mut writer, &state)
            .map_err(|e| crate::Error::Persistence(e.to_string()))?;
        writer.flush()?;
    }

    temp_file
        .persist(path)
        .map_err(|e| crate::Error::Io(e.error))?;
    Ok(())
}

/// Reads a model written by [`save_to_disk`]. Fails on a missing file, a
/// foreign header or an undecodable payload.
pub fn load_from_disk(path: &Path) -> Result<ContextModel, crate::Error> {
    let bytes = fs::read(path)?;
    if bytes.len() <= MAGIC.len() || bytes[..MAGIC.len()] != MAGIC[..] {
        return Err(crate::Error::Persistence("missing header".to_string()));
    }
    let version = bytes[MAGIC.len()];
    if version != FORMAT_VERSION {
        return Err(crate::Error::Persistence(format!("unsupported version {version}")));
    }

    let state: SerializableState = codec()
        .deserialize(&bytes[MAGIC.len() + 1..])
        .map_err(|e| crate::Error::Persistence(e.to_string()))?;
    Ok(state.context_model)
}
