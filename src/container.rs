// .dtp container codec
//
// A .dtp file bundles exactly one preset: a 4-byte big-endian length prefix,
// that many bytes of UTF-8 JSON metadata ({"id": <int>, "name": <string>}),
// then the raw payload running to end of file. The legacy layout splits the
// same data across a <base>.json / <base>.bin sibling pair with no framing.

use std::path::{Path, PathBuf};

use crate::constants::{
    DTP_EXTENSION, LEGACY_META_EXTENSION, LEGACY_PAYLOAD_EXTENSION, METADATA_LEN_BYTES,
};
use crate::db::schema::PresetMeta;
use crate::error::{PresetError, Result};

/// Encode a preset into the combined container layout.
///
/// Deterministic: the same id and name always produce the same bytes, since
/// the metadata keys follow the struct field order.
pub fn encode(meta: &PresetMeta, payload: &[u8]) -> Result<Vec<u8>> {
    let metadata = serde_json::to_vec(meta)?;
    let len = u32::try_from(metadata.len()).map_err(|_| {
        PresetError::Format(format!("metadata block too large: {} bytes", metadata.len()))
    })?;

    let mut out = Vec::with_capacity(METADATA_LEN_BYTES + metadata.len() + payload.len());
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(&metadata);
    out.extend_from_slice(payload);
    Ok(out)
}

/// Decode a combined container. A zero-length payload is valid; a truncated
/// prefix, an overlong length field, or unusable metadata is not.
pub fn decode(bytes: &[u8]) -> Result<(PresetMeta, Vec<u8>)> {
    if bytes.len() < METADATA_LEN_BYTES {
        return Err(PresetError::Format(format!(
            "truncated length prefix: {} of {} bytes",
            bytes.len(),
            METADATA_LEN_BYTES
        )));
    }

    let len = u32::from_be_bytes(bytes[..METADATA_LEN_BYTES].try_into().unwrap()) as usize;
    let rest = &bytes[METADATA_LEN_BYTES..];
    if len > rest.len() {
        return Err(PresetError::Format(format!(
            "metadata length {} exceeds {} available bytes",
            len,
            rest.len()
        )));
    }

    let meta = parse_metadata(&rest[..len])?;
    Ok((meta, rest[len..].to_vec()))
}

/// Decode a legacy .json/.bin pair. The .bin bytes become the payload
/// verbatim; an empty .bin is valid.
pub fn decode_legacy(json: &[u8], bin: &[u8]) -> Result<(PresetMeta, Vec<u8>)> {
    Ok((parse_metadata(json)?, bin.to_vec()))
}

fn parse_metadata(bytes: &[u8]) -> Result<PresetMeta> {
    serde_json::from_slice(bytes)
        .map_err(|e| PresetError::Format(format!("invalid metadata JSON: {e}")))
}

/// One importable container on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerKind {
    /// Single combined .dtp file.
    Combined(PathBuf),
    /// Legacy metadata/payload sibling pair.
    LegacyPair { json: PathBuf, bin: PathBuf },
}

impl ContainerKind {
    /// Path shown to the user when reporting on this item.
    pub fn display_path(&self) -> &Path {
        match self {
            ContainerKind::Combined(path) => path,
            ContainerKind::LegacyPair { json, .. } => json,
        }
    }

    /// Read and decode the container from disk.
    pub fn read(&self) -> Result<(PresetMeta, Vec<u8>)> {
        match self {
            ContainerKind::Combined(path) => decode(&std::fs::read(path)?),
            ContainerKind::LegacyPair { json, bin } => {
                decode_legacy(&std::fs::read(json)?, &std::fs::read(bin)?)
            }
        }
    }
}

/// Classify one path as an importable item.
///
/// `.dtp` stands alone. A `.json` needs its `.bin` sibling and vice versa; an
/// orphan yields a MissingPair error naming the absent side. A `.bin` whose
/// `.json` is present returns None so each pair is counted once, through the
/// `.json` side. Unrelated files return None.
pub fn classify(path: &Path) -> Option<Result<ContainerKind>> {
    let ext = path.extension().and_then(|e| e.to_str())?.to_lowercase();
    match ext.as_str() {
        DTP_EXTENSION => Some(Ok(ContainerKind::Combined(path.to_path_buf()))),
        LEGACY_META_EXTENSION => {
            let bin = path.with_extension(LEGACY_PAYLOAD_EXTENSION);
            if bin.exists() {
                Some(Ok(ContainerKind::LegacyPair {
                    json: path.to_path_buf(),
                    bin,
                }))
            } else {
                Some(Err(missing_pair(path, LEGACY_PAYLOAD_EXTENSION)))
            }
        }
        LEGACY_PAYLOAD_EXTENSION => {
            if path.with_extension(LEGACY_META_EXTENSION).exists() {
                None
            } else {
                Some(Err(missing_pair(path, LEGACY_META_EXTENSION)))
            }
        }
        _ => None,
    }
}

fn missing_pair(path: &Path, missing: &'static str) -> PresetError {
    PresetError::MissingPair {
        base: path.with_extension("").display().to_string(),
        missing,
    }
}
