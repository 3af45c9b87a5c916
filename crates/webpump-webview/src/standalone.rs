//! Standalone executables: the webpump binary with a site appended.
//!
//! Layout of a standalone image:
//!
//! ```text
//! <executable> <assets json> <metadata json> <trailer>
//! ```
//!
//! The 24-byte trailer is [`MAGIC_TRAILER`] followed by the big-endian
//! offsets of the assets and metadata sections. At startup the binary reads
//! its own tail. A matching trailer means it was compiled and should serve
//! the embedded site instead of parsing its command line.

use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom};
use std::ops::Range;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use webpump_common::BundleError;

use crate::bundle::EmbeddedAssets;

pub const MAGIC_TRAILER: &[u8; 8] = b"t4ur1wry";
const TRAILER_LEN: usize = 24;

/// Describes the embedded site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Entry file, as a key into the assets.
    pub entry: String,
    /// webpump version that produced the bundle.
    pub version: String,
}

/// A site packed for appending to an executable.
#[derive(Debug, Clone)]
pub struct Standalone {
    pub metadata: Metadata,
    pub assets: EmbeddedAssets,
}

impl Standalone {
    /// Snapshot the directory holding `entry`, with `entry` as the page to open.
    pub fn from_entry(entry: &Path) -> Result<Self, BundleError> {
        if !entry.is_file() {
            return Err(BundleError::EntryNotFound(entry.to_path_buf()));
        }
        let name = entry
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| BundleError::EntryNotFound(entry.to_path_buf()))?
            .to_string();
        let root = match entry.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let assets = EmbeddedAssets::from_dir(root)?;
        if !assets.contains(&name) {
            return Err(BundleError::EntryNotFound(entry.to_path_buf()));
        }
        Ok(Self {
            metadata: Metadata {
                entry: name,
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            assets,
        })
    }

    pub fn entry(&self) -> &str {
        &self.metadata.entry
    }

    /// Append this bundle and its trailer to an executable image.
    pub fn append_to(&self, mut image: Vec<u8>) -> Result<Vec<u8>, BundleError> {
        let assets = serde_json::to_vec(&self.assets)?;
        let metadata = serde_json::to_vec(&self.metadata)?;
        let trailer = Trailer {
            bundle_pos: image.len() as u64,
            metadata_pos: (image.len() + assets.len()) as u64,
        };

        image.reserve(assets.len() + metadata.len() + TRAILER_LEN);
        image.extend_from_slice(&assets);
        image.extend_from_slice(&metadata);
        image.extend_from_slice(&trailer.encode());
        Ok(image)
    }

    /// Read the bundle back out of a complete image.
    ///
    /// `Ok(None)` means the image carries no trailer.
    pub fn from_image(image: &[u8]) -> Result<Option<Self>, BundleError> {
        let Some(trailer_pos) = image.len().checked_sub(TRAILER_LEN) else {
            return Ok(None);
        };
        let Some(trailer) = Trailer::parse(&image[trailer_pos..]) else {
            return Ok(None);
        };
        let (assets, metadata) = trailer.sections(trailer_pos as u64)?;
        Self::decode(
            &image[usize_range(assets)?],
            &image[usize_range(metadata)?],
        )
        .map(Some)
    }

    /// Read the bundle from the tail of the file at `path` without loading
    /// the executable part.
    pub fn from_file(path: &Path) -> Result<Option<Self>, BundleError> {
        let mut file = File::open(path)?;
        let Some(trailer) = read_trailer(&mut file)? else {
            return Ok(None);
        };
        let trailer_pos = file.seek(SeekFrom::End(-(TRAILER_LEN as i64)))?;
        let (assets, metadata) = trailer.sections(trailer_pos)?;

        file.seek(SeekFrom::Start(assets.start))?;
        let mut bundle = Vec::with_capacity((metadata.end - assets.start) as usize);
        file.take(metadata.end - assets.start)
            .read_to_end(&mut bundle)?;
        let split = (assets.end - assets.start) as usize;
        if bundle.len() < split {
            return Err(BundleError::Corrupt("bundle is truncated".into()));
        }
        Self::decode(&bundle[..split], &bundle[split..]).map(Some)
    }

    /// Bundle embedded in the running executable, if any.
    pub fn from_current_exe() -> Result<Option<Self>, BundleError> {
        Self::from_file(&std::env::current_exe()?)
    }

    fn decode(assets: &[u8], metadata: &[u8]) -> Result<Self, BundleError> {
        Ok(Self {
            assets: serde_json::from_slice(assets)?,
            metadata: serde_json::from_slice(metadata)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Trailer {
    bundle_pos: u64,
    metadata_pos: u64,
}

impl Trailer {
    fn parse(bytes: &[u8]) -> Option<Self> {
        let bytes: &[u8; TRAILER_LEN] = bytes.try_into().ok()?;
        if &bytes[..8] != MAGIC_TRAILER {
            return None;
        }
        let word = |at: usize| {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(&bytes[at..at + 8]);
            u64::from_be_bytes(buf)
        };
        Some(Self {
            bundle_pos: word(8),
            metadata_pos: word(16),
        })
    }

    fn encode(&self) -> [u8; TRAILER_LEN] {
        let mut bytes = [0u8; TRAILER_LEN];
        bytes[..8].copy_from_slice(MAGIC_TRAILER);
        bytes[8..16].copy_from_slice(&self.bundle_pos.to_be_bytes());
        bytes[16..].copy_from_slice(&self.metadata_pos.to_be_bytes());
        bytes
    }

    /// Byte ranges of the assets and metadata sections, checked against the
    /// position of the trailer itself.
    fn sections(&self, trailer_pos: u64) -> Result<(Range<u64>, Range<u64>), BundleError> {
        if self.bundle_pos > self.metadata_pos || self.metadata_pos > trailer_pos {
            return Err(BundleError::Corrupt(format!(
                "section offsets {}..{}..{trailer_pos} are out of order",
                self.bundle_pos, self.metadata_pos
            )));
        }
        Ok((
            self.bundle_pos..self.metadata_pos,
            self.metadata_pos..trailer_pos,
        ))
    }
}

fn usize_range(range: Range<u64>) -> Result<Range<usize>, BundleError> {
    let convert = |n: u64| {
        usize::try_from(n).map_err(|_| BundleError::Corrupt(format!("offset {n} is too large")))
    };
    Ok(convert(range.start)?..convert(range.end)?)
}

fn read_trailer(file: &mut File) -> Result<Option<Trailer>, BundleError> {
    if file.metadata()?.len() < TRAILER_LEN as u64 {
        return Ok(None);
    }
    file.seek(SeekFrom::End(-(TRAILER_LEN as i64)))?;
    let mut bytes = [0u8; TRAILER_LEN];
    file.read_exact(&mut bytes)?;
    Ok(Trailer::parse(&bytes))
}

/// Whether the file at `path` ends in a standalone trailer.
pub fn has_trailer(path: &Path) -> Result<bool, BundleError> {
    let mut file = File::open(path)?;
    Ok(read_trailer(&mut file)?.is_some())
}

/// The executable part of `image`, with any appended bundle removed.
pub fn base_image(mut image: Vec<u8>) -> Vec<u8> {
    let Some(trailer_pos) = image.len().checked_sub(TRAILER_LEN) else {
        return image;
    };
    let bundle_pos = Trailer::parse(&image[trailer_pos..])
        .and_then(|trailer| trailer.sections(trailer_pos as u64).ok())
        .and_then(|(assets, _)| usize::try_from(assets.start).ok());
    if let Some(bundle_pos) = bundle_pos {
        image.truncate(bundle_pos);
    }
    image
}

/// Write a standalone image to `output` and mark it executable.
///
/// An existing file is only replaced when it is itself a standalone, so a
/// typo in `-o` cannot clobber an unrelated file. Returns the path written,
/// which gains an `.exe` suffix on Windows.
pub fn write_image(output: &Path, image: &[u8]) -> Result<PathBuf, BundleError> {
    let output = executable_path(output);
    if output.is_dir() {
        return Err(BundleError::OutputIsDirectory(output));
    }
    if output.exists() && !has_trailer(&output)? {
        return Err(BundleError::RefuseOverwrite(output));
    }

    fs::write(&output, image)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&output, fs::Permissions::from_mode(0o755))?;
    }
    Ok(output)
}

fn executable_path(output: &Path) -> PathBuf {
    if cfg!(windows) && output.extension().is_none() {
        output.with_extension("exe")
    } else {
        output.to_path_buf()
    }
}

/// Compile the site around `entry` into a standalone built from `base`.
pub fn compile_with_base(
    entry: &Path,
    output: &Path,
    base: Vec<u8>,
) -> Result<PathBuf, BundleError> {
    let bundle = Standalone::from_entry(entry)?;
    debug!(entry = bundle.entry(), files = bundle.assets.len(), "site packed");
    let image = bundle.append_to(base_image(base))?;
    let written = write_image(output, &image)?;
    info!(
        output = %written.display(),
        bytes = image.len(),
        "standalone written"
    );
    Ok(written)
}

/// Compile the site around `entry` into a standalone copy of the running
/// executable.
pub fn compile(entry: &Path, output: &Path) -> Result<PathBuf, BundleError> {
    let base = fs::read(std::env::current_exe()?)?;
    compile_with_base(entry, output, base)
}
