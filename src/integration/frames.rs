//! Sequential frame input and output.
//!
//! Video containers are left to external tools; frames travel as numbered
//! image files (e.g. `ffmpeg -i clip.mp4 frames/%06d.png`).

use std::path::{Path, PathBuf};

use image::RgbImage;
use tracing::debug;

use crate::error::{Result, TrackError};

const FRAME_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// Ordered supply of frames. `Ok(None)` marks end of stream.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Option<RgbImage>>;
}

/// Ordered consumer of annotated frames.
pub trait FrameSink {
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()>;

    /// Called once after the last frame.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Piece of a file name for ordering: digit runs compare as numbers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum NameChunk {
    /// Significant digits (leading zeros stripped), length first
    Number(usize, String),
    Text(String),
}

/// `frame2.png` sorts before `frame10.png`; zero-padded names keep their order.
pub(crate) fn frame_order_key(path: &Path) -> (Vec<NameChunk>, PathBuf) {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut chunks = Vec::new();
    let mut rest = name.as_str();
    while let Some(first) = rest.chars().next() {
        let is_digit = first.is_ascii_digit();
        let end = rest
            .find(|c: char| c.is_ascii_digit() != is_digit)
            .unwrap_or(rest.len());
        let (run, tail) = rest.split_at(end);
        chunks.push(if is_digit {
            let digits = run.trim_start_matches('0');
            NameChunk::Number(digits.len(), digits.to_string())
        } else {
            NameChunk::Text(run.to_string())
        });
        rest = tail;
    }
    // full path breaks ties such as `01.png` vs `1.png`
    (chunks, path.to_path_buf())
}

/// Image files in a directory, read in numeric file-name order.
#[derive(Debug, Clone)]
pub struct ImageSequence {
    paths: Vec<PathBuf>,
    cursor: usize,
}

impl ImageSequence {
    /// Fails when the directory is missing, unreadable or holds no frames.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir)
            .map_err(|err| TrackError::FrameSource(format!("{}: {err}", dir.display())))?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let is_frame = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| FRAME_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
            if is_frame && path.is_file() {
                paths.push(path);
            }
        }

        if paths.is_empty() {
            return Err(TrackError::FrameSource(format!(
                "{}: no image frames found",
                dir.display()
            )));
        }
        paths.sort_by_cached_key(|path| frame_order_key(path));
        debug!(dir = %dir.display(), frames = paths.len(), "opened image sequence");

        Ok(Self { paths, cursor: 0 })
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl FrameSource for ImageSequence {
    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        let Some(path) = self.paths.get(self.cursor) else {
            return Ok(None);
        };
        self.cursor += 1;
        Ok(Some(image::open(path)?.to_rgb8()))
    }
}

/// Writes frames as `frame_000000.png`, `frame_000001.png`, ...
#[derive(Debug, Clone)]
pub struct ImageSequenceWriter {
    dir: PathBuf,
    written: usize,
}

impl ImageSequenceWriter {
    /// Creates the output directory if needed.
    pub fn create(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir, written: 0 })
    }

    pub fn written(&self) -> usize {
        self.written
    }
}

impl FrameSink for ImageSequenceWriter {
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()> {
        let path = self.dir.join(format!("frame_{:06}.png", self.written));
        frame.save(&path)?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        debug!(dir = %self.dir.display(), frames = self.written, "image sequence written");
        Ok(())
    }
}
