//! Corpus assembly: every encoded song followed by a delimiter block
//!
//! The block is `sequence_length` delimiter tokens long, so a training window
//! that starts inside one song reaches a delimiter before it can reach the
//! next song.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};

/// `sequence_length` delimiters separated by spaces
pub fn delimiter_block(delimiter: &str, sequence_length: usize) -> String {
    vec![delimiter; sequence_length].join(" ")
}

/// Concatenate encoded songs, each followed by a delimiter block
pub fn join_songs<S: AsRef<str>>(songs: &[S], sequence_length: usize, delimiter: &str) -> String {
    let block = delimiter_block(delimiter, sequence_length);
    let mut parts: Vec<&str> = Vec::with_capacity(songs.len() * 2);
    for song in songs {
        let song = song.as_ref().trim();
        if !song.is_empty() {
            parts.push(song);
        }
        if !block.is_empty() {
            parts.push(&block);
        }
    }
    parts.join(" ")
}

/// Encoded song files in `songs_dir`, in processing-index order
///
/// Files named by a number sort numerically (`2` before `10`); any other
/// names follow, sorted by path.
pub fn list_song_files(songs_dir: &Path) -> Result<Vec<PathBuf>> {
    if !songs_dir.is_dir() {
        return Err(PipelineError::MissingDirectory(songs_dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(songs_dir).map_err(|e| PipelineError::io(songs_dir, e))? {
        let path = entry.map_err(|e| PipelineError::io(songs_dir, e))?.path();
        if path.is_file() {
            files.push(path);
        }
    }

    files.sort_by_key(|path| {
        let index = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.parse::<u64>().ok());
        (index.is_none(), index, path.clone())
    });
    Ok(files)
}

/// Read an encoded song
pub fn load<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))
}

/// Build the corpus from `songs_dir` and write it to `dataset_path`
pub fn create_universal_dataset(
    songs_dir: &Path,
    dataset_path: &Path,
    sequence_length: usize,
    delimiter: &str,
) -> Result<String> {
    let songs = list_song_files(songs_dir)?
        .iter()
        .map(load)
        .collect::<Result<Vec<_>>>()?;

    let corpus = join_songs(&songs, sequence_length, delimiter);
    fs::write(dataset_path, &corpus).map_err(|e| PipelineError::io(dataset_path, e))?;

    log::info!(
        "assembled {} songs into {} ({} tokens)",
        songs.len(),
        dataset_path.display(),
        corpus.split_whitespace().count()
    );
    Ok(corpus)
}
