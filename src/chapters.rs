use std::path::PathBuf;

use tracing::info;

use crate::audio_metadata::probe_audio;
use crate::error::PrepError;
use crate::tags::{TagKey, read_tag};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub name: String,
    /// Milliseconds.
    pub duration: u64,
    pub start: u64,
    pub end: u64,
}

/// Header fields written above the chapter list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataHeader {
    pub title: String,
    pub artist: String,
    pub genre: String,
}

impl Default for MetadataHeader {
    fn default() -> Self {
        Self {
            title: "Audiobook".to_string(),
            artist: "Unknown".to_string(),
            genre: "Audiobook".to_string(),
        }
    }
}

/// Lay out chapters back to back from `(name, duration_ms)` pairs, in the given order.
pub fn layout_chapters<I>(entries: I) -> Vec<Chapter>
where
    I: IntoIterator<Item = (String, u64)>,
{
    let mut playhead = 0u64;
    entries
        .into_iter()
        .map(|(name, duration)| {
            let start = playhead;
            let end = start + duration;
            playhead = end;
            Chapter {
                name,
                duration,
                start,
                end,
            }
        })
        .collect()
}

/// Read title and duration for each file and lay the chapters out.
///
/// Fails on the first file with no title or no readable duration.
pub fn get_chapter_list(files: &[PathBuf], debug: bool) -> Result<Vec<Chapter>, PrepError> {
    let mut entries = Vec::with_capacity(files.len());
    for file in files {
        let title = read_tag(file, &TagKey::Title)?.ok_or_else(|| PrepError::MissingTag {
            path: file.clone(),
            tag: "title",
        })?;
        let duration = probe_audio(file, debug)?.duration_ms(file)?;
        info!("Chapter '{}' from {} ({} ms)", title, file.display(), duration);
        entries.push((title, duration));
    }
    Ok(layout_chapters(entries))
}

fn escape_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '=' | ';' | '#' | '\\' | '\n') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Serialize the chapter list as an ffmpeg metadata document.
pub fn render_metadata(header: &MetadataHeader, chapters: &[Chapter]) -> String {
    let mut doc = format!(
        ";FFMETADATA1\ntitle={}\nartist={}\ngenre={}\n",
        escape_value(&header.title),
        escape_value(&header.artist),
        escape_value(&header.genre)
    );

    for chapter in chapters {
        doc.push_str(&format!(
            "\n[CHAPTER]\nTIMEBASE=1/1000\nSTART={}\nEND={}\ntitle={}\n",
            chapter.start,
            chapter.end,
            escape_value(&chapter.name)
        ));
    }
    doc
}
