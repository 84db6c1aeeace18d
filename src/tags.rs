use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use id3::{Tag, TagLike, Version};
use tracing::debug;

use crate::error::PrepError;

/// A tag key, either from the named vocabulary or a raw ID3v2 text frame id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagKey {
    Title,
    Album,
    Artist,
    AlbumArtist,
    Composer,
    DiscNumber,
    TrackNumber,
    Genre,
    Date,
    Frame(String),
}

impl TagKey {
    pub fn frame_id(&self) -> &str {
        match self {
            TagKey::Title => "TIT2",
            TagKey::Album => "TALB",
            TagKey::Artist => "TPE1",
            TagKey::AlbumArtist => "TPE2",
            TagKey::Composer => "TCOM",
            TagKey::DiscNumber => "TPOS",
            TagKey::TrackNumber => "TRCK",
            TagKey::Genre => "TCON",
            TagKey::Date => "TDRC",
            TagKey::Frame(id) => id,
        }
    }
}

impl fmt::Display for TagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TagKey::Title => "title",
            TagKey::Album => "album",
            TagKey::Artist => "artist",
            TagKey::AlbumArtist => "albumartist",
            TagKey::Composer => "composer",
            TagKey::DiscNumber => "discnumber",
            TagKey::TrackNumber => "tracknumber",
            TagKey::Genre => "genre",
            TagKey::Date => "date",
            TagKey::Frame(id) => id,
        };
        f.write_str(name)
    }
}

impl FromStr for TagKey {
    type Err = PrepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = match s.to_ascii_lowercase().as_str() {
            "title" => TagKey::Title,
            "album" => TagKey::Album,
            "artist" | "author" => TagKey::Artist,
            "albumartist" | "album-artist" | "album_artist" => TagKey::AlbumArtist,
            "composer" | "narrator" => TagKey::Composer,
            "discnumber" | "disc" => TagKey::DiscNumber,
            "tracknumber" | "track" => TagKey::TrackNumber,
            "genre" => TagKey::Genre,
            "date" | "year" => TagKey::Date,
            _ if is_text_frame_id(s) => TagKey::Frame(s.to_string()),
            _ => return Err(PrepError::UnknownTag(s.to_string())),
        };
        Ok(key)
    }
}

// Only plain text frames carry a single string value. TXXX needs a description.
fn is_text_frame_id(s: &str) -> bool {
    s.len() == 4
        && s.starts_with('T')
        && s != "TXXX"
        && s.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

/// A file's tag set, resolved before mutation.
#[derive(Debug)]
pub enum TagContainer {
    Existing(Tag),
    Empty,
}

impl TagContainer {
    pub fn open(path: &Path) -> Result<Self, PrepError> {
        match Tag::read_from_path(path) {
            Ok(tag) => Ok(TagContainer::Existing(tag)),
            Err(id3::Error {
                kind: id3::ErrorKind::NoTag,
                ..
            }) => {
                debug!("No ID3 header in {}, starting from an empty tag", path.display());
                Ok(TagContainer::Empty)
            }
            Err(source) => Err(PrepError::TagIo {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn get(&self, key: &TagKey) -> Option<&str> {
        match self {
            TagContainer::Existing(tag) => tag.get(key.frame_id()).and_then(|f| f.content().text()),
            TagContainer::Empty => None,
        }
    }

    pub fn into_tag(self) -> Tag {
        match self {
            TagContainer::Existing(tag) => tag,
            TagContainer::Empty => Tag::new(),
        }
    }
}

/// Set `key` to `value` on a single file and save it straight away.
pub fn update_tag(path: &Path, key: &TagKey, value: &str) -> Result<(), PrepError> {
    let mut tag = TagContainer::open(path)?.into_tag();
    tag.set_text(key.frame_id(), value);
    tag.write_to_path(path, Version::Id3v24)
        .map_err(|source| PrepError::TagIo {
            path: path.to_path_buf(),
            source,
        })?;
    debug!("Set {} = '{}' on {}", key, value, path.display());
    Ok(())
}

/// Update `key` on every file in order, with the value for the n-th file given by `value_for(n)`.
///
/// Failures are reported and skipped. Returns the number of files written.
pub fn batch_update_tag<F>(
    files: &[PathBuf],
    key: &TagKey,
    mut value_for: F,
    out: &mut dyn Write,
) -> io::Result<usize>
where
    F: FnMut(usize) -> String,
{
    let mut updated = 0;
    for (index, file) in files.iter().enumerate() {
        let value = value_for(index);
        match update_tag(file, key, &value) {
            Ok(()) => updated += 1,
            Err(e) => {
                debug!("Skipping {}: {:?}", file.display(), e);
                writeln!(out, "⚠️ {}", e)?;
            }
        }
    }
    Ok(updated)
}

/// The tag values shown by `show-tags`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TagRow {
    pub title: String,
    pub album: String,
    pub artist: String,
    pub album_artist: String,
    pub composer: String,
    pub disc: String,
    pub track: String,
}

impl TagRow {
    pub fn cells(&self) -> [&str; 7] {
        [
            &self.title,
            &self.album,
            &self.artist,
            &self.album_artist,
            &self.composer,
            &self.disc,
            &self.track,
        ]
    }
}

pub fn read_tag_row(path: &Path) -> Result<TagRow, PrepError> {
    let tags = TagContainer::open(path)?;
    let value = |key: TagKey| tags.get(&key).unwrap_or_default().to_string();
    Ok(TagRow {
        title: value(TagKey::Title),
        album: value(TagKey::Album),
        artist: value(TagKey::Artist),
        album_artist: value(TagKey::AlbumArtist),
        composer: value(TagKey::Composer),
        disc: value(TagKey::DiscNumber),
        track: value(TagKey::TrackNumber),
    })
}

/// Read a single tag, `None` if the file has no tag header or no such frame.
pub fn read_tag(path: &Path, key: &TagKey) -> Result<Option<String>, PrepError> {
    Ok(TagContainer::open(path)?.get(key).map(str::to_string))
}
