//! Metadata extraction from audio files

use crate::{ImportError, Result};
use lark_core::UNKNOWN;
use lofty::{Accessor, AudioFile, ItemKey, Tag, TaggedFileExt};
use std::path::Path;

/// Catalog fields read from one audio file
///
/// Every field has a value: missing tags fall back to the file name (title),
/// [`UNKNOWN`] (artist, album, genre) or 0 (track number).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackTags {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub genre: String,
    pub duration_secs: u32,
    pub track_number: u32,
    pub year: Option<String>,
}

impl TrackTags {
    /// Tags of a file that carries none
    pub fn untagged(path: &Path) -> Self {
        Self {
            title: file_name(path),
            artist: UNKNOWN.to_string(),
            album: UNKNOWN.to_string(),
            genre: UNKNOWN.to_string(),
            duration_secs: 0,
            track_number: 0,
            year: None,
        }
    }
}

/// Read the catalog fields of an audio file
pub fn read_track_tags(path: &Path) -> Result<TrackTags> {
    let tagged_file = lofty::read_from_path(path)
        .map_err(|e| ImportError::Metadata(format!("{}: {}", path.display(), e)))?;

    let mut tags = TrackTags::untagged(path);
    tags.duration_secs = u32::try_from(tagged_file.properties().duration().as_secs()).unwrap_or(u32::MAX);

    if let Some(tag) = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) {
        apply_tag(&mut tags, tag);
    }

    Ok(tags)
}

fn apply_tag(tags: &mut TrackTags, tag: &Tag) {
    if let Some(title) = non_empty(tag.title().as_deref()) {
        tags.title = title;
    }
    if let Some(artist) = non_empty(tag.artist().as_deref()) {
        tags.artist = artist;
    }
    // Performer wins over artist
    if let Some(performer) = non_empty(tag.get_string(&ItemKey::Performer)) {
        tags.artist = performer;
    }
    if let Some(album) = non_empty(tag.album().as_deref()) {
        tags.album = album;
    }
    if let Some(genre) = non_empty(tag.genre().as_deref()) {
        tags.genre = genre;
    }

    tags.track_number = tag
        .get_string(&ItemKey::TrackNumber)
        .and_then(parse_track_number)
        .or_else(|| tag.track())
        .unwrap_or(0);

    tags.year = non_empty(tag.get_string(&ItemKey::RecordingDate))
        .or_else(|| tag.year().map(|y| y.to_string()));
}

/// Parse a track number tag, accepting the `3/12` form
pub fn parse_track_number(raw: &str) -> Option<u32> {
    let number = raw.split('/').next().unwrap_or(raw).trim();
    number.parse().ok()
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lofty::TagType;
    use std::path::PathBuf;

    #[test]
    fn test_parse_track_number() {
        assert_eq!(parse_track_number("3"), Some(3));
        assert_eq!(parse_track_number("3/12"), Some(3));
        assert_eq!(parse_track_number(" 07 / 10"), Some(7));
        assert_eq!(parse_track_number("A1"), None);
        assert_eq!(parse_track_number(""), None);
    }

    #[test]
    fn test_untagged_defaults() {
        let tags = TrackTags::untagged(&PathBuf::from("/music/x/01 - Song.ogg"));
        assert_eq!(tags.title, "01 - Song.ogg");
        assert_eq!(tags.artist, "Unknown");
        assert_eq!(tags.album, "Unknown");
        assert_eq!(tags.genre, "Unknown");
        assert_eq!(tags.track_number, 0);
        assert_eq!(tags.year, None);
    }

    #[test]
    fn test_apply_tag_reads_fields() {
        let mut tag = Tag::new(TagType::VorbisComments);
        tag.set_title("So What".to_string());
        tag.set_artist("Miles Davis".to_string());
        tag.set_album("Kind of Blue".to_string());
        tag.set_genre("Jazz".to_string());
        tag.insert_text(ItemKey::TrackNumber, "1/5".to_string());
        tag.insert_text(ItemKey::RecordingDate, "1959".to_string());

        let mut tags = TrackTags::untagged(Path::new("a.ogg"));
        apply_tag(&mut tags, &tag);

        assert_eq!(tags.title, "So What");
        assert_eq!(tags.artist, "Miles Davis");
        assert_eq!(tags.album, "Kind of Blue");
        assert_eq!(tags.genre, "Jazz");
        assert_eq!(tags.track_number, 1);
        assert_eq!(tags.year.as_deref(), Some("1959"));
    }

    #[test]
    fn test_performer_overrides_artist() {
        let mut tag = Tag::new(TagType::VorbisComments);
        tag.set_artist("Composer".to_string());
        tag.insert_text(ItemKey::Performer, "Orchestra".to_string());

        let mut tags = TrackTags::untagged(Path::new("a.flac"));
        apply_tag(&mut tags, &tag);

        assert_eq!(tags.artist, "Orchestra");
        assert_eq!(tags.album, "Unknown");
    }

    #[test]
    fn test_blank_fields_keep_fallbacks() {
        let mut tag = Tag::new(TagType::VorbisComments);
        tag.set_title("   ".to_string());
        tag.set_genre(String::new());

        let mut tags = TrackTags::untagged(Path::new("/m/track.mp3"));
        apply_tag(&mut tags, &tag);

        assert_eq!(tags.title, "track.mp3");
        assert_eq!(tags.genre, "Unknown");
    }

    #[test]
    fn test_unreadable_file_is_metadata_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.mp3");
        std::fs::write(&path, b"not audio").unwrap();

        assert!(matches!(read_track_tags(&path), Err(ImportError::Metadata(_))));
    }
}
