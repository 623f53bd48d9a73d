//! In-memory implementation of the Typst World trait
//!
//! A Bill of Lading is a single generated source file; there are no
//! includes, images or packages, so the world holds exactly one `Source`.

use chrono::{DateTime, Datelike, Timelike, Utc};
use typst::diag::{FileError, FileResult};
use typst::foundations::{Bytes, Datetime};
use typst::syntax::{FileId, Source, VirtualPath};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, World};

use super::fonts::{global_font_cache, FontCache};

pub const MAIN_PATH: &str = "/main.typ";

pub struct VirtualWorld {
    main: Source,
    font_cache: &'static FontCache,
    /// Fixed so that recompiling the same tree gives the same document
    time: DateTime<Utc>,
    library: LazyHash<Library>,
}

impl VirtualWorld {
    pub fn new(source: String, time: DateTime<Utc>) -> Self {
        let id = FileId::new(None, VirtualPath::new(MAIN_PATH));
        Self {
            main: Source::new(id, source),
            font_cache: global_font_cache(),
            time,
            library: LazyHash::new(Library::builder().build()),
        }
    }

    pub fn source_text(&self) -> &str {
        self.main.text()
    }

    fn not_found(id: FileId) -> FileError {
        FileError::NotFound(id.vpath().as_rootless_path().into())
    }
}

impl World for VirtualWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        self.font_cache.book()
    }

    fn main(&self) -> FileId {
        self.main.id()
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.main.id() {
            Ok(self.main.clone())
        } else {
            Err(Self::not_found(id))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        if id == self.main.id() {
            Ok(Bytes::from(self.main.text().as_bytes().to_vec()))
        } else {
            Err(Self::not_found(id))
        }
    }

    fn font(&self, index: usize) -> Option<Font> {
        self.font_cache.font(index)
    }

    fn today(&self, offset: Option<i64>) -> Option<Datetime> {
        let adjusted = self.time + chrono::Duration::hours(offset.unwrap_or(0));

        Datetime::from_ymd_hms(
            adjusted.year(),
            adjusted.month() as u8,
            adjusted.day() as u8,
            adjusted.hour() as u8,
            adjusted.minute() as u8,
            adjusted.second() as u8,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_main_source_is_served() {
        let world = VirtualWorld::new("Hello, World!".to_string(), fixed_time());
        let source = world.source(world.main()).unwrap();
        assert_eq!(source.text(), "Hello, World!");
        assert_eq!(world.source_text(), "Hello, World!");
    }

    #[test]
    fn test_other_files_are_missing() {
        let world = VirtualWorld::new(String::new(), fixed_time());
        let other = FileId::new(None, VirtualPath::new("/logo.png"));
        assert!(world.file(other).is_err());
        assert!(world.source(other).is_err());
    }

    #[test]
    fn test_today_is_fixed() {
        let world = VirtualWorld::new(String::new(), fixed_time());
        let today = world.today(None).unwrap();
        assert_eq!(today.year(), Some(2025));
        assert_eq!(today.month(), Some(3));
        assert_eq!(today.day(), Some(14));
    }
}
