//! Archive entry classification.

use toonshelf_core::ImageKind;

/// What the ingestor does with an archive entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryClass {
    /// Becomes a panel, tagged with the kind inferred from its extension
    Image(ImageKind),
    /// Directory markers, metadata (`ComicInfo.xml`), anything that is not a panel image
    Ignored,
}

/// Classify an entry by its path inside the archive.
///
/// Only the extension of the final path segment matters; how deeply the entry
/// is nested does not.
pub fn classify_entry(name: &str) -> EntryClass {
    if name.is_empty() || name.ends_with('/') || name.ends_with('\\') {
        return EntryClass::Ignored;
    }

    match ImageKind::from_file_name(name) {
        Some(kind) => EntryClass::Image(kind),
        None => EntryClass::Ignored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_images_are_classified_by_extension() {
        assert_eq!(classify_entry("page1.jpg"), EntryClass::Image(ImageKind::Jpeg));
        assert_eq!(classify_entry("page1.JPEG"), EntryClass::Image(ImageKind::Jpeg));
        assert_eq!(classify_entry("page2.png"), EntryClass::Image(ImageKind::Png));
        assert_eq!(classify_entry("page3.WebP"), EntryClass::Image(ImageKind::Webp));
        assert_eq!(classify_entry("page4.gif"), EntryClass::Image(ImageKind::Gif));
    }

    #[test]
    fn test_non_images_are_ignored() {
        assert_eq!(classify_entry("cover.txt"), EntryClass::Ignored);
        assert_eq!(classify_entry("ComicInfo.xml"), EntryClass::Ignored);
        assert_eq!(classify_entry("page.bmp"), EntryClass::Ignored);
        assert_eq!(classify_entry("README"), EntryClass::Ignored);
        assert_eq!(classify_entry(""), EntryClass::Ignored);
    }

    #[test]
    fn test_directories_are_ignored() {
        assert_eq!(classify_entry("chapter1/"), EntryClass::Ignored);
        assert_eq!(classify_entry("scans.png/"), EntryClass::Ignored);
    }

    #[test]
    fn test_nested_images_are_kept() {
        assert_eq!(
            classify_entry("chapter1/part2/page1.jpg"),
            EntryClass::Image(ImageKind::Jpeg)
        );
        assert_eq!(
            classify_entry("__MACOSX/thumb.png"),
            EntryClass::Image(ImageKind::Png)
        );
    }

    #[test]
    fn test_dots_in_directory_names_do_not_count() {
        assert_eq!(classify_entry("vol.1.png/notes"), EntryClass::Ignored);
        assert_eq!(classify_entry("vol.1/page.gif"), EntryClass::Image(ImageKind::Gif));
    }
}
