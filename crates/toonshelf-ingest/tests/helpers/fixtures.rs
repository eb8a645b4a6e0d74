use std::io::{Cursor, Write};
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

/// Build an in-memory ZIP. Names ending in `/` become directory entries.
pub fn build_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
    build_archive_with(entries, CompressionMethod::Deflated)
}

pub fn build_archive_with(entries: &[(&str, &[u8])], method: CompressionMethod) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(method);
    for (name, data) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options).unwrap();
        } else {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
    }
    writer.finish().unwrap().into_inner()
}

/// Flip one byte of a stored entry's payload so its CRC no longer matches.
///
/// `payload` must occur exactly once in the archive.
pub fn corrupt_payload(archive: &mut [u8], payload: &[u8]) {
    let positions: Vec<usize> = archive
        .windows(payload.len())
        .enumerate()
        .filter(|(_, window)| *window == payload)
        .map(|(pos, _)| pos)
        .collect();
    assert_eq!(positions.len(), 1, "payload must be unique in the archive");
    archive[positions[0]] ^= 0xFF;
}

/// Five single-page panels named page1.png .. page5.png
pub fn five_page_archive() -> Vec<u8> {
    build_archive(&[
        ("page1.png", b"p1"),
        ("page2.png", b"p2"),
        ("page3.png", b"p3"),
        ("page4.png", b"p4"),
        ("page5.png", b"p5"),
    ])
}
