use std::io::Cursor;

pub struct ExifExtractor;

impl ExifExtractor {
    /// Whether the encoded container carries at least one EXIF field.
    pub fn has_metadata(bytes: &[u8]) -> bool {
        Self::read(bytes).is_some_and(|exif| exif.fields().next().is_some())
    }

    fn read(bytes: &[u8]) -> Option<exif::Exif> {
        let mut reader = Cursor::new(bytes);

        match exif::Reader::new().read_from_container(&mut reader) {
            Ok(exif) => Some(exif),
            Err(err) => {
                log::debug!("No EXIF data found: {}", err);
                None
            }
        }
    }
}
