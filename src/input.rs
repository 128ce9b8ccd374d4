use std::path::Path;

const PDF_MAGIC: &[u8] = b"%PDF-";
const IMAGE_EXTENSIONS: [&str; 8] = ["png", "jpg", "jpeg", "gif", "bmp", "webp", "tif", "tiff"];

/// Kind of a user-selected file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Image,
}

impl FileKind {
    /// Classify by content first, then by extension.
    pub fn sniff(bytes: &[u8], path: Option<&Path>) -> Option<Self> {
        if bytes.starts_with(PDF_MAGIC) {
            return Some(FileKind::Pdf);
        }
        if image::guess_format(bytes).is_ok() {
            return Some(FileKind::Image);
        }

        let ext = path?.extension()?.to_str()?.to_ascii_lowercase();
        if ext == "pdf" {
            Some(FileKind::Pdf)
        } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(FileKind::Image)
        } else {
            None
        }
    }
}
