pub mod pet;
pub mod tag;
pub mod user_app;

/// Picture picked by the owner, ready to upload
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Pic {
    pub body: Vec<u8>,
    pub filename_extension: String,
}

impl Pic {
    /// Mime type sent with the upload, jpeg unless the picture says otherwise
    pub fn content_type(&self) -> &'static str {
        match self.filename_extension.as_str() {
            "png" => "image/png",
            "heic" => "image/heic",
            _ => "image/jpeg",
        }
    }
}
