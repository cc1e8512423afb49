use crate::{consts, front::errors::UserError, models::tag::TagSource};

/// Checks a tag code typed or read by a scanner, returns it trimmed
pub fn validate_tag_code(code: &str) -> Result<String, UserError> {
    let code = code.trim();
    let len = code.chars().count();

    if len < consts::TAG_CODE_MIN_LEN {
        return Err(UserError::FormInputValueError(
            "El código del tag es obligatorio".into(),
        ));
    }

    if len > consts::TAG_CODE_MAX_LEN {
        return Err(UserError::FormInputValueError(
            "El código del tag es demasiado largo".into(),
        ));
    }

    Ok(code.to_string())
}

/// State of the "link tag" screen: one input per reader plus the reader
/// currently waiting for a read
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LinkTagForm {
    pub qr_code: String,
    pub nfc_code: String,
    pub scan_hint: Option<String>,
    pub capturing: Option<TagSource>,
}

impl LinkTagForm {
    pub fn code_mut(&mut self, source: TagSource) -> &mut String {
        match source {
            TagSource::Qr => &mut self.qr_code,
            TagSource::Nfc => &mut self.nfc_code,
        }
    }

    /// Waits for the next read of `source`, clearing its previous value
    pub fn start_capture(&mut self, source: TagSource) {
        self.scan_hint = Some(format!("Esperando lectura del lector {source}..."));
        self.code_mut(source).clear();
        self.capturing = Some(source);
    }

    /// Stores a read in the input of `source`
    pub fn register_read(&mut self, source: TagSource, code: &str) {
        *self.code_mut(source) = code.to_string();
    }

    /// After a successful link
    pub fn finish(&mut self, source: TagSource) {
        self.code_mut(source).clear();
        self.scan_hint = None;
        self.capturing = None;
    }
}
