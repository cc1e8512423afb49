use crate::{consts, front::errors::UserError, models};
use base64::{Engine, engine::general_purpose::STANDARD};
use std::path::Path;

/// Where a picked picture comes from
#[derive(Debug, Clone, PartialEq)]
pub enum PhotoInput {
    File(String),
    /// Raw base64 or a `data:` uri
    Encoded(String),
}

impl PhotoInput {
    /// base64 never contains a dot, so anything with an extension is a file
    pub fn parse(input: &str) -> Self {
        let input = input.trim();

        if input.starts_with("data:") || Path::new(input).extension().is_none() {
            return PhotoInput::Encoded(input.to_string());
        }
        PhotoInput::File(input.to_string())
    }
}

fn unreadable() -> UserError {
    UserError::InvalidPic("No se pudo leer la imagen".into())
}

fn check_size(body: &[u8]) -> Result<(), UserError> {
    if body.len() > consts::PIC_PET_MAX_SIZE_BYTES {
        return Err(UserError::InvalidPic(format!(
            "La imagen es muy grande. Máximo: {} MB",
            consts::PIC_PET_MAX_SIZE_BYTES / 1_000_000
        )));
    }
    Ok(())
}

pub fn get_filename_extension(path: &str) -> Result<String, UserError> {
    let extension = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.trim().to_lowercase())
        .unwrap_or_default();

    if !consts::ACCEPTED_IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        return Err(UserError::InvalidPic(format!(
            "Formato no soportado, usa: {}",
            consts::ACCEPTED_IMAGE_EXTENSIONS.join(", ")
        )));
    }

    Ok(extension)
}

/// Decodes a base64 payload, with or without `data:<mime>;base64,` prefix
pub fn decode_encoded_photo(encoded: &str) -> Result<models::Pic, UserError> {
    let (mime, payload) = match encoded.trim().strip_prefix("data:") {
        Some(uri) => uri.split_once(',').ok_or_else(unreadable)?,
        None => ("", encoded.trim()),
    };

    if payload.trim().is_empty() {
        return Err(unreadable());
    }

    let body = STANDARD.decode(payload.trim()).map_err(|_| unreadable())?;
    if body.is_empty() {
        return Err(unreadable());
    }
    check_size(&body)?;

    let filename_extension = mime
        .split(';')
        .next()
        .and_then(|m| m.strip_prefix("image/"))
        .unwrap_or("jpg")
        .to_lowercase();

    Ok(models::Pic {
        body,
        filename_extension,
    })
}

/// Reads the picture picked by the owner
pub async fn read_picked_photo(input: &PhotoInput) -> anyhow::Result<models::Pic> {
    match input {
        PhotoInput::Encoded(encoded) => Ok(decode_encoded_photo(encoded)?),
        PhotoInput::File(path) => {
            let filename_extension = get_filename_extension(path)?;

            let body = tokio::fs::read(path).await.map_err(|e| {
                log::warn!("picked photo {path} could not be read: {e}");
                unreadable()
            })?;

            if body.is_empty() {
                return Err(unreadable().into());
            }
            check_size(&body)?;

            Ok(models::Pic {
                body,
                filename_extension,
            })
        }
    }
}
