use derive_more::{Display, Error};
use log::error;

/// Refusals the client decides on its own, before or after a backend call
#[derive(Debug, Display, Error, PartialEq)]
pub enum UserError {
    #[display("{_0}")]
    FormInputValueError(#[error(not(source))] String),
    #[display("Usuario no autenticado")]
    Unauthorized,
    #[display("Selecciona una mascota primero")]
    NoPetSelected,
    #[display("El tag no existe o ya está vinculado a otra mascota.")]
    TagUnavailable,
    #[display("Este tag no está vinculado o la mascota no está marcada como perdida.")]
    PublicPetNotFound,
    #[display("Ingresa el código del tag")]
    EmptyTagCode,
    #[display("{_0}")]
    InvalidPic(#[error(not(source))] String),
    #[display("Comando no reconocido: {_0}. Escribe help para ver las opciones")]
    UnknownCommand(#[error(not(source))] String),
}

impl UserError {
    fn alert_title(&self) -> &'static str {
        match self {
            UserError::FormInputValueError(_) => "Validación",
            UserError::Unauthorized | UserError::InvalidPic(_) => "Error",
            UserError::NoPetSelected | UserError::EmptyTagCode | UserError::UnknownCommand(_) => {
                "Atención"
            }
            UserError::TagUnavailable => "Tag no disponible",
            UserError::PublicPetNotFound => "No encontrado",
        }
    }
}

/// Message box shown to the user, the only way failures surface
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub title: String,
    pub message: Option<String>,
}

impl Alert {
    pub fn new(title: &str, message: &str) -> Self {
        Self {
            title: title.to_string(),
            message: Some(message.to_string()),
        }
    }

    pub fn title_only(title: &str) -> Self {
        Self {
            title: title.to_string(),
            message: None,
        }
    }

    /// Alert for a failed action. Client side refusals keep their own title,
    /// anything else shows `title` and the message of the root cause, which
    /// is what the backend said.
    pub fn from_error(title: &str, err: &anyhow::Error) -> Self {
        if let Some(user_error) = err.downcast_ref::<UserError>() {
            return Self::new(user_error.alert_title(), &user_error.to_string());
        }

        error!("{title}: {err:#}");
        Self::new(title, &err.root_cause().to_string())
    }
}

impl std::fmt::Display for Alert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.message {
            Some(message) => write!(f, "[{}] {}", self.title, message),
            None => write!(f, "[{}]", self.title),
        }
    }
}
