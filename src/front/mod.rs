pub mod app;
pub mod calendar;
pub mod commands;
pub mod errors;
pub mod forms;
pub mod render;
pub mod terminal;
pub mod utils;

use crate::{models, repo, services};

/// Services shared by every screen
pub struct AppState {
    pub repo: repo::ImplPetRepo,
    pub auth_service: services::ImplAuthService,
    pub storage_service: services::ImplStorageService,
}

/// Screen currently shown, it decides what is rendered and which commands
/// are accepted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Screen {
    #[default]
    Login,
    Home,
    AddPet,
    PetDetail,
    LinkTag,
    FoundTag,
    FoundResult,
}

impl Screen {
    pub fn title(&self, selected_pet: Option<&models::pet::Pet>) -> String {
        match self {
            Screen::Login => "Login".into(),
            Screen::Home => "Mis mascotas".into(),
            Screen::AddPet => "Agregar mascota".into(),
            Screen::PetDetail => selected_pet
                .map(|pet| pet.name.clone())
                .unwrap_or_else(|| "Perfil".into()),
            Screen::LinkTag => "Vincular tag".into(),
            Screen::FoundTag => "Encontré una mascota".into(),
            Screen::FoundResult => "Mascota encontrada".into(),
        }
    }
}
