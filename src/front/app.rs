//! State of the terminal client and the transitions between its screens.

use super::{
    AppState, Screen,
    commands::{self, Command},
    errors::{Alert, UserError},
    forms,
};
use crate::{api, config, models};
use chrono::{Datelike, Utc};
use log::{debug, info};
use std::collections::HashMap;
use tokio::sync::broadcast::{self, error::TryRecvError};

pub struct App {
    state: AppState,
    auth_events: broadcast::Receiver<models::user_app::AuthEvent>,

    pub screen: Screen,
    pub running: bool,
    pub show_help: bool,
    pub alerts: Vec<Alert>,

    pub pets: Vec<models::pet::Pet>,
    pub pet_photo_urls: HashMap<i64, String>,
    pub signed_urls: api::photo::SignedUrlCache,

    pub selected_pet: Option<models::pet::Pet>,
    pub selected_photo_url: Option<String>,
    pub is_editing: bool,
    pub draft: forms::pet::PetProfileDraft,

    pub login_form: forms::user::LoginForm,
    pub add_pet_form: forms::pet::AddPetForm,
    pub link_tag_form: forms::tag::LinkTagForm,

    pub found_code: String,
    pub found_pet: Option<models::tag::PublicPet>,
}

impl App {
    pub fn new(state: AppState) -> Self {
        let auth_events = state.auth_service.subscribe();

        Self {
            state,
            auth_events,
            screen: Screen::default(),
            running: true,
            show_help: false,
            alerts: Vec::new(),
            pets: Vec::new(),
            pet_photo_urls: HashMap::new(),
            signed_urls: api::photo::SignedUrlCache::default(),
            selected_pet: None,
            selected_photo_url: None,
            is_editing: false,
            draft: forms::pet::PetProfileDraft::default(),
            login_form: forms::user::LoginForm::default(),
            add_pet_form: forms::pet::AddPetForm::new(config::today()),
            link_tag_form: forms::tag::LinkTagForm::default(),
            found_code: String::new(),
            found_pet: None,
        }
    }

    pub fn title(&self) -> String {
        self.screen.title(self.selected_pet.as_ref())
    }

    /// Alerts raised since the last call
    pub fn take_alerts(&mut self) -> Vec<Alert> {
        std::mem::take(&mut self.alerts)
    }

    fn alert(&mut self, alert: Alert) {
        debug!("alert {alert}");
        self.alerts.push(alert);
    }

    fn alert_error(&mut self, title: &str, err: anyhow::Error) {
        self.alert(Alert::from_error(title, &err));
    }

    /// Restores the previous session, owners land on their pets
    pub async fn start(&mut self) {
        match api::user::bootstrap_session(&self.state.auth_service).await {
            Some(_) => self.enter_home().await,
            None => self.screen = Screen::Login,
        }

        // the bootstrap result already covers whatever it emitted
        while !matches!(
            self.auth_events.try_recv(),
            Err(TryRecvError::Empty | TryRecvError::Closed)
        ) {}
    }

    /// Parses and runs one line typed by the user
    pub async fn handle_line(&mut self, line: &str) {
        if line.trim().is_empty() && self.link_tag_form.capturing.is_none() {
            return;
        }

        match commands::parse_command(self.screen, self.link_tag_form.capturing, line) {
            Ok(command) => self.dispatch(command).await,
            Err(e) => self.alert_error("Atención", e.into()),
        }

        self.drain_auth_events().await;
    }

    /// Applies the auth events received since the last call
    pub async fn drain_auth_events(&mut self) {
        loop {
            match self.auth_events.try_recv() {
                Ok(event) => self.apply_auth_event(event).await,
                Err(TryRecvError::Lagged(skipped)) => {
                    debug!("{skipped} auth events skipped");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
    }

    fn in_owner_area(&self) -> bool {
        matches!(
            self.screen,
            Screen::Home | Screen::AddPet | Screen::PetDetail | Screen::LinkTag
        )
    }

    async fn apply_auth_event(&mut self, event: models::user_app::AuthEvent) {
        use models::user_app::AuthEvent;

        info!("auth event {event}");
        match event {
            AuthEvent::SignedIn(_) if !self.in_owner_area() => self.enter_home().await,
            AuthEvent::SignedIn(_) => {}
            AuthEvent::TokenRefreshed(_) if self.in_owner_area() => self.refresh_pets().await,
            AuthEvent::TokenRefreshed(_) => self.enter_home().await,
            AuthEvent::SignedOut => {
                self.clear_owner_state();
                if self.in_owner_area() {
                    self.screen = Screen::Login;
                }
            }
        }
    }

    fn clear_owner_state(&mut self) {
        self.pets.clear();
        self.pet_photo_urls.clear();
        self.signed_urls.clear();
        self.selected_pet = None;
        self.selected_photo_url = None;
        self.is_editing = false;
        self.draft = forms::pet::PetProfileDraft::default();
        self.link_tag_form = forms::tag::LinkTagForm::default();
    }

    async fn enter_home(&mut self) {
        self.refresh_pets().await;
        self.screen = Screen::Home;
    }

    async fn refresh_pets(&mut self) {
        match api::pet::list_owner_pets(&self.state.auth_service, &self.state.repo).await {
            Ok(Some(pets)) => {
                self.pet_photo_urls = api::photo::resolve_pet_photos(
                    &pets,
                    &mut self.signed_urls,
                    &self.state.storage_service,
                    Utc::now(),
                )
                .await;
                self.pets = pets;
            }
            Ok(None) => {}
            Err(e) => self.alert_error("Error listando mascotas", e),
        }
    }

    async fn open_pet(&mut self, pet_id: i64) {
        let pet =
            match api::pet::load_pet_detail(pet_id, &self.state.auth_service, &self.state.repo)
                .await
            {
                Ok(pet) => pet,
                Err(e) => return self.alert_error("Error cargando perfil", e),
            };

        self.selected_photo_url = api::photo::resolve_pet_photo(
            &pet,
            &mut self.signed_urls,
            &self.state.storage_service,
            Utc::now(),
        )
        .await;
        self.draft = forms::pet::PetProfileDraft::from(&pet);
        self.is_editing = false;
        self.selected_pet = Some(pet);
        self.screen = Screen::PetDetail;
    }

    pub async fn dispatch(&mut self, command: Command) {
        match command {
            Command::Help => self.show_help = true,
            Command::Quit => self.running = false,
            Command::Back => self.go_back(),

            Command::Email(email) => self.login_form.email = email,
            Command::Password(password) => self.login_form.password = password,
            Command::Login => self.login().await,
            Command::OpenFinder => {
                self.found_pet = None;
                self.screen = Screen::FoundTag;
            }

            Command::Search(code) => self.lookup_found_pet(code).await,
            Command::SearchAgain => self.screen = Screen::FoundTag,

            Command::OpenPet(position) => match self.pets.get(position - 1).map(|pet| pet.id) {
                Some(pet_id) => self.open_pet(pet_id).await,
                None => self.alert(Alert::new(
                    "Atención",
                    &format!("No hay mascota número {position}"),
                )),
            },
            Command::AddPet => {
                self.add_pet_form.reset(config::today());
                self.screen = Screen::AddPet;
            }
            Command::Refresh => self.refresh_pets().await,
            Command::Logout => self.logout().await,

            Command::Name(name) => self.add_pet_form.name = name,
            Command::Species(None) => {
                self.add_pet_form.show_species_dropdown = !self.add_pet_form.show_species_dropdown
            }
            Command::Species(Some(option)) => {
                if let Err(e) = self.add_pet_form.select_species(&option) {
                    self.alert_error("Validación", e.into());
                }
            }
            Command::Breed(breed) => self.add_pet_form.breed = breed,
            Command::Color(color) => self.add_pet_form.color = color,
            Command::Calendar => self.add_pet_form.birth_date.toggle(),
            Command::PreviousMonth => self.add_pet_form.birth_date.previous_month(),
            Command::NextMonth => self.add_pet_form.birth_date.next_month(),
            Command::PickDay(day) => {
                if self.add_pet_form.birth_date.pick_day(day).is_none() {
                    self.alert(Alert::new("Validación", "Día inválido para este mes"));
                }
            }
            Command::TypeDate(text) => {
                match super::calendar::parse_typed_date(&text, config::today()) {
                    Some(date) => self.add_pet_form.birth_date.set_date(date),
                    None => self.alert(Alert::new("Validación", "Fecha inválida")),
                }
            }
            Command::Save if self.screen == Screen::AddPet => self.create_pet().await,
            Command::Save => {
                if self.ensure_editing() {
                    self.save_profile().await;
                }
            }

            Command::SetLost(is_lost) => self.set_lost(is_lost).await,
            Command::Edit => self.start_editing(),
            Command::Cancel if self.screen == Screen::LinkTag => {
                self.link_tag_form = forms::tag::LinkTagForm::default();
                self.screen = Screen::PetDetail;
            }
            Command::Cancel => {
                if let Some(pet) = &self.selected_pet {
                    self.draft = forms::pet::PetProfileDraft::from(pet);
                }
                self.is_editing = false;
            }
            Command::SetField(field, value) => {
                if self.ensure_editing() {
                    self.draft.set(field, &value);
                }
            }
            Command::AddInfo { label, value } => {
                if self.ensure_editing() {
                    self.draft.add_extra_info(&label, &value);
                }
            }
            Command::RemoveInfo(position) => {
                if self.ensure_editing() && !self.draft.remove_extra_info(position) {
                    self.alert(Alert::new("Atención", "No existe ese dato"));
                }
            }
            Command::AddContact { name, phone } => {
                if self.ensure_editing() {
                    self.draft.add_extra_contact(&name, &phone);
                }
            }
            Command::RemoveContact(position) => {
                if self.ensure_editing() && !self.draft.remove_extra_contact(position) {
                    self.alert(Alert::new("Atención", "No existe ese contacto"));
                }
            }
            Command::Photo(input) => self.upload_photo(input).await,
            Command::OpenLinkTag => {
                if self.selected_pet.is_none() {
                    return self.alert_error("Atención", UserError::NoPetSelected.into());
                }
                self.link_tag_form = forms::tag::LinkTagForm::default();
                self.screen = Screen::LinkTag;
            }

            Command::StartScan(source) => self.link_tag_form.start_capture(source),
            Command::LinkCode(source, code) => {
                self.link_tag_form.register_read(source, &code);
                self.link_tag(source).await;
            }
            Command::ScannedCode(code) => {
                if let Some(source) = self.link_tag_form.capturing {
                    self.link_tag_form.register_read(source, &code);
                    self.link_tag(source).await;
                }
            }
        }
    }

    fn go_back(&mut self) {
        self.screen = match self.screen {
            Screen::AddPet | Screen::PetDetail => {
                self.is_editing = false;
                Screen::Home
            }
            Screen::LinkTag => Screen::PetDetail,
            Screen::FoundTag | Screen::FoundResult | Screen::Login | Screen::Home => Screen::Login,
        };
    }

    fn start_editing(&mut self) {
        match &self.selected_pet {
            Some(pet) => {
                self.draft = forms::pet::PetProfileDraft::from(pet);
                self.is_editing = true;
            }
            None => self.alert_error("Atención", UserError::NoPetSelected.into()),
        }
    }

    fn ensure_editing(&mut self) -> bool {
        if !self.is_editing {
            self.alert(Alert::new("Atención", "Activa la edición con edit"));
        }
        self.is_editing
    }

    async fn login(&mut self) {
        match api::user::login(&self.login_form, &self.state.auth_service).await {
            Ok(session) => {
                info!("logged in as {}", session.user.id);
                self.enter_home().await;
            }
            Err(e) => self.alert_error("Login falló", e),
        }
    }

    async fn logout(&mut self) {
        if let Err(e) = api::user::logout(&self.state.auth_service).await {
            return self.alert_error("Error cerrando sesión", e);
        }

        self.clear_owner_state();
        self.login_form.clear();
        self.screen = Screen::Login;
    }

    async fn lookup_found_pet(&mut self, code: String) {
        self.found_code = code;

        match api::tag::lookup_public_pet(&self.found_code, &self.state.repo).await {
            Ok(pet) => {
                self.found_pet = Some(pet);
                self.screen = Screen::FoundResult;
            }
            Err(e) => self.alert_error("Error", e),
        }
    }

    async fn create_pet(&mut self) {
        let today = config::today();

        if let Err(e) = api::pet::create_pet(
            &self.add_pet_form,
            today.year(),
            &self.state.auth_service,
            &self.state.repo,
        )
        .await
        {
            return self.alert_error("No se pudo crear la mascota", e);
        }

        self.alert(Alert::title_only("Mascota creada"));
        self.add_pet_form.reset(today);
        self.enter_home().await;
    }

    async fn set_lost(&mut self, is_lost: bool) {
        let Some(pet_id) = self.selected_pet.as_ref().map(|pet| pet.id) else {
            return self.alert_error("Atención", UserError::NoPetSelected.into());
        };

        if let Err(e) = api::pet::set_lost_status(pet_id, is_lost, &self.state.repo).await {
            return self.alert_error("Error", e);
        }

        if let Some(pet) = self.selected_pet.as_mut() {
            pet.is_lost = is_lost;
        }
        self.refresh_pets().await;
    }

    async fn save_profile(&mut self) {
        let Some(pet_id) = self.selected_pet.as_ref().map(|pet| pet.id) else {
            return self.alert_error("Atención", UserError::NoPetSelected.into());
        };

        let saved = api::pet::save_pet_profile(
            pet_id,
            &self.draft,
            config::today(),
            &self.state.repo,
        )
        .await;

        match saved {
            Ok(pet) => {
                self.draft = forms::pet::PetProfileDraft::from(&pet);
                self.selected_pet = Some(pet);
                self.is_editing = false;
                self.refresh_pets().await;
                self.alert(Alert::new("Guardado ✅", "Perfil actualizado"));
            }
            Err(e) => self.alert_error("Error guardando", e),
        }
    }

    async fn upload_photo(&mut self, input: forms::photo::PhotoInput) {
        let Some(pet_id) = self.selected_pet.as_ref().map(|pet| pet.id) else {
            return self.alert_error("Atención", UserError::NoPetSelected.into());
        };

        let pic = match forms::photo::read_picked_photo(&input).await {
            Ok(pic) => pic,
            Err(e) => return self.alert_error("Error", e),
        };

        let uploaded = api::photo::upload_pet_photo(
            pet_id,
            pic,
            &mut self.signed_urls,
            &self.state.auth_service,
            &self.state.repo,
            &self.state.storage_service,
        )
        .await;

        let photo_path = match uploaded {
            Ok(path) => path,
            Err(e) => return self.alert_error("Error subiendo foto", e),
        };

        self.alert(Alert::title_only("Foto actualizada ✅"));

        if let Some(pet) = self.selected_pet.as_mut() {
            pet.photo_url = photo_path;
        }
        if let Some(pet) = &self.selected_pet {
            self.selected_photo_url = api::photo::resolve_pet_photo(
                pet,
                &mut self.signed_urls,
                &self.state.storage_service,
                Utc::now(),
            )
            .await;
        }
        self.refresh_pets().await;
    }

    async fn link_tag(&mut self, source: models::tag::TagSource) {
        let Some(pet_id) = self.selected_pet.as_ref().map(|pet| pet.id) else {
            return self.alert_error("Atención", UserError::NoPetSelected.into());
        };

        let code = self.link_tag_form.code_mut(source).clone();
        match api::tag::link_tag_to_pet(&code, pet_id, source, &self.state.repo).await {
            Ok(_) => {
                self.alert(Alert::new(
                    "Tag vinculado",
                    &format!("La placa quedó asociada vía lector {source}."),
                ));
                self.link_tag_form.finish(source);
                self.screen = Screen::PetDetail;
            }
            Err(e) => {
                self.link_tag_form.capturing = None;
                self.alert_error("Error vinculando tag", e);
            }
        }
    }
}
