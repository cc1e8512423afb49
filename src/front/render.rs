//! Plain text views of each screen.

use super::{Screen, app::App, calendar, commands, utils};
use crate::{consts, models};
use std::fmt::Write;

const RULE: &str = "────────────────────────────────────────";

fn info_row(out: &mut String, label: &str, value: Option<&str>) {
    let _ = writeln!(out, "  {label:<14} {}", utils::display_or_placeholder(value));
}

fn card(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n[{title}]");
}

/// Picture line of a pet, its initials when there is no url
fn avatar(name: &str, photo_url: Option<&str>) -> String {
    match photo_url {
        Some(url) => format!("foto: {url}"),
        None => format!("({})", utils::initials_from_name(name)),
    }
}

pub fn render_calendar(picker: &calendar::DatePicker) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  < {} >", calendar::month_title(picker.visible_month));

    for header in calendar::WEEKDAY_HEADERS {
        let _ = write!(out, "  {header:>2} ");
    }
    out.push('\n');

    for week in picker.days().chunks(7) {
        for cell in week {
            match cell {
                Some(day)
                    if calendar::is_selected_day(picker.selected, picker.visible_month, *day) =>
                {
                    let _ = write!(out, " [{day:>2}]");
                }
                Some(day) => {
                    let _ = write!(out, "  {day:>2} ");
                }
                None => out.push_str("     "),
            }
        }
        out.push('\n');
    }

    out
}

pub fn render_public_pet(pet: &models::tag::PublicPet) -> String {
    let mut out = String::new();
    let or_nd = |v: &Option<String>| v.clone().unwrap_or_else(|| "N/D".into());

    let _ = writeln!(out, "{}", pet.name);
    let _ = writeln!(out, "Especie: {}", or_nd(&pet.species));
    let _ = writeln!(out, "Raza: {}", or_nd(&pet.breed));
    let _ = writeln!(out, "Color: {}", or_nd(&pet.color));

    if let Some(notes) = pet.public_notes.as_deref().filter(|n| !n.trim().is_empty()) {
        let _ = writeln!(out, "Info: {notes}");
    }
    if let Some(phone) = pet.contact_phone.as_deref().filter(|p| !p.trim().is_empty()) {
        let _ = writeln!(out, "Tel: {phone}");
        if let Some(url) = utils::tel_url(phone) {
            let _ = writeln!(out, "  llamar: {url}");
        }
    }
    if let Some(phone) = pet
        .contact_whatsapp
        .as_deref()
        .filter(|p| !p.trim().is_empty())
    {
        let _ = writeln!(out, "WhatsApp: {phone}");
        if let Some(url) = utils::whatsapp_url(phone) {
            let _ = writeln!(out, "  escribir: {url}");
        }
    }

    out
}

/// One line per pet, numbered for `open <n>`
pub fn render_pet_list(
    pets: &[models::pet::Pet],
    photo_urls: &std::collections::HashMap<i64, String>,
) -> String {
    let mut out = String::new();

    if pets.is_empty() {
        out.push_str("Aún no tienes mascotas registradas.\n");
    }

    for (n, pet) in pets.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {} {} · {} [{}]",
            n + 1,
            avatar(&pet.name, photo_urls.get(&pet.id).map(String::as_str)),
            pet.name,
            pet.subtitle(),
            pet.status_label()
        );
    }

    out
}

fn render_login(app: &App, out: &mut String) {
    info_row(out, "Email", Some(&app.login_form.email));
    let masked = "*".repeat(app.login_form.password.chars().count());
    info_row(out, "Contraseña", Some(&masked));
}

fn render_home(app: &App, out: &mut String) {
    out.push_str("Donde Está Mi Mascota\n");
    out.push_str("Gestiona sus perfiles y revisa su estado en segundos.\n\n");
    out.push_str(&render_pet_list(&app.pets, &app.pet_photo_urls));
}

fn render_add_pet(app: &App, out: &mut String) {
    let form = &app.add_pet_form;

    info_row(out, "Nombre", Some(&form.name));
    info_row(out, "Especie", Some(&form.species));
    if form.show_species_dropdown {
        for option in consts::SPECIES_OPTIONS {
            let marker = if option == form.species { "•" } else { " " };
            let _ = writeln!(out, "    {marker} {option}");
        }
    }
    info_row(out, "Raza", Some(&form.breed));
    info_row(out, "Color", Some(&form.color));

    let birth_date = form
        .birth_date
        .selected
        .map(calendar::format_birth_date)
        .unwrap_or_else(|| "Sin fecha".into());
    info_row(out, "Nacimiento", Some(&birth_date));

    if form.birth_date.is_open {
        out.push_str(&render_calendar(&form.birth_date));
    }
}

fn render_pet_view(pet: &models::pet::Pet, out: &mut String) {
    card(out, "Información");
    info_row(out, "Color", pet.color.as_deref());
    info_row(
        out,
        "Año nac.",
        pet.birth_year.filter(|y| *y != 0).map(|y| y.to_string()).as_deref(),
    );
    info_row(
        out,
        "Nacimiento",
        pet.birth_date.map(calendar::format_birth_date).as_deref(),
    );
    info_row(out, "Sexo", pet.sex.as_deref());
    info_row(out, "Peso", pet.weight_kg.map(utils::fmt_weight).as_deref());

    card(out, "Salud");
    info_row(out, "Alergias", pet.allergies.as_deref());
    info_row(out, "Medicamentos", pet.medications.as_deref());
    info_row(out, "Condiciones", pet.conditions.as_deref());

    card(out, "Contacto");
    info_row(out, "Teléfono", pet.owner_phone.as_deref());
    info_row(out, "WhatsApp", pet.owner_whatsapp.as_deref());
    for contact in &pet.extra_contacts {
        info_row(out, &contact.name, Some(&contact.phone));
    }

    card(out, "Veterinario");
    info_row(out, "Nombre", pet.vet_name.as_deref());
    info_row(out, "Teléfono", pet.vet_phone.as_deref());

    card(out, "Notas públicas (lo que ve quien encuentra)");
    let _ = writeln!(
        out,
        "  {}",
        utils::display_or_placeholder(pet.public_notes.as_deref())
    );

    if !pet.extra_info.is_empty() {
        card(out, "Otros datos");
        for info in &pet.extra_info {
            info_row(out, &info.label, Some(&info.value));
        }
    }
}

fn render_draft(app: &App, out: &mut String) {
    use super::forms::pet::ProfileField;

    card(out, "Editando (set <campo> <valor>)");
    for field in ProfileField::ALL {
        let _ = writeln!(out, "  {:<12} {}", field.to_string(), app.draft.field(field));
    }

    card(out, "Otros datos (info add/rm)");
    for (n, info) in app.draft.extra_info.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}: {}", n + 1, info.label, info.value);
    }

    card(out, "Contactos secundarios (contact add/rm)");
    for (n, contact) in app.draft.extra_contacts.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}: {}", n + 1, contact.name, contact.phone);
    }
}

fn render_pet_detail(app: &App, out: &mut String) {
    let Some(pet) = &app.selected_pet else {
        out.push_str("No hay mascota seleccionada.\n");
        return;
    };

    let _ = writeln!(
        out,
        "{}  {}",
        avatar(&pet.name, app.selected_photo_url.as_deref()),
        pet.subtitle()
    );

    card(out, "Estado");
    let _ = writeln!(out, "  {}", pet.status_label());
    let _ = writeln!(
        out,
        "  {}",
        if pet.is_lost {
            "Alguien que escanee el tag verá el contacto."
        } else {
            "Si se pierde, actívalo para que te contacten."
        }
    );

    if app.is_editing {
        render_draft(app, out);
    } else {
        render_pet_view(pet, out);
    }
}

fn render_link_tag(app: &App, out: &mut String) {
    let form = &app.link_tag_form;

    card(out, "Vinculación por lector QR");
    out.push_str("  Escribe qr para iniciar el escaneo del código QR y registrarlo.\n");
    info_row(out, "Código", Some(&form.qr_code));

    card(out, "Vinculación por lector NFC");
    out.push_str("  Escribe nfc para iniciar el escaneo del chip NFC y registrarlo.\n");
    info_row(out, "Código", Some(&form.nfc_code));

    if let Some(hint) = &form.scan_hint {
        let _ = writeln!(out, "\n{hint}");
    }
}

fn render_found_result(app: &App, out: &mut String) {
    match &app.found_pet {
        Some(pet) => out.push_str(&render_public_pet(pet)),
        None => out.push_str("No hay datos.\n"),
    }
}

/// Full view of the current screen
pub fn render_screen(app: &App) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}\n{}\n{RULE}", app.title());

    match app.screen {
        Screen::Login => render_login(app, &mut out),
        Screen::Home => render_home(app, &mut out),
        Screen::AddPet => render_add_pet(app, &mut out),
        Screen::PetDetail => render_pet_detail(app, &mut out),
        Screen::LinkTag => render_link_tag(app, &mut out),
        Screen::FoundTag => {
            out.push_str("Ingresa el código del tag que encontraste.\n");
            info_row(&mut out, "Código", Some(&app.found_code));
        }
        Screen::FoundResult => render_found_result(app, &mut out),
    }

    out
}

pub fn render_help(screen: Screen) -> String {
    commands::help(screen)
        .iter()
        .map(|line| format!("  {line}\n"))
        .collect()
}
