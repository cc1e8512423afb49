//! Lines typed by the user turned into the actions of the current screen.

use super::{
    Screen,
    errors::UserError,
    forms::{pet::ProfileField, photo::PhotoInput},
};
use crate::models::tag::TagSource;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Quit,
    Back,
    // login
    Email(String),
    Password(String),
    Login,
    OpenFinder,
    // finder
    Search(String),
    SearchAgain,
    // home
    OpenPet(usize),
    AddPet,
    Refresh,
    Logout,
    // add pet
    Name(String),
    /// Without option it opens or closes the list of species
    Species(Option<String>),
    Breed(String),
    Color(String),
    Calendar,
    PreviousMonth,
    NextMonth,
    PickDay(u32),
    TypeDate(String),
    Save,
    // pet detail
    SetLost(bool),
    Edit,
    Cancel,
    SetField(ProfileField, String),
    AddInfo { label: String, value: String },
    RemoveInfo(usize),
    AddContact { name: String, phone: String },
    RemoveContact(usize),
    Photo(PhotoInput),
    OpenLinkTag,
    // link tag
    StartScan(TagSource),
    LinkCode(TagSource, String),
    ScannedCode(String),
}

/// Commands accepted on each screen, shown by `help`
pub fn help(screen: Screen) -> &'static [&'static str] {
    match screen {
        Screen::Login => &[
            "email <email>",
            "password <contraseña>",
            "login",
            "found  (encontré una mascota)",
            "quit",
        ],
        Screen::FoundTag => &["search <código>", "back"],
        Screen::FoundResult => &["again  (buscar otro tag)", "back"],
        Screen::Home => &["open <n>", "add", "refresh", "logout", "quit"],
        Screen::AddPet => &[
            "name <nombre>",
            "species [Perro|Gato]",
            "breed <raza>",
            "color <color>",
            "calendar | prev | next | day <n>",
            "date <dd/mm/aa>",
            "save",
            "back",
        ],
        Screen::PetDetail => &[
            "lost on|off",
            "edit | save | cancel",
            "set <campo> <valor>",
            "info add <etiqueta>=<valor> | info rm <n>",
            "contact add <nombre>=<teléfono> | contact rm <n>",
            "photo <ruta|base64>",
            "tag",
            "back",
        ],
        Screen::LinkTag => &["qr [código]", "nfc [código]", "cancel"],
    }
}

fn split_word(line: &str) -> (String, &str) {
    let line = line.trim();
    match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word.to_lowercase(), rest.trim()),
        None => (line.to_lowercase(), ""),
    }
}

fn unknown(line: &str) -> UserError {
    UserError::UnknownCommand(line.trim().to_string())
}

fn position(arg: &str, line: &str) -> Result<usize, UserError> {
    arg.parse::<usize>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| unknown(line))
}

fn pair(arg: &str, line: &str) -> Result<(String, String), UserError> {
    arg.split_once('=')
        .map(|(left, right)| (left.trim().to_string(), right.trim().to_string()))
        .ok_or_else(|| unknown(line))
}

/// Parses `line` for `screen`. While a reader waits for a read, any line
/// other than `cancel` is the code it read.
pub fn parse_command(
    screen: Screen,
    capturing: Option<TagSource>,
    line: &str,
) -> Result<Command, UserError> {
    let (word, arg) = split_word(line);

    if screen == Screen::LinkTag && capturing.is_some() && word != "cancel" {
        return Ok(Command::ScannedCode(line.trim().to_string()));
    }

    match word.as_str() {
        "help" | "ayuda" => return Ok(Command::Help),
        "quit" | "salir" => return Ok(Command::Quit),
        _ => {}
    }

    let command = match (screen, word.as_str()) {
        (Screen::Login, "email") => Command::Email(arg.to_string()),
        // passwords keep their spaces
        (Screen::Login, "password") => Command::Password(
            line.trim_start()
                .get("password".len()..)
                .map(|p| p.strip_prefix(' ').unwrap_or(p))
                .unwrap_or_default()
                .to_string(),
        ),
        (Screen::Login, "login") => Command::Login,
        (Screen::Login, "found") => Command::OpenFinder,

        (Screen::FoundTag, "search") => Command::Search(arg.to_string()),
        (Screen::FoundTag | Screen::FoundResult | Screen::AddPet | Screen::PetDetail, "back") => {
            Command::Back
        }
        (Screen::FoundResult, "again") => Command::SearchAgain,

        (Screen::Home, "open") => Command::OpenPet(position(arg, line)?),
        (Screen::Home, "add") => Command::AddPet,
        (Screen::Home, "refresh") => Command::Refresh,
        (Screen::Home, "logout") => Command::Logout,

        (Screen::AddPet, "name") => Command::Name(arg.to_string()),
        (Screen::AddPet, "species") => {
            Command::Species((!arg.is_empty()).then(|| arg.to_string()))
        }
        (Screen::AddPet, "breed") => Command::Breed(arg.to_string()),
        (Screen::AddPet, "color") => Command::Color(arg.to_string()),
        (Screen::AddPet, "calendar") => Command::Calendar,
        (Screen::AddPet, "prev") => Command::PreviousMonth,
        (Screen::AddPet, "next") => Command::NextMonth,
        (Screen::AddPet, "day") => {
            Command::PickDay(arg.parse().map_err(|_| unknown(line))?)
        }
        (Screen::AddPet, "date") => Command::TypeDate(arg.to_string()),
        (Screen::AddPet | Screen::PetDetail, "save") => Command::Save,

        (Screen::PetDetail, "lost") => match arg.to_lowercase().as_str() {
            "on" | "si" | "sí" => Command::SetLost(true),
            "off" | "no" => Command::SetLost(false),
            _ => return Err(unknown(line)),
        },
        (Screen::PetDetail, "edit") => Command::Edit,
        (Screen::PetDetail | Screen::LinkTag, "cancel") => Command::Cancel,
        (Screen::PetDetail, "set") => {
            let (field, value) = split_word(arg);
            Command::SetField(field.parse()?, value.to_string())
        }
        (Screen::PetDetail, "info") => match split_word(arg) {
            (action, rest) if action == "add" => {
                let (label, value) = pair(rest, line)?;
                Command::AddInfo { label, value }
            }
            (action, rest) if action == "rm" => Command::RemoveInfo(position(rest, line)?),
            _ => return Err(unknown(line)),
        },
        (Screen::PetDetail, "contact") => match split_word(arg) {
            (action, rest) if action == "add" => {
                let (name, phone) = pair(rest, line)?;
                Command::AddContact { name, phone }
            }
            (action, rest) if action == "rm" => Command::RemoveContact(position(rest, line)?),
            _ => return Err(unknown(line)),
        },
        (Screen::PetDetail, "photo") if !arg.is_empty() => Command::Photo(PhotoInput::parse(arg)),
        (Screen::PetDetail, "tag") => Command::OpenLinkTag,

        (Screen::LinkTag, "qr" | "nfc") => {
            let source = if word == "qr" { TagSource::Qr } else { TagSource::Nfc };
            if arg.is_empty() {
                Command::StartScan(source)
            } else {
                Command::LinkCode(source, arg.to_string())
            }
        }
        (Screen::LinkTag, "back") => Command::Cancel,

        _ => return Err(unknown(line)),
    };

    Ok(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_commands() {
        for screen in [Screen::Login, Screen::Home, Screen::PetDetail] {
            assert_eq!(parse_command(screen, None, " HELP "), Ok(Command::Help));
            assert_eq!(parse_command(screen, None, "quit"), Ok(Command::Quit));
        }
    }

    #[test]
    fn test_login_commands() {
        assert_eq!(
            parse_command(Screen::Login, None, "email  owner@chipdog.cl "),
            Ok(Command::Email("owner@chipdog.cl".into()))
        );
        assert_eq!(
            parse_command(Screen::Login, None, "password mi clave "),
            Ok(Command::Password("mi clave ".into()))
        );
        assert_eq!(
            parse_command(Screen::Login, None, "found"),
            Ok(Command::OpenFinder)
        );
        assert!(parse_command(Screen::Login, None, "open 1").is_err());
    }

    #[test]
    fn test_home_commands() {
        assert_eq!(parse_command(Screen::Home, None, "open 2"), Ok(Command::OpenPet(2)));
        assert_eq!(
            parse_command(Screen::Home, None, "open 0"),
            Err(UserError::UnknownCommand("open 0".into()))
        );
        assert!(parse_command(Screen::Home, None, "open dos").is_err());
    }

    #[test]
    fn test_add_pet_commands() {
        assert_eq!(
            parse_command(Screen::AddPet, None, "species"),
            Ok(Command::Species(None))
        );
        assert_eq!(
            parse_command(Screen::AddPet, None, "species gato"),
            Ok(Command::Species(Some("gato".into())))
        );
        assert_eq!(parse_command(Screen::AddPet, None, "day 29"), Ok(Command::PickDay(29)));
        assert_eq!(
            parse_command(Screen::AddPet, None, "date 01/02/21"),
            Ok(Command::TypeDate("01/02/21".into()))
        );
    }

    #[test]
    fn test_pet_detail_commands() {
        assert_eq!(
            parse_command(Screen::PetDetail, None, "lost on"),
            Ok(Command::SetLost(true))
        );
        assert!(parse_command(Screen::PetDetail, None, "lost maybe").is_err());
        assert_eq!(
            parse_command(Screen::PetDetail, None, "set vet_phone +56 2 2222 2222"),
            Ok(Command::SetField(
                ProfileField::VetPhone,
                "+56 2 2222 2222".into()
            ))
        );
        assert_eq!(
            parse_command(Screen::PetDetail, None, "set notes"),
            Ok(Command::SetField(ProfileField::PublicNotes, "".into()))
        );
        assert_eq!(
            parse_command(Screen::PetDetail, None, "info add Chip = 981 020"),
            Ok(Command::AddInfo {
                label: "Chip".into(),
                value: "981 020".into()
            })
        );
        assert_eq!(
            parse_command(Screen::PetDetail, None, "contact rm 1"),
            Ok(Command::RemoveContact(1))
        );
        assert_eq!(
            parse_command(Screen::PetDetail, None, "photo /tmp/toby.jpg"),
            Ok(Command::Photo(PhotoInput::File("/tmp/toby.jpg".into())))
        );
        assert!(parse_command(Screen::PetDetail, None, "photo").is_err());
    }

    #[test]
    fn test_link_tag_commands() {
        assert_eq!(
            parse_command(Screen::LinkTag, None, "qr"),
            Ok(Command::StartScan(TagSource::Qr))
        );
        assert_eq!(
            parse_command(Screen::LinkTag, None, "nfc CHIP-9"),
            Ok(Command::LinkCode(TagSource::Nfc, "CHIP-9".into()))
        );

        // a waiting reader takes the raw line, even one looking like a command
        assert_eq!(
            parse_command(Screen::LinkTag, Some(TagSource::Qr), " logout "),
            Ok(Command::ScannedCode("logout".into()))
        );
        assert_eq!(
            parse_command(Screen::LinkTag, Some(TagSource::Qr), "cancel"),
            Ok(Command::Cancel)
        );
    }
}
