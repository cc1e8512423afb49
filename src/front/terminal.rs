use super::{AppState, app::App, errors::Alert, render};
use crate::api;
use chrono::Utc;
use log::info;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

async fn write_out<W: AsyncWrite + Unpin>(out: &mut W, text: &str) -> anyhow::Result<()> {
    out.write_all(text.as_bytes()).await?;
    out.flush().await?;
    Ok(())
}

/// Pending alerts, the current screen and the prompt
fn frame(app: &mut App) -> String {
    let mut text = String::from("\n");

    for alert in app.take_alerts() {
        text.push_str(&format!("{alert}\n"));
    }

    text.push_str(&render::render_screen(app));

    if std::mem::take(&mut app.show_help) {
        text.push_str("\nComandos:\n");
        text.push_str(&render::render_help(app.screen));
    }

    text.push_str("> ");
    text
}

/// Interactive client, one command per line until `quit` or end of input
pub async fn run_interactive(state: AppState) -> anyhow::Result<()> {
    let mut app = App::new(state);
    app.start().await;

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    write_out(&mut stdout, "chipdog, escribe help para ver los comandos\n").await?;

    while app.running {
        write_out(&mut stdout, &frame(&mut app)).await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        app.handle_line(&line).await;
    }

    info!("interactive session finished");
    write_out(&mut stdout, "\nHasta pronto\n").await
}

/// Public card of the pet behind `code`, no session needed
pub async fn run_found(state: AppState, code: &str) -> anyhow::Result<()> {
    let mut stdout = tokio::io::stdout();

    let text = match api::tag::lookup_public_pet(code, &state.repo).await {
        Ok(pet) => render::render_public_pet(&pet),
        Err(e) => format!("{}\n", Alert::from_error("Error", &e)),
    };

    write_out(&mut stdout, &text).await
}

/// Pets of the owner of the persisted session
pub async fn run_pets(state: AppState) -> anyhow::Result<()> {
    let mut stdout = tokio::io::stdout();

    if api::user::bootstrap_session(&state.auth_service).await.is_none() {
        return write_out(&mut stdout, "No hay sesión activa, ingresa con: chipdog\n").await;
    }

    let text = match api::pet::list_owner_pets(&state.auth_service, &state.repo).await {
        Ok(pets) => {
            let pets = pets.unwrap_or_default();
            let photo_urls = api::photo::resolve_pet_photos(
                &pets,
                &mut api::photo::SignedUrlCache::default(),
                &state.storage_service,
                Utc::now(),
            )
            .await;
            render::render_pet_list(&pets, &photo_urls)
        }
        Err(e) => format!("{}\n", Alert::from_error("Error listando mascotas", &e)),
    };

    write_out(&mut stdout, &text).await
}
