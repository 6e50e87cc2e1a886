use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use podcast_rs::audio::{HeadlessOutput, HttpAudioResolver};
use podcast_rs::config::AppConfig;
use podcast_rs::controller::{AppController, Command, PlaybackController};
use podcast_rs::logging;
use podcast_rs::model::{AppModel, CatalogClient, FavoritesStore, FileStore};
use podcast_rs::view::AppView;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env().context("Invalid configuration")?;

    if let Err(e) = logging::init_logging(&config.log_dir) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!(
        api_url = %config.api_url,
        data_dir = %config.data_dir.display(),
        page_size = config.page_size,
        "=== podcast-rs starting ==="
    );

    let catalog = CatalogClient::builder()
        .base_url(&config.api_url)
        .timeout(config.request_timeout)
        .build()
        .context("Failed to build catalog client")?;
    let resolver = HttpAudioResolver::new(catalog.http_client().clone());

    let favorites = FavoritesStore::new(Arc::new(FileStore::new(&config.data_dir)));
    let playback = PlaybackController::new(Arc::new(HeadlessOutput::new()), Arc::new(resolver));
    playback.start_event_listener();

    let controller = AppController::new(
        Arc::new(AppModel::new(config.page_size)),
        Arc::new(catalog),
        favorites.clone(),
        playback,
    );

    futures::join!(controller.load_catalog(), favorites.load());

    let res = run_app(&controller).await;
    if let Err(err) = &res {
        tracing::error!(error = ?err, "Application error");
    }

    tracing::info!("podcast-rs shutting down");
    res
}

async fn run_app(controller: &AppController) -> Result<()> {
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    write_out(&mut stdout, &AppView::render_help()).await?;
    write_out(&mut stdout, &render_catalog(controller).await).await?;
    controller.model().clear_error().await;

    loop {
        write_out(&mut stdout, "> ").await?;

        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read from stdin")?,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                None
            }
        };
        let Some(line) = line else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                write_out(&mut stdout, &AppView::render_error(&e.to_string())).await?;
                continue;
            }
        };

        controller.handle_command(command.clone()).await;
        if controller.model().should_quit().await {
            break;
        }

        let screen = render_screen(controller, &command).await;
        write_out(&mut stdout, &screen).await?;

        if let Some(error) = controller.model().get_error().await {
            write_out(&mut stdout, &AppView::render_error(&error)).await?;
            controller.model().clear_error().await;
        }
    }

    Ok(())
}

async fn render_screen(controller: &AppController, command: &Command) -> String {
    let has_error = controller.model().get_error().await.is_some();
    match command {
        Command::Search(_) | Command::Genre(_) | Command::Sort(_) | Command::More | Command::List => {
            render_catalog(controller).await
        }
        Command::Show(_) | Command::Season(_) => render_show(controller).await,
        Command::Favorite(_) if has_error => String::new(),
        Command::Favorite(id) => {
            let favorited = controller.favorites().is_favorited(id.trim()).await;
            let (_, count) = controller.get_favorites().await;
            format!(
                "{} {} ({} favorites)\n",
                if favorited { "♥ Added" } else { "♡ Removed" },
                id.trim(),
                count
            )
        }
        Command::Favorites | Command::ClearFavorites => {
            let (favorites, _) = controller.get_favorites().await;
            AppView::render_favorites(&favorites)
        }
        Command::Play(_)
        | Command::Pause
        | Command::Resume
        | Command::Toggle
        | Command::Seek(_)
        | Command::Status => {
            let playback = controller.playback();
            AppView::render_playback(&playback.session().await, playback.last_error().await.as_deref())
        }
        Command::Help => AppView::render_help(),
        Command::Quit => String::new(),
    }
}

async fn render_catalog(controller: &AppController) -> String {
    let model = controller.model();
    let favorite_ids: HashSet<String> = controller
        .favorites()
        .favorites()
        .await
        .into_iter()
        .map(|p| p.id)
        .collect();
    AppView::render_catalog(
        &model.get_catalog_state().await,
        &model.get_page().await,
        &favorite_ids,
    )
}

async fn render_show(controller: &AppController) -> String {
    let show = controller.model().get_show_state().await;
    let favorited = match &show.detail {
        Some(detail) => controller.favorites().is_favorited(&detail.id).await,
        None => false,
    };
    AppView::render_show(&show, favorited)
}

async fn write_out(stdout: &mut tokio::io::Stdout, text: &str) -> Result<()> {
    stdout.write_all(text.as_bytes()).await?;
    stdout.flush().await?;
    Ok(())
}
