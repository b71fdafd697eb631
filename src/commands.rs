//! CLI Command Handlers
//!
//! Each handler takes its parsed args, the wired [`App`] and [`Output`],
//! and returns an [`ExitCode`].

use serde::Serialize;

use crate::api::{AuthError, CatalogError};
use crate::app::App;
use crate::cli::{
    CastCmd, ExitCode, FeedArg, FeedCmd, GenresCmd, LoginCmd, Output, PrefsCmd, RegisterCmd,
    SearchCmd, StatusOk, WatchlistAction, WatchlistCmd,
};
use crate::models::{
    AuthResponse, LoginRequest, MediaItem, MediaType, RegisterRequest, Resource,
};
use crate::paging::{FeedPager, PageLoad};

/// One page of a feed as printed by `feed` and `search`
#[derive(Debug, Serialize)]
pub struct FeedPageOutput {
    pub page: u32,
    pub prev_page: Option<u32>,
    pub next_page: Option<u32>,
    pub items: Vec<MediaItem>,
}

impl FeedPageOutput {
    fn new(page: u32, load: PageLoad<MediaItem>) -> Self {
        Self {
            page,
            prev_page: load.prev_key,
            next_page: load.next_key,
            items: load.items,
        }
    }

    fn human(&self) -> String {
        let mut lines: Vec<String> = self
            .items
            .iter()
            .map(|item| format!("{:>8}  {}", item.id, item))
            .collect();
        if lines.is_empty() {
            lines.push("No results.".to_string());
        }
        if let Some(next) = self.next_page {
            lines.push(format!("-- page {} (next: {})", self.page, next));
        }
        lines.join("\n")
    }
}

/// Session summary printed by `whoami`, `login`, `register` and `prefs`
#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub signed_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PrefsOutput {
    pub include_adult: bool,
    pub signed_in: bool,
}

#[derive(Debug, Serialize)]
pub struct ExistsOutput {
    pub media_id: u64,
    pub exists: bool,
}

// =============================================================================
// Error mapping
// =============================================================================

fn catalog_exit_code(e: &CatalogError) -> ExitCode {
    if e.is_connectivity() {
        ExitCode::NetworkError
    } else if matches!(e, CatalogError::Unauthorized) {
        ExitCode::AuthError
    } else {
        ExitCode::Error
    }
}

/// Auth failures reach the CLI as `Resource::Error` text
fn auth_exit_code(message: &str) -> ExitCode {
    if message == AuthError::Connection.to_string() {
        ExitCode::NetworkError
    } else {
        ExitCode::AuthError
    }
}

fn print_or_fail<T: Serialize>(output: &Output, data: T, human: impl std::fmt::Display) -> ExitCode {
    match output.print_or(data, human) {
        Ok(()) => ExitCode::Success,
        Err(e) => output.error(format!("Failed to serialize: {}", e), ExitCode::Error),
    }
}

async fn print_page(pager: FeedPager, page: u32, output: &Output) -> ExitCode {
    match pager.load(Some(page)).await {
        Ok(load) => {
            let out = FeedPageOutput::new(page, load);
            let human = out.human();
            print_or_fail(output, out, human)
        }
        Err(e) => output.error(format!("Request failed: {}", e), catalog_exit_code(&e)),
    }
}

// =============================================================================
// Catalog Commands
// =============================================================================

pub async fn feed_cmd(cmd: FeedCmd, app: &App, output: &Output) -> ExitCode {
    if cmd.page == 0 {
        return output.error("Pages start at 1", ExitCode::InvalidArgs);
    }
    let media_type = MediaType::from(cmd.media);

    let pager = match (cmd.feed.category(), cmd.id) {
        (Some(category), _) => {
            let home = match app.home() {
                Ok(home) => home,
                Err(e) => return output.error(e.to_string(), ExitCode::InvalidArgs),
            };
            home.select_media_type(media_type);
            home.feed(category)
        }
        (None, None) => {
            return output.error("--id is required for this feed", ExitCode::InvalidArgs);
        }
        (None, Some(id)) => {
            let details = match app.details() {
                Ok(details) => details,
                Err(e) => return output.error(e.to_string(), ExitCode::InvalidArgs),
            };
            if cmd.feed == FeedArg::Similar {
                details.similar_films(id, media_type)
            } else {
                details.recommended_films(id, media_type)
            }
        }
    };

    output.info(format!("Loading {:?} page {}...", cmd.feed, cmd.page));
    print_page(pager, cmd.page, output).await
}

pub async fn search_cmd(cmd: SearchCmd, app: &App, output: &Output) -> ExitCode {
    if cmd.page == 0 {
        return output.error("Pages start at 1", ExitCode::InvalidArgs);
    }
    let search = match app.search() {
        Ok(search) => search,
        Err(e) => return output.error(e.to_string(), ExitCode::InvalidArgs),
    };

    let pager = match cmd.adult_override() {
        // One-off override; the saved preference stays as it is
        Some(include_adult) if !cmd.query.trim().is_empty() => app
            .catalog()
            .map(|catalog| catalog.search(cmd.query.trim(), include_adult))
            .ok(),
        _ => search.search(&cmd.query),
    };
    let Some(pager) = pager else {
        return output.error("Search query is empty", ExitCode::InvalidArgs);
    };

    output.info(format!("Searching for: {}", cmd.query.trim()));
    print_page(pager, cmd.page, output).await
}

pub async fn genres_cmd(cmd: GenresCmd, app: &App, output: &Output) -> ExitCode {
    let home = match app.home() {
        Ok(home) => home,
        Err(e) => return output.error(e.to_string(), ExitCode::InvalidArgs),
    };
    home.select_media_type(cmd.media.into());

    match home.load_genres().await {
        Resource::Success(genres) => {
            let human = genres
                .iter()
                .map(|g| format!("{:>6}  {}", g.id, g.name))
                .collect::<Vec<_>>()
                .join("\n");
            print_or_fail(output, genres, human)
        }
        state => output.error(
            state.message().unwrap_or("Genres unavailable").to_string(),
            ExitCode::Error,
        ),
    }
}

pub async fn cast_cmd(cmd: CastCmd, app: &App, output: &Output) -> ExitCode {
    let details = match app.details() {
        Ok(details) => details,
        Err(e) => return output.error(e.to_string(), ExitCode::InvalidArgs),
    };

    match details.load_cast(cmd.id, cmd.media.into()).await {
        Resource::Success(cast) => {
            let human = cast
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join("\n");
            print_or_fail(output, cast, human)
        }
        state => output.error(
            state.message().unwrap_or("Cast unavailable").to_string(),
            ExitCode::Error,
        ),
    }
}

// =============================================================================
// Watch List Command
// =============================================================================

pub async fn watchlist_cmd(cmd: WatchlistCmd, app: &App, output: &Output) -> ExitCode {
    let view = app.watch_list_view();

    match cmd.action {
        WatchlistAction::List => match app.watch_list().list().await {
            Ok(entries) => {
                let human = if entries.is_empty() {
                    "Watch list is empty.".to_string()
                } else {
                    entries
                        .iter()
                        .map(|e| format!("{:>8}  {}", e.media_id, e))
                        .collect::<Vec<_>>()
                        .join("\n")
                };
                print_or_fail(output, entries, human)
            }
            Err(e) => output.error(e.to_string(), ExitCode::Error),
        },

        WatchlistAction::Add { id, media } => {
            let catalog = match app.catalog() {
                Ok(catalog) => catalog,
                Err(e) => return output.error(e.to_string(), ExitCode::InvalidArgs),
            };
            let item = match catalog.details(id, media.into()).await {
                Ok(item) => item,
                Err(e) => {
                    return output.error(format!("Lookup failed: {}", e), catalog_exit_code(&e))
                }
            };
            match view.add(&item).await {
                Ok(()) => print_or_fail(output, &item, format!("Added {}", item)),
                Err(e) => output.error(e.to_string(), ExitCode::Error),
            }
        }

        WatchlistAction::Remove { id } => match view.remove(id).await {
            Ok(()) => print_or_fail(output, StatusOk::default(), format!("Removed {}", id)),
            Err(e) => output.error(e.to_string(), ExitCode::Error),
        },

        WatchlistAction::Exists { id } => match view.exists(id).await {
            Ok(exists) => print_or_fail(
                output,
                ExistsOutput {
                    media_id: id,
                    exists,
                },
                if exists { "yes" } else { "no" },
            ),
            Err(e) => output.error(e.to_string(), ExitCode::Error),
        },

        WatchlistAction::Clear => match view.clear().await {
            Ok(()) => print_or_fail(output, StatusOk::default(), "Watch list cleared"),
            Err(e) => output.error(e.to_string(), ExitCode::Error),
        },
    }
}

// =============================================================================
// Account Commands
// =============================================================================

fn session_from(response: &AuthResponse) -> SessionInfo {
    SessionInfo {
        signed_in: response.token.is_some(),
        user_name: response.user.as_ref().map(|u| u.name.clone()),
        email: response.user.as_ref().and_then(|u| u.email.clone()),
    }
}

fn finish_auth(state: Resource<AuthResponse>, verb: &str, output: &Output) -> ExitCode {
    match state {
        Resource::Success(response) => {
            let info = session_from(&response);
            let human = match &info.user_name {
                Some(name) => format!("{} as {}", verb, name),
                None => verb.to_string(),
            };
            print_or_fail(output, info, human)
        }
        Resource::Error(message) => {
            let code = auth_exit_code(&message);
            output.error(message, code)
        }
        _ => output.error("Request did not complete", ExitCode::Error),
    }
}

pub async fn register_cmd(cmd: RegisterCmd, app: &App, output: &Output) -> ExitCode {
    let request = RegisterRequest {
        password_confirmation: cmd
            .password_confirmation
            .unwrap_or_else(|| cmd.password.clone()),
        name: cmd.name,
        email: cmd.email,
        password: cmd.password,
    };

    output.info(format!("Registering {}...", request.email));
    let state = app.session().register(request).await;
    finish_auth(state, "Registered", output)
}

pub async fn login_cmd(cmd: LoginCmd, app: &App, output: &Output) -> ExitCode {
    let request = LoginRequest {
        email: cmd.email,
        password: cmd.password,
    };

    output.info(format!("Signing in {}...", request.email));
    let state = app.session().login(request).await;
    finish_auth(state, "Signed in", output)
}

pub async fn logout_cmd(app: &App, output: &Output) -> ExitCode {
    let session = app.session();
    if !session.is_signed_in() {
        output.info("Not signed in.");
    }

    match session.logout().await {
        Ok(()) => print_or_fail(output, StatusOk::default(), "Signed out"),
        Err(e) => output.error(e.to_string(), ExitCode::Error),
    }
}

pub async fn whoami_cmd(app: &App, output: &Output) -> ExitCode {
    let session = app.session();
    if !session.is_signed_in() {
        return output.error("Not signed in", ExitCode::AuthError);
    }

    let info = SessionInfo {
        signed_in: true,
        user_name: session.user_name(),
        email: None,
    };
    let human = info
        .user_name
        .clone()
        .unwrap_or_else(|| "Signed in".to_string());
    print_or_fail(output, info, human)
}

pub async fn prefs_cmd(cmd: PrefsCmd, app: &App, output: &Output) -> ExitCode {
    if let Some(include_adult) = cmd.adult {
        if let Err(e) = app.prefs().set_include_adult(include_adult).await {
            return output.error(e.to_string(), ExitCode::Error);
        }
    }

    let prefs = PrefsOutput {
        include_adult: app.prefs().include_adult(),
        signed_in: app.prefs().auth_token().is_some(),
    };
    let human = format!(
        "include_adult = {}\nsigned_in = {}",
        prefs.include_adult, prefs.signed_in
    );
    print_or_fail(output, prefs, human)
}
