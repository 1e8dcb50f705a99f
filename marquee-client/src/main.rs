use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use env_logger::{Builder, Target};
use log::LevelFilter;
use serde::Serialize;

use marquee_client::services::SearchParams;
use marquee_client::{AppContext, ClientConfig};
use marquee_model::{EntityKey, MovieSummary, ProfileUpdate, RegisterRequest};

#[derive(Parser, Debug)]
#[command(name = "marquee", about = "Browse a movie catalog from the terminal")]
struct Cli {
    /// Catalog server URL (overrides MARQUEE_API_URL and config.json)
    #[arg(long, global = true)]
    server: Option<String>,

    /// Items requested per page
    #[arg(long, global = true)]
    page_size: Option<u32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Most popular movies
    Popular {
        #[arg(long, default_value_t = 30)]
        total: u32,
    },
    /// Top-rated movies of a ranking
    TopRated {
        #[arg(long)]
        category: Option<String>,
        #[arg(long, default_value_t = 30)]
        total: u32,
    },
    /// Search movies; at least one criterion is required
    Search {
        #[arg(long)]
        keyword: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        genre: Option<String>,
        #[arg(long)]
        person: Option<String>,
        #[arg(long, default_value_t = 50)]
        total: u32,
    },
    /// Movie detail with its reviews
    Movie { id: String },
    /// Person detail with related movies
    Person { id: String },
    /// One page of the full listing
    Browse {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Sign in and remember the session
    Login {
        username: String,
        #[arg(long, env = "MARQUEE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account
    Register {
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "MARQUEE_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        dob: Option<String>,
    },
    /// Sign out and forget the session
    Logout,
    /// Show or update the signed-in user's profile
    Profile {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        dob: Option<String>,
    },
    /// Manage favorites
    Favorites {
        #[command(subcommand)]
        action: Option<FavoritesAction>,
    },
}

#[derive(Subcommand, Debug)]
enum FavoritesAction {
    /// List favorites (default)
    List,
    /// Add a movie by id
    Add { id: String },
    /// Remove a movie by id
    Remove { id: String },
}

fn init_logger() {
    Builder::new()
        .target(Target::Stderr)
        .filter_level(LevelFilter::Warn)
        .filter_module("marquee_client", LevelFilter::Debug)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        init_logger();
    } else {
        env_logger::init();
    }

    let cli = Cli::parse();

    let mut config = ClientConfig::load().context("failed to load configuration")?;
    if let Some(server) = &cli.server {
        config.base_url = marquee_client::config::normalize_base_url(server)?;
    }
    if let Some(page_size) = cli.page_size {
        config = config.with_page_size(page_size);
    }

    let app = AppContext::from_config(&config).context("failed to create client")?;
    app.start().await.context("failed to restore session")?;

    run(&app, cli.command).await
}

async fn run(app: &AppContext, command: Command) -> Result<()> {
    match command {
        Command::Popular { total } => {
            print_json(&app.catalog.get_popular_movies(total).await?)?;
        }
        Command::TopRated { category, total } => {
            let movies = app
                .catalog
                .get_top_rated_movies(category.as_deref(), total)
                .await?;
            print_json(&movies)?;
        }
        Command::Search {
            keyword,
            title,
            genre,
            person,
            total,
        } => {
            let mut params = SearchParams::new();
            for (key, value) in [("title", title), ("genre", genre), ("person", person)] {
                if let Some(value) = value {
                    params.insert(key, value);
                }
            }
            let outcome = app
                .catalog
                .search_movies(keyword.as_deref(), params, total)
                .await?;
            if let Some(e) = &outcome.failure {
                log::warn!("Search stopped early: {}", e);
            }
            print_json(&outcome.items)?;
        }
        Command::Movie { id } => {
            print_json(&app.movie_detail.load(&EntityKey::new(id)).await)?;
        }
        Command::Person { id } => {
            print_json(&app.person_detail.load(&EntityKey::new(id)).await)?;
        }
        Command::Browse { page, limit } => {
            print_json(&app.catalog.browse(page, limit).await?)?;
        }
        Command::Login { username, password } => {
            let user = app.login(&username, &password).await?;
            print_json(&user)?;
        }
        Command::Register {
            username,
            email,
            password,
            phone,
            dob,
        } => {
            let request = RegisterRequest {
                username,
                email,
                password,
                phone,
                dob,
            };
            app.session.register(&request).await?;
            println!("Registered {}", request.username);
        }
        Command::Logout => {
            app.logout().await?;
            println!("Signed out");
        }
        Command::Profile { email, phone, dob } => {
            let update = ProfileUpdate {
                username: None,
                email,
                phone,
                dob,
            };
            let profile = if update.is_empty() {
                app.session.profile().await?
            } else {
                app.session.update_profile(&update).await?
            };
            print_json(&profile)?;
        }
        Command::Favorites { action } => {
            favorites(app, action.unwrap_or(FavoritesAction::List)).await?;
        }
    }
    Ok(())
}

async fn favorites(app: &AppContext, action: FavoritesAction) -> Result<()> {
    if !app.session.is_authenticated() {
        bail!("not signed in; run `marquee login <username>` first");
    }
    match action {
        FavoritesAction::List => {}
        FavoritesAction::Add { id } => {
            let key = EntityKey::new(id);
            let fetched = app.catalog.get_movie_by_id(&key).await;
            let movie = match fetched {
                Ok(details) => details.summary,
                Err(e) => {
                    log::warn!("Adding {} without details: {}", key, e);
                    MovieSummary::new(key, "")
                }
            };
            app.favorites.add(&movie).await?;
        }
        FavoritesAction::Remove { id } => {
            app.favorites.remove(&EntityKey::new(id)).await?;
        }
    }
    print_json(&app.favorites.favorites())
}
