// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging and load configuration from the environment
// 3. Check the page's guard (logged in? username chosen?)
// 4. Dispatch to the subcommand handler and print the page
// 5. Exit with proper code (0 = success, 1 = not logged in / no username,
//    2 = error)
// =============================================================================

mod backend;
mod cli;
mod config;
mod directory;
mod error;
mod feed;
mod github;
mod identity;
mod profile;
mod render;
mod repo_view;
mod session;

use std::io::Write;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use backend::Backend;
use cli::{Cli, Commands, LoginArgs};
use config::Config;
use feed::{FeedAssembler, ScrollTrigger};
use github::GithubClient;
use identity::BindOutcome;
use session::{Session, SessionStore};

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit_code_for(&e)
        }
    };

    std::process::exit(exit_code);
}

// Guard failures are "go log in first", not crashes.
fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<error::Error>() {
        Some(e) if e.is_guard() => 1,
        _ => 2,
    }
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::from_env()?;
    let store = SessionStore::new(config.session_path.clone());

    match cli.command {
        Commands::Login(args) => handle_login(&config, &store, args, cli.json).await,
        Commands::Logout => handle_logout(&config, &store, cli.json).await,
        Commands::Username { name, yes } => {
            handle_username(&config, &store, name, yes, cli.json).await
        }
        Commands::Feed { pages, interactive } => {
            handle_feed(&config, &store, pages, interactive, cli.json).await
        }
        Commands::Profile {
            login,
            followers,
            following,
        } => handle_profile(&config, &store, login, followers, following, cli.json).await,
        Commands::Repo { id } => handle_repo(&config, id, cli.json).await,
        Commands::Explore => handle_explore(&config, cli.json).await,
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "gh_social=debug" } else { "gh_social=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn github_client(config: &Config) -> Result<GithubClient> {
    Ok(GithubClient::new(
        config.github_api_url.clone(),
        config.github_token.clone(),
    )?)
}

fn backend(config: &Config) -> Result<Backend> {
    let (url, key) = config.supabase()?;
    Ok(Backend::new(url, key)?)
}

// The directory sidebar is optional: without Supabase settings it is empty.
fn optional_backend(config: &Config) -> Option<Backend> {
    match backend(config) {
        Ok(backend) => Some(backend),
        Err(e) => {
            warn!("user directory unavailable: {e:#}");
            None
        }
    }
}

// Handles the 'login' subcommand
async fn handle_login(config: &Config, store: &SessionStore, args: LoginArgs, json: bool) -> Result<i32> {
    let backend = backend(config)?;

    let auth = if args.signup {
        backend.sign_up(&args.email, &args.password).await
    } else {
        backend.sign_in(&args.email, &args.password).await
    }
    .context("authentication failed")?;

    let session = Session::new(auth.email, auth.access_token).with_refresh_token(auth.refresh_token);
    store.save(&session)?;

    if json {
        render::print_json(&json!({ "email": session.email, "logged_in": true }))?;
    } else {
        println!("✅ Signed in as {}", session.email);
        println!("   Next: gh-social username");
    }
    Ok(0)
}

// Handles the 'logout' subcommand
async fn handle_logout(config: &Config, store: &SessionStore, json: bool) -> Result<i32> {
    if let Some(mut saved) = store.load()? {
        if let Some(backend) = optional_backend(config) {
            if let Err(e) = session::sign_out(&mut saved, store, &backend).await {
                warn!("sign out request failed, clearing local session anyway: {e}");
            }
        }
    }

    store.clear()?;
    if json {
        render::print_json(&signed_out_json())?;
    } else {
        println!("👋 Signed out");
    }
    Ok(0)
}

fn signed_out_json() -> serde_json::Value {
    json!({ "logged_in": false })
}

// Shaped like identity::BindOutcome so scripts can read "outcome" either way.
fn unchanged_username_json(username: &str) -> serde_json::Value {
    json!({ "outcome": "unchanged", "username": username })
}

// Handles the 'username' subcommand
async fn handle_username(
    config: &Config,
    store: &SessionStore,
    name: Option<String>,
    yes: bool,
    json: bool,
) -> Result<i32> {
    let mut session = store.require()?;

    if let Some(existing) = &session.username {
        if json {
            render::print_json(&unchanged_username_json(existing))?;
        } else {
            println!("Already following along as @{}", existing);
        }
        return Ok(0);
    }

    let name = match name {
        Some(name) => name,
        None => {
            let github = github_client(config)?;
            let Some(found) = identity::suggest_username(&github, &session.email).await else {
                bail!(
                    "no GitHub user found for {}, pass the username explicitly",
                    session.email
                );
            };
            if !yes && !confirm_suggestion(&found, &session.email, json).await? {
                bail!("suggestion declined, pass the username explicitly: gh-social username NAME");
            }
            found
        }
    };

    let backend = backend(config)?.with_access_token(session.access_token.clone());
    let outcome = identity::bind_username(&mut session, store, &backend, &name).await?;

    if json {
        render::print_json(&outcome)?;
        return Ok(0);
    }

    match &outcome {
        BindOutcome::Registered { .. } | BindOutcome::AlreadyRegistered { .. } => {
            println!("✅ Username set to @{}", outcome.username());
        }
        BindOutcome::StoreFailed { .. } => {
            println!("⚠️  Failed to save username to database.");
            println!("   Using @{} on this machine anyway", outcome.username());
        }
    }
    Ok(0)
}

// The prompt goes to stderr under --json so stdout stays machine readable.
async fn confirm_suggestion(found: &str, email: &str, json: bool) -> Result<bool> {
    let prompt = format!("🔍 Found @{} for {}. Use it? [y/N] ", found, email);
    if json {
        eprint!("{prompt}");
        std::io::stderr().flush()?;
    } else {
        print!("{prompt}");
        std::io::stdout().flush()?;
    }
    Ok(identity::confirm(BufReader::new(tokio::io::stdin())).await?)
}

// Handles the 'feed' subcommand
async fn handle_feed(
    config: &Config,
    store: &SessionStore,
    pages: usize,
    interactive: bool,
    json: bool,
) -> Result<i32> {
    let session = store.require()?;
    let login = session.require_username()?.to_string();

    let github = github_client(config)?;
    let backend = optional_backend(config);

    let (home, directory) = futures::join!(
        feed::open_home(&github, &login, config.feed_batch, StdRng::from_entropy()),
        directory::list_handles_or_empty(backend.as_ref()),
    );
    let feed::Home { user, feed: mut assembler } = home.context("Unable to fetch user data")?;

    let mut trigger = ScrollTrigger::new();
    let now = Utc::now();

    if !json {
        render::print_user_header(&user);
        println!(
            "\n📰 Your Feed ({} followers to sample from)",
            assembler.followers().len()
        );
        if assembler.items().is_empty() {
            println!("   No repositories to show yet...");
        }
        render::print_feed_items(assembler.items(), now);
    }

    if interactive {
        if json {
            render::print_json(assembler.items())?;
        } else {
            render::print_directory(&directory);
        }
        scroll_interactively(&mut assembler, &mut trigger, json).await?;
    } else {
        for _ in 0..pages {
            let before = assembler.items().len();
            feed::scroll_to_end(&mut assembler, &mut trigger).await;
            if !json {
                render::print_feed_items(&assembler.items()[before..], now);
            }
        }

        if json {
            render::print_json(&json!({
                "user": user,
                "feed": assembler.items(),
                "explore": directory,
            }))?;
            return Ok(0);
        }
    }

    if !json && !interactive {
        render::print_directory(&directory);
    }
    Ok(0)
}

// Reads Enter / q from stdin. Every Enter means the reader reached the last
// entry, which is exactly when the trigger allows a refill.
async fn scroll_interactively<R: rand::Rng>(
    assembler: &mut FeedAssembler<R>,
    trigger: &mut ScrollTrigger,
    json: bool,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        if !json {
            print!("\n-- Enter: load more · q: quit -- ");
            std::io::stdout().flush()?;
        }

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().eq_ignore_ascii_case("q") {
            break;
        }

        let before = assembler.items().len();
        if !json {
            println!("⏳ Loading more...");
        }
        let Some(added) = feed::scroll_to_end(assembler, trigger).await else {
            continue;
        };
        debug!(refills = trigger.fired(), added, "scrolled to the end");
        let new_items = &assembler.items()[before..];

        if json {
            render::print_json(new_items)?;
        } else if added == 0 {
            println!("   No new repositories this time, press Enter to try again.");
        } else {
            render::print_feed_items(new_items, Utc::now());
        }
    }
    Ok(())
}

// Handles the 'profile' subcommand
async fn handle_profile(
    config: &Config,
    store: &SessionStore,
    login: Option<String>,
    followers: bool,
    following: bool,
    json: bool,
) -> Result<i32> {
    let session = store.require()?;
    let login = match login {
        Some(login) => login,
        None => session.require_username()?.to_string(),
    };

    let github = github_client(config)?;
    let backend = optional_backend(config);

    let (profile, directory) = futures::join!(
        profile::fetch_profile(&github, &login),
        directory::list_handles_or_empty(backend.as_ref()),
    );
    let profile = profile.with_context(|| format!("could not load profile for {}", login))?;

    if json {
        if followers {
            render::print_json(&profile.followers)?;
        } else if following {
            render::print_json(&profile.following)?;
        } else {
            render::print_json(&json!({ "profile": profile, "explore": directory }))?;
        }
        return Ok(0);
    }

    if followers {
        render::print_people("Followers", &profile.followers);
    } else if following {
        render::print_people("Following", &profile.following);
    } else {
        render::print_profile(&profile, Utc::now());
        if !directory.is_empty() {
            render::print_directory(&directory);
        }
    }
    Ok(0)
}

// Handles the 'repo' subcommand. Repository pages need no login.
async fn handle_repo(config: &Config, id: u64, json: bool) -> Result<i32> {
    let github = github_client(config)?;
    let detail = repo_view::fetch_repo_detail(&github, id)
        .await
        .context("Failed to fetch repository data")?;

    if json {
        render::print_json(&detail)?;
    } else {
        render::print_repo_detail(&detail, Utc::now());
    }
    Ok(0)
}

// Handles the 'explore' subcommand
async fn handle_explore(config: &Config, json: bool) -> Result<i32> {
    let backend = backend(config)?;
    let handles = directory::list_handles(&backend)
        .await
        .context("could not load the user directory")?;

    if json {
        render::print_json(&handles)?;
    } else {
        render::print_directory(&handles);
    }
    Ok(0)
}
