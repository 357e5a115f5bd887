// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Every page of the app is a subcommand:
//   login / logout   authenticate against the Supabase project
//   username         bind the account to a GitHub username
//   feed             the home feed (random repos from your followers)
//   profile          a GitHub user's profile and repositories
//   repo             one repository in detail
//   explore          everyone registered with the app
// =============================================================================

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "gh-social",
    version,
    about = "A social feed for your GitHub followers, in the terminal",
    long_about = "gh-social signs you in, links your account to a GitHub username, and builds \
                  a feed of repositories picked at random from the people who follow you."
)]
pub struct Cli {
    /// Print results as JSON instead of formatted text
    #[arg(long, global = true)]
    pub json: bool,

    /// Show debug logs on stderr (RUST_LOG overrides this)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in (or sign up) with email and password
    ///
    /// Example: gh-social login --email me@example.com
    Login(LoginArgs),

    /// Sign out and forget the local session
    Logout,

    /// Choose the GitHub username this account follows along as
    ///
    /// Without NAME, the username GitHub associates with your email is
    /// suggested and you are asked to confirm it.
    Username {
        /// GitHub username to bind to
        name: Option<String>,

        /// Accept the suggested username without asking
        #[arg(short, long)]
        yes: bool,
    },

    /// Your feed: repositories from a random sample of your followers
    ///
    /// Example: gh-social feed --interactive
    Feed {
        /// Extra refills to load after the first batch
        #[arg(long, default_value_t = 0)]
        pages: usize,

        /// Keep the feed open: Enter loads more, q quits
        #[arg(short, long, conflicts_with = "pages")]
        interactive: bool,
    },

    /// A GitHub user's profile (defaults to your own)
    Profile {
        /// GitHub login to show
        login: Option<String>,

        /// List their followers
        #[arg(long, conflicts_with = "following")]
        followers: bool,

        /// List who they follow
        #[arg(long)]
        following: bool,
    },

    /// A repository in detail, by its numeric GitHub id
    ///
    /// Example: gh-social repo 724712
    Repo {
        /// Repository id (shown as [repo N] in the feed and on profiles)
        id: u64,
    },

    /// Everyone who has registered a username with gh-social
    Explore,
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email (ideally the one connected to GitHub)
    #[arg(long)]
    pub email: String,

    /// Password; read from GH_SOCIAL_PASSWORD when omitted
    #[arg(long, env = "GH_SOCIAL_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Create the account instead of signing in
    #[arg(long)]
    pub signup: bool,
}
