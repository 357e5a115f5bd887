// src/feed/mod.rs
// =============================================================================
// The home feed: repositories picked at random from the people who follow
// the signed-in user.
//
// Submodules:
// - assembler: samples followers, fetches one random repo each, enriches it
//   (issues, pulls, languages) and appends the batch to the feed
// - trigger: decides when the reader has reached the end of the feed and a
//   refill should start (the terminal version of infinite scroll)
//
// The upstream API has no "random repositories of my followers" endpoint and
// we do not page through followers; random sampling on every refill stands
// in for pagination, so the same repository can appear more than once.
// =============================================================================

mod assembler;
mod trigger;

pub use assembler::{FeedAssembler, FeedItem};
pub use trigger::ScrollTrigger;

use rand::Rng;

use crate::error::Result;
use crate::github::{GithubClient, User};

/// Everything the home page needs once it has loaded.
pub struct Home<R> {
    pub user: User,
    pub feed: FeedAssembler<R>,
}

/// Loads the bound user's record and followers, then fills the first batch.
/// Failing to load the user or their followers fails the page; failures
/// inside the batch only shrink it.
pub async fn open_home<R: Rng>(
    github: &GithubClient,
    login: &str,
    batch_size: usize,
    rng: R,
) -> Result<Home<R>> {
    let user = github.user(login).await?;
    let followers = github.followers(&user.login).await?;

    let mut feed = FeedAssembler::new(github.clone(), followers, batch_size, rng);
    feed.load_more().await;

    Ok(Home { user, feed })
}

/// The reader reached the end of the feed. Refills when the trigger allows
/// it and returns how many entries were appended, or None when no refill
/// started.
pub async fn scroll_to_end<R: Rng>(
    feed: &mut FeedAssembler<R>,
    trigger: &mut ScrollTrigger,
) -> Option<usize> {
    let len = feed.items().len();
    if !trigger.observe(len.saturating_sub(1), len, feed.is_loading()) {
        return None;
    }
    Some(feed.load_more().await)
}
