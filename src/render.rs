// src/render.rs
// =============================================================================
// Everything that prints pages to the terminal.
//
// Each page either prints a human-readable layout or, with --json, the same
// data serialized with serde_json. Logs go to stderr, so JSON on stdout
// stays machine readable.
// =============================================================================

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::feed::FeedItem;
use crate::github::{Repo, User, UserSummary};
use crate::profile::Profile;
use crate::repo_view::RepoDetail;

/// "N days ago" / "N months ago" / "N years ago", with 30-day months.
pub fn format_age(created: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = (now - created).num_days().max(0);
    if days < 30 {
        return plural(days, "day");
    }
    let months = days / 30;
    if months < 12 {
        return plural(months, "month");
    }
    plural(months / 12, "year")
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{n} {unit}s ago")
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_user_header(user: &User) {
    println!("👤 {} (@{})", user.display_name(), user.login);
    if let Some(bio) = user.bio.as_deref().filter(|b| !b.trim().is_empty()) {
        println!("   {}", bio.trim());
    }
}

pub fn print_feed_items(items: &[FeedItem], now: DateTime<Utc>) {
    for item in items {
        print_feed_item(item, now);
    }
}

fn print_feed_item(item: &FeedItem, now: DateTime<Utc>) {
    let repo = &item.repo;
    let stats = &item.details;

    println!("{}", "-".repeat(72));
    println!("@{}", item.follower.login);
    println!("💻 {}  [repo {}]", repo.name, repo.id);
    println!("   {}", repo.description.as_deref().unwrap_or("No description provided."));
    println!("   ⏳ Created {}", format_age(repo.created_at, now));

    let languages = if stats.languages.is_empty() {
        "No languages".to_string()
    } else {
        stats.languages.join(", ")
    };
    println!("   🏷️  {}", languages);
    println!(
        "   ⭐ {} stars  🍴 {} forks  👀 {} watchers  🐞 {} issues  🔀 {} PRs",
        repo.stargazers_count, repo.forks_count, repo.watchers_count, stats.issues, stats.pulls
    );
    if !repo.html_url.is_empty() {
        println!("   🔗 {}", repo.html_url);
    }
}

pub fn print_directory(handles: &[String]) {
    println!("\n🧭 Explore People");
    if handles.is_empty() {
        println!("   Nothing to show here...");
        return;
    }
    for handle in handles {
        println!("   @{}", handle);
    }
}

pub fn print_profile(profile: &Profile, now: DateTime<Utc>) {
    let user = &profile.user;
    print_user_header(user);
    println!(
        "   {} followers · {} following · {} public repos",
        user.followers, user.following, user.public_repos
    );
    if let Some(url) = &user.html_url {
        println!("   ↗️  {}", url);
    }

    println!("\n📦 Repositories");
    if profile.repos.is_empty() {
        println!("   No repositories found.");
        return;
    }
    for repo in &profile.repos {
        print_repo_line(repo, now);
    }
}

/// Followers / following list, printed instead of a dialog.
pub fn print_people(title: &str, people: &[UserSummary]) {
    println!("{}", title);
    if people.is_empty() {
        println!("   No {} found.", title.to_lowercase());
        return;
    }
    for person in people {
        println!("   @{}", person.login);
    }
}

fn print_repo_line(repo: &Repo, now: DateTime<Utc>) {
    println!(
        "   {:<32} ⭐ {:<5} 🍴 {:<5} ⏳ {:<16} [repo {}]",
        truncate(&repo.name, 32),
        repo.stargazers_count,
        repo.forks_count,
        format_age(repo.created_at, now),
        repo.id
    );
    println!("      {}", repo.description.as_deref().unwrap_or("No description"));
}

pub fn print_repo_detail(detail: &RepoDetail, now: DateTime<Utc>) {
    let repo = &detail.repo;
    println!("📁 {}/{}", repo.owner.login, repo.name);
    if repo.fork {
        println!("   🍴 Forked Repository");
    }
    println!("   Created {}", format_age(repo.created_at, now));
    println!("\n   {}", repo.description.as_deref().unwrap_or("No description provided."));
    println!(
        "\n   ⭐ {} Stars   🍴 {} Forks   🐛 {} Open issues   👀 {} Watchers",
        repo.stargazers_count, repo.forks_count, repo.open_issues_count, repo.watchers_count
    );

    if !detail.languages.is_empty() {
        println!("\n   Languages: {}", detail.languages.join(", "));
    }
    if !detail.contributors.is_empty() {
        let logins: Vec<_> = detail.contributors.iter().map(|c| format!("@{}", c.login)).collect();
        println!("   Contributors: {}", logins.join(" "));
    }
    if !repo.html_url.is_empty() {
        println!("\n   🔗 {}", repo.html_url);
    }

    if !detail.siblings.is_empty() {
        println!("\n🔎 Explore more from {}", repo.owner.login);
        for sibling in &detail.siblings {
            print_repo_line(sibling, now);
        }
    }
}

// Truncates on a char boundary, adding "..." when something was cut.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}
