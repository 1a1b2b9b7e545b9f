//! Output formatting utilities

use appcenter::{Group, Release, Store};
use console::style;

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), message);
}

/// Print an info message
pub fn info(message: &str) {
    println!("{} {}", style("→").blue(), message);
}

/// Create a styled header
pub fn header(text: &str) -> String {
    style(text).bold().to_string()
}

/// Create a styled key-value line
pub fn key_value(key: &str, value: &str) -> String {
    format!("  {}: {}", style(key).dim(), value)
}

/// Print JSON for `--format json`
pub fn json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_release(release: &Release) {
    println!("{}", header(&format!("Release {}", release.id)));
    println!(
        "{}",
        key_value(
            "Version",
            &style(format!("{} ({})", release.short_version, release.version))
                .green()
                .bold()
                .to_string()
        )
    );
    if let Some(os) = &release.app_os {
        println!("{}", key_value("Platform", os));
    }
    if let Some(uploaded_at) = &release.uploaded_at {
        println!("{}", key_value("Uploaded", uploaded_at));
    }
    if let Some(url) = &release.install_url {
        println!("{}", key_value("Install", &style(url).cyan().to_string()));
    }
    if !release.distribution_groups.is_empty() {
        let names: Vec<&str> = release
            .distribution_groups
            .iter()
            .map(|g| g.name.as_str())
            .collect();
        println!("{}", key_value("Groups", &names.join(", ")));
    }
    if !release.distribution_stores.is_empty() {
        let names: Vec<&str> = release
            .distribution_stores
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        println!("{}", key_value("Stores", &names.join(", ")));
    }
    if let Some(notes) = release.release_notes.as_deref().filter(|n| !n.is_empty()) {
        println!("{}", key_value("Notes", notes));
    }
}

pub fn print_group(group: &Group) {
    println!("{}", header(&group.name));
    println!("{}", key_value("ID", &group.id));
    if let Some(display_name) = &group.display_name {
        println!("{}", key_value("Display name", display_name));
    }
    println!(
        "{}",
        key_value("Public", if group.is_public { "yes" } else { "no" })
    );
}

pub fn print_store(store: &Store) {
    println!("{}", header(&store.name));
    println!("{}", key_value("ID", &store.id));
    if let Some(store_type) = &store.store_type {
        println!("{}", key_value("Type", store_type));
    }
    if let Some(track) = &store.track {
        println!("{}", key_value("Track", track));
    }
}
