//! HTML for the browse server. Links are built here from the configured base
//! URLs; the listing itself only knows names and kinds.

use maud::{html, Markup, DOCTYPE};

use crate::config::Config;
use crate::listing::{Entry, Listing};

/// Link that lists the directory at `path`.
pub fn browse_link(config: &Config, path: &str) -> String {
    format!("{}/?path={}", config.base_url, urlencoding::encode(path))
}

/// Link that downloads the file `name` inside `dir`.
pub fn download_link(config: &Config, dir: &str, name: &str) -> String {
    let full = format!("{}{}", dir, name);
    let encoded: Vec<String> = full
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect();
    let encoded = encoded.join("/");
    if encoded.starts_with('/') {
        format!("{}{}", config.download_url, encoded)
    } else {
        format!("{}/{}", config.download_url, encoded)
    }
}

fn entry_row(config: &Config, dir: &str, entry: &Entry) -> Markup {
    if entry.is_dir() {
        let href = browse_link(config, &format!("{}{}/", dir, entry.name));
        html! {
            li class="dir" {
                a href=(href) { (entry.name) "/" }
            }
        }
    } else {
        let href = download_link(config, dir, &entry.name);
        html! {
            li class="file" {
                a href=(href) { (entry.name) }
                " "
                span class="size" { (entry.size_label) }
            }
        }
    }
}

/// Full listing page.
pub fn listing_page(config: &Config, listing: &Listing) -> Markup {
    let back = browse_link(config, &format!("{}..", listing.path));
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { "Index of " (listing.path) }
            }
            body {
                h1 { "Index of " (listing.path) }
                ul #file-list {
                    li class="back" { a href=(back) { "../" } }
                    @for entry in &listing.entries {
                        (entry_row(config, &listing.path, entry))
                    }
                }
            }
        }
    }
}

/// Small error fragment shown in place of a listing.
pub fn error_page(message: &str) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                title { "Error" }
            }
            body {
                div style="padding: 10px; border: 1px solid red; color: red; margin: 10px;" {
                    h2 { "Error" }
                    p { (message) }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::EntryKind;
    use std::net::{IpAddr, Ipv4Addr};
    use std::path::PathBuf;

    fn config() -> Config {
        Config::new(
            PathBuf::from("/srv"),
            IpAddr::V4(Ipv4Addr::LOCALHOST),
            7005,
            7006,
            "http://files",
        )
    }

    #[test]
    fn browse_link_encodes_query() {
        assert_eq!(
            browse_link(&config(), "/my docs/"),
            "http://files:7005/?path=%2Fmy%20docs%2F"
        );
    }

    #[test]
    fn download_link_keeps_separators() {
        assert_eq!(
            download_link(&config(), "/music/", "track 1#.mp3"),
            "http://files:7006/music/track%201%23.mp3"
        );
        assert_eq!(
            download_link(&config(), "rel/", "a.txt"),
            "http://files:7006/rel/a.txt"
        );
    }

    #[test]
    fn page_links_directories_and_files() {
        let listing = Listing {
            path: "/a/".to_string(),
            entries: vec![
                Entry {
                    name: "sub".to_string(),
                    kind: EntryKind::Directory,
                    size_label: String::new(),
                },
                Entry {
                    name: "f.txt".to_string(),
                    kind: EntryKind::File,
                    size_label: "[3B]".to_string(),
                },
            ],
        };
        let body = listing_page(&config(), &listing).into_string();
        assert!(body.contains("href=\"http://files:7005/?path=%2Fa%2F..\""));
        assert!(body.contains("href=\"http://files:7005/?path=%2Fa%2Fsub%2F\""));
        assert!(body.contains("sub/"));
        assert!(body.contains("href=\"http://files:7006/a/f.txt\""));
        assert!(body.contains("[3B]"));
    }

    #[test]
    fn names_are_escaped() {
        let listing = Listing {
            path: "/".to_string(),
            entries: vec![Entry {
                name: "<b>.txt".to_string(),
                kind: EntryKind::File,
                size_label: "[1B]".to_string(),
            }],
        };
        let body = listing_page(&config(), &listing).into_string();
        assert!(body.contains("&lt;b&gt;.txt"));
        assert!(!body.contains("<b>.txt"));
    }
}
