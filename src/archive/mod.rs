//! Archival of fetched page bodies
//!
//! Each processed page is persisted once, under a key derived from its URL
//! by [`encode_key`].

mod file;

pub use file::FileArchiver;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while archiving a page
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Persists page bodies
#[async_trait]
pub trait DocumentArchiver: Send + Sync {
    /// Stores one record for `url` holding the rendered page
    async fn archive(&self, url: &str, rendered: &str) -> Result<(), ArchiveError>;
}

/// Escape character introducing every substitute token
const ESCAPE: char = '`';

/// Encodes a URL into a storage key safe for file names
///
/// The scheme separator `://`, path separators, wildcards, query markers
/// and the other characters file systems reject are each replaced by a
/// distinct two-character token starting with a backtick; the backtick
/// itself is doubled. Every token is self-delimiting, so the encoding can
/// be reversed and two distinct URLs never share a key.
pub fn encode_key(url: &str) -> String {
    let mut key = String::with_capacity(url.len());
    let mut rest = url;

    while let Some(c) = rest.chars().next() {
        if let Some(after) = rest.strip_prefix("://") {
            key.push(ESCAPE);
            key.push('s');
            rest = after;
            continue;
        }

        let token = match c {
            '`' => Some('`'),
            '/' => Some('p'),
            '*' => Some('w'),
            '?' => Some('q'),
            ':' => Some('c'),
            '\\' => Some('b'),
            '<' => Some('l'),
            '>' => Some('g'),
            '|' => Some('v'),
            '"' => Some('d'),
            _ => None,
        };
        match token {
            Some(t) => {
                key.push(ESCAPE);
                key.push(t);
            }
            None => key.push(c),
        }
        rest = &rest[c.len_utf8()..];
    }

    key
}

/// Reverses [`encode_key`]; `None` if `key` contains an unknown token
pub fn decode_key(key: &str) -> Option<String> {
    let mut url = String::with_capacity(key.len());
    let mut chars = key.chars();

    while let Some(c) = chars.next() {
        if c != ESCAPE {
            url.push(c);
            continue;
        }
        let decoded = match chars.next()? {
            's' => "://",
            '`' => "`",
            'p' => "/",
            'w' => "*",
            'q' => "?",
            'c' => ":",
            'b' => "\\",
            'l' => "<",
            'g' => ">",
            'v' => "|",
            'd' => "\"",
            _ => return None,
        };
        url.push_str(decoded);
    }

    Some(url)
}
