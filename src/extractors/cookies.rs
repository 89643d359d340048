use std::path::Path;

/// Domain a cookie row must belong to before it is forwarded
const COOKIE_DOMAIN: &str = "youtube.com";

/// `path` if it currently names a file.
///
/// Extractors call this on every attempt so that a cookie export added or replaced
/// while the service runs is picked up by the next request.
pub fn current_store(path: Option<&Path>) -> Option<&Path> {
    path.filter(|path| path.is_file())
}

/// Build a `Cookie` header value from a Netscape-format cookie export.
///
/// Returns `None` when the file is missing, unreadable, or holds no YouTube cookies.
pub fn load_cookie_header(path: &Path) -> Option<String> {
    let content = match fs_err::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::debug!("Cookie store not readable: {}", e);
            return None;
        }
    };

    let header = cookie_header_from_netscape(&content);
    if header.is_empty() {
        None
    } else {
        Some(header)
    }
}

/// Collect `name=value` pairs for YouTube rows, joined with `"; "`
pub fn cookie_header_from_netscape(content: &str) -> String {
    content
        .lines()
        .filter(|line| !line.starts_with('#') && !line.trim().is_empty())
        .filter_map(|line| {
            let fields: Vec<&str> = line.trim().split('\t').collect();
            if fields.len() < 7 || !fields[0].contains(COOKIE_DOMAIN) {
                return None;
            }
            Some(format!("{}={}", fields[5], fields[6]))
        })
        .collect::<Vec<_>>()
        .join("; ")
}
