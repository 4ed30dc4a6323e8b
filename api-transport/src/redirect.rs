// api-transport/src/redirect.rs

/// Non-empty path segments of a URL or location, ignoring scheme, host, query and fragment
fn path_segments(url: &str) -> Vec<&str> {
    let path = url.split(['?', '#']).next().unwrap_or("");
    let path = match path.split_once("://") {
        Some((_, rest)) => rest.split_once('/').map(|(_, p)| p).unwrap_or(""),
        None => path,
    };
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Last path segment of a request URL
pub fn last_path_segment(url: &str) -> Option<&str> {
    path_segments(url).last().copied()
}

/// Whether a 404 on `request_url` means the current page's resource is gone.
///
/// A string heuristic: the request's last path segment has to appear as a
/// segment of the current location.
pub fn location_shows_resource(request_url: &str, location: &str) -> bool {
    let Some(resource) = last_path_segment(request_url) else {
        return false;
    };
    path_segments(location).contains(&resource)
}
