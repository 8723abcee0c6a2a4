//! Scrape contracts against the hosting site.
//!
//! The three patterns below are the whole dependency on the upstream page and
//! API shapes. Each helper returns the first match only.

use std::sync::LazyLock;

use regex::Regex;

static CLIENT_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"client_id:"([^"]+)""#).expect("valid client_id pattern"));

static TRACK_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"soundcloud\.com/[^/]+/(\d+)").expect("valid track id pattern"));

static MP3_128_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""http_mp3_128_url":"([^"]+)""#).expect("valid stream url pattern")
});

/// Client credential embedded in the track page HTML.
pub fn client_id(html: &str) -> Option<&str> {
    first_capture(&CLIENT_ID_RE, html)
}

/// Numeric track id from the track URL path.
pub fn track_id(url: &str) -> Option<&str> {
    first_capture(&TRACK_ID_RE, url)
}

/// MP3-128 stream URL from the streams endpoint JSON, with `\u0026` escapes
/// turned back into `&`.
pub fn mp3_stream_url(body: &str) -> Option<String> {
    first_capture(&MP3_128_URL_RE, body).map(|url| url.replace(r"\u0026", "&"))
}

fn first_capture<'a>(re: &Regex, haystack: &'a str) -> Option<&'a str> {
    re.captures(haystack)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
