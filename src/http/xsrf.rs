//! Anti-forgery (XSRF) token lookup from the shared cookie jar

use percent_encoding::percent_decode_str;
use reqwest::cookie::CookieStore;
use reqwest::Method;
use url::Url;

/// Cookie set by the server's CSRF bootstrap endpoint
pub const XSRF_COOKIE: &str = "XSRF-TOKEN";

/// Header the token is echoed back in
pub const XSRF_HEADER: &str = "X-XSRF-TOKEN";

/// Path of the bootstrap endpoint, relative to the app base URL
pub const CSRF_COOKIE_PATH: &str = "/sanctum/csrf-cookie";

/// Returns true for verbs that change server state and need the token
pub fn is_mutating(method: &Method) -> bool {
    ["POST", "PUT", "DELETE", "PATCH"]
        .iter()
        .any(|verb| method.as_str().eq_ignore_ascii_case(verb))
}

/// Reads the decoded XSRF token the jar would send to `url`
pub fn token_for<C: CookieStore + ?Sized>(jar: &C, url: &Url) -> Option<String> {
    let header = jar.cookies(url)?;
    let cookies = header.to_str().ok()?;
    find_cookie(cookies, XSRF_COOKIE)
}

/// Extracts and percent-decodes cookie `name` from a `Cookie` header string.
///
/// A name that appears more than once is treated as absent.
pub fn find_cookie(cookie_header: &str, name: &str) -> Option<String> {
    let mut matches = cookie_header
        .split(';')
        .map(str::trim)
        .filter_map(|pair| pair.split_once('='))
        .filter(|(key, _)| *key == name)
        .map(|(_, value)| value);

    let value = matches.next()?;
    if matches.next().is_some() {
        return None;
    }

    Some(percent_decode_str(value).decode_utf8_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::cookie::Jar;

    #[test]
    fn test_find_cookie_decodes_value() {
        let header = "laravel_session=abc; XSRF-TOKEN=eyJpdiI6IkF%3D%3D; theme=dark";
        assert_eq!(
            find_cookie(header, XSRF_COOKIE).as_deref(),
            Some("eyJpdiI6IkF==")
        );
    }

    #[test]
    fn test_find_cookie_missing() {
        assert!(find_cookie("laravel_session=abc", XSRF_COOKIE).is_none());
        assert!(find_cookie("", XSRF_COOKIE).is_none());
    }

    #[test]
    fn test_find_cookie_requires_exact_name() {
        assert!(find_cookie("OLD-XSRF-TOKEN=zzz", XSRF_COOKIE).is_none());
    }

    #[test]
    fn test_duplicate_cookie_is_ambiguous() {
        assert!(find_cookie("XSRF-TOKEN=a; XSRF-TOKEN=b", XSRF_COOKIE).is_none());
    }

    #[test]
    fn test_plus_is_not_a_space() {
        assert_eq!(find_cookie("XSRF-TOKEN=a+b%20c", XSRF_COOKIE).as_deref(), Some("a+b c"));
    }

    #[test]
    fn test_mutating_methods() {
        assert!(is_mutating(&Method::POST));
        assert!(is_mutating(&Method::PUT));
        assert!(is_mutating(&Method::DELETE));
        assert!(is_mutating(&Method::PATCH));
        assert!(!is_mutating(&Method::GET));
        assert!(!is_mutating(&Method::HEAD));
        assert!(!is_mutating(&Method::OPTIONS));
    }

    #[test]
    fn test_lowercase_method_is_mutating() {
        let post = Method::from_bytes(b"post").expect("method");
        let patch = Method::from_bytes(b"patch").expect("method");
        assert!(is_mutating(&post));
        assert!(is_mutating(&patch));
        assert!(!is_mutating(&Method::from_bytes(b"get").expect("method")));
    }

    #[test]
    fn test_token_from_jar() {
        let jar = Jar::default();
        let url = Url::parse("http://localhost:8000/api/vote").expect("valid url");
        jar.add_cookie_str("XSRF-TOKEN=tok%2Fen; Path=/", &url);

        assert_eq!(token_for(&jar, &url).as_deref(), Some("tok/en"));
    }
}
