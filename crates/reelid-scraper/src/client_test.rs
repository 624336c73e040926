use super::*;

fn test_client(base_url: &str) -> WatchlistClient {
    WatchlistClient::with_base_url(
        base_url,
        5,
        "reelid-test/0.1",
        PaginationSettings::default(),
    )
    .expect("client construction should not fail")
}

#[test]
fn page_url_for_first_page() {
    let client = test_client("https://letterboxd.com");
    assert_eq!(
        client.page_url("dave", 1).as_str(),
        "https://letterboxd.com/dave/watchlist/page/1/"
    );
}

#[test]
fn page_url_strips_trailing_slash_from_base() {
    let client = test_client("https://letterboxd.com/");
    assert_eq!(
        client.page_url("dave", 12).as_str(),
        "https://letterboxd.com/dave/watchlist/page/12/"
    );
}

#[test]
fn page_url_encodes_username_as_one_segment() {
    let client = test_client("https://letterboxd.com");
    let url = client.page_url("a/b", 1);
    assert_eq!(url.as_str(), "https://letterboxd.com/a%2Fb/watchlist/page/1/");
}

#[test]
fn page_url_keeps_base_path_prefix() {
    let client = test_client("http://127.0.0.1:8080/mirror");
    assert_eq!(
        client.page_url("dave", 2).as_str(),
        "http://127.0.0.1:8080/mirror/dave/watchlist/page/2/"
    );
}

#[test]
fn rejects_unparseable_base_url() {
    let result = WatchlistClient::with_base_url(
        "not a url",
        5,
        "reelid-test/0.1",
        PaginationSettings::default(),
    );
    assert!(
        matches!(result, Err(ScraperError::InvalidBaseUrl { .. })),
        "expected InvalidBaseUrl"
    );
}

#[test]
fn default_settings_match_listing_courtesy_limits() {
    let client = test_client("https://letterboxd.com");
    assert_eq!(client.settings().max_pages, 50);
    assert_eq!(client.settings().page_delay_ms, 100);
}
