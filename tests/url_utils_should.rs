use ytproxy::server::utils::url_utils::relative_url;

#[test]
fn test_host_moves_into_query_under_prefix() {
    let rewritten = relative_url("https://i.ytimg.com/vi/ID/mqdefault.jpg?x=1", "/p").unwrap();

    assert_eq!(rewritten, "/p/vi/ID/mqdefault.jpg?x=1&host=i.ytimg.com");
}

#[test]
fn test_no_prefix_keeps_path() {
    let rewritten = relative_url("https://r4.googlevideo.com/videoplayback", "").unwrap();

    assert_eq!(rewritten, "/videoplayback?host=r4.googlevideo.com");
}

#[test]
fn test_existing_host_param_is_replaced() {
    let rewritten =
        relative_url("https://r4.googlevideo.com/x?host=old.com&y=2", "").unwrap();

    assert_eq!(rewritten, "/x?y=2&host=r4.googlevideo.com");
    assert_eq!(rewritten.matches("host=").count(), 1);
}

#[test]
fn test_rewriting_twice_changes_nothing() {
    let once = relative_url("https://i.ytimg.com/vi/ID/mqdefault.jpg?x=1", "/p").unwrap();
    let twice = relative_url(&once, "/p").unwrap();

    assert_eq!(once, twice);
    assert_eq!(twice.matches("host=").count(), 1);
}

#[test]
fn test_fragment_is_dropped() {
    let rewritten = relative_url("https://i.ytimg.com/sb/ID/M0.jpg?sigh=abc#frag", "").unwrap();

    assert_eq!(rewritten, "/sb/ID/M0.jpg?sigh=abc&host=i.ytimg.com");
}

#[test]
fn test_garbage_is_an_error() {
    assert!(relative_url("https://", "").is_err());
}
