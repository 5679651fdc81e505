use url::Url;
use ytproxy::server::utils::manifest_utils::{
    ManifestLine, is_manifest_content_type, manifest_base, rewrite_manifest,
};
use ytproxy::server::utils::url_utils::relative_url;

fn base_url() -> Url {
    Url::parse("https://r.host/path/master.m3u8").unwrap()
}

#[test]
fn test_lines_are_classified_before_rewriting() {
    assert_eq!(
        ManifestLine::classify("segment1.ts"),
        ManifestLine::RelativeReference("segment1.ts")
    );
    assert_eq!(
        ManifestLine::classify("https://r.host/a.m3u8"),
        ManifestLine::AbsoluteReference("https://r.host/a.m3u8")
    );
    assert_eq!(
        ManifestLine::classify("#EXT-X-KEY:METHOD=AES-128,URI=\"https://r.host/key\""),
        ManifestLine::UriAttribute("https://r.host/key")
    );
    // a .ts suffix inside a comment isn't a reference
    assert_eq!(ManifestLine::classify("# see notes.ts"), ManifestLine::Other);
    assert_eq!(ManifestLine::classify("#EXTINF:5.0,"), ManifestLine::Other);
    assert_eq!(ManifestLine::classify(""), ManifestLine::Other);
    assert_eq!(ManifestLine::classify("video.mp4"), ManifestLine::Other);
}

#[test]
fn test_base_is_directory_of_final_url() {
    assert_eq!(manifest_base(&base_url()).unwrap(), "https://r.host/path/");
    assert_eq!(
        manifest_base(&Url::parse("http://r.host/master.m3u8?x=1").unwrap()).unwrap(),
        "https://r.host/"
    );
}

#[test]
fn test_relative_segment_resolves_against_manifest() {
    let rewritten = rewrite_manifest("segment1.ts", &base_url(), "").unwrap();

    assert_eq!(
        rewritten,
        relative_url("https://r.host/path/segment1.ts", "").unwrap()
    );
    assert_eq!(rewritten, "/path/segment1.ts?host=r.host");
}

#[test]
fn test_uri_attribute_is_the_only_thing_rewritten() {
    let rewritten = rewrite_manifest(
        "#EXT-X-KEY:METHOD=AES-128,URI=\"https://r.host/key\",IV=0x1",
        &base_url(),
        "",
    )
    .unwrap();

    assert_eq!(
        rewritten,
        "#EXT-X-KEY:METHOD=AES-128,URI=\"/key?host=r.host\",IV=0x1"
    );
}

#[test]
fn test_full_playlist() {
    let body = "#EXTM3U\n\
                #EXT-X-MAP:URI=\"init.mp4\"\n\
                #EXTINF:5.0,\n\
                segment1.ts\n\
                #EXTINF:5.0,\n\
                https://cdn.googlevideo.com/seg2.ts?a=b\n\
                #EXT-X-STREAM-INF:BANDWIDTH=1280000\n\
                low/index.m3u8\n";

    let rewritten = rewrite_manifest(body, &base_url(), "/proxy").unwrap();

    let expected = "#EXTM3U\n\
                    #EXT-X-MAP:URI=\"/proxy/path/init.mp4?host=r.host\"\n\
                    #EXTINF:5.0,\n\
                    /proxy/path/segment1.ts?host=r.host\n\
                    #EXTINF:5.0,\n\
                    /proxy/seg2.ts?a=b&host=cdn.googlevideo.com\n\
                    #EXT-X-STREAM-INF:BANDWIDTH=1280000\n\
                    /proxy/path/low/index.m3u8?host=r.host\n";

    assert_eq!(rewritten, expected);
}

#[test]
fn test_crlf_line_endings_survive() {
    let rewritten = rewrite_manifest("#EXTM3U\r\nsegment1.ts\r\n", &base_url(), "").unwrap();

    assert_eq!(rewritten, "#EXTM3U\r\n/path/segment1.ts?host=r.host\r\n");
}

#[test]
fn test_plain_http_lines_are_left_alone() {
    let body = "http://r.host/path/video.mp4";

    assert_eq!(rewrite_manifest(body, &base_url(), "").unwrap(), body);
}

#[test]
fn test_key_uris_without_a_host_are_left_alone() {
    let body = "#EXTM3U\n\
                #EXT-X-SESSION-KEY:METHOD=SAMPLE-AES,URI=\"data:text/plain;base64,AAAA\"\n\
                #EXT-X-KEY:METHOD=SAMPLE-AES,URI=\"skd://key-id\"\n\
                seg.ts\n";

    let rewritten = rewrite_manifest(body, &base_url(), "").unwrap();

    let expected = "#EXTM3U\n\
                    #EXT-X-SESSION-KEY:METHOD=SAMPLE-AES,URI=\"data:text/plain;base64,AAAA\"\n\
                    #EXT-X-KEY:METHOD=SAMPLE-AES,URI=\"skd://key-id\"\n\
                    /path/seg.ts?host=r.host\n";

    assert_eq!(rewritten, expected);
}

#[test]
fn test_manifest_content_types() {
    assert!(is_manifest_content_type("application/x-mpegurl"));
    assert!(is_manifest_content_type("application/vnd.apple.mpegurl"));
    assert!(is_manifest_content_type("application/vnd.apple.mpegURL; charset=utf-8"));
    assert!(!is_manifest_content_type("video/mp2t"));
    assert!(!is_manifest_content_type(""));
}
