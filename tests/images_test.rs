//! Image localization against mock image hosts.

use rs_ebook_clean::download::Downloader;
use rs_ebook_clean::images::ImageLocalizer;
use rs_ebook_clean::{dom, Options};
use tempfile::TempDir;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn localizer(options: &Options) -> ImageLocalizer {
    let downloader = Downloader::from_client(reqwest::Client::new()).with_concurrency(options.concurrency);
    ImageLocalizer::new(downloader, options)
}

async fn mount_image(server: &MockServer, at: &str, bytes: Vec<u8>, mime: &str) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_raw(bytes, mime))
        .mount(server)
        .await;
}

#[tokio::test]
async fn rewrites_sources_to_local_files() {
    let server = MockServer::start().await;
    mount_image(&server, "/blog/pic.png", vec![1_u8; 5000], "image/png").await;
    let dir = TempDir::new().unwrap();
    let page = format!("{}/blog/post.html", server.uri());

    let html = r#"<p>Intro</p><img src="pic.png" alt="A picture"><img src="pic.png">"#;
    let localized = localizer(&Options::default()).localize(html, Some(&page), dir.path()).await;

    assert_eq!(localized.images.len(), 1);
    let local = &localized.images[0];
    assert!(local.starts_with("images/"));
    assert!(local.ends_with(".png"));
    assert!(dir.path().join(local).exists());

    let doc = dom::parse(&localized.html);
    let imgs = doc.select("img");
    assert_eq!(imgs.length(), 2);
    for node in imgs.nodes() {
        let src = dom::Selection::from(*node).attr("src").map(|s| s.to_string());
        assert_eq!(src.as_deref(), Some(local.as_str()));
    }
}

#[tokio::test]
async fn drops_images_that_fail_or_have_unsupported_types() {
    let server = MockServer::start().await;
    mount_image(&server, "/ok.gif", b"GIF89a".to_vec(), "image/gif").await;
    mount_image(&server, "/photo.webp", b"RIFF".to_vec(), "image/webp").await;
    Mock::given(method("GET"))
        .and(path("/missing.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let base = server.uri();

    let html = format!(
        r#"<img src="{base}/ok.gif"><img src="{base}/photo.webp"><img src="{base}/missing.png"><img src="data:image/png;base64,AAAA"><img>"#
    );
    let localized = localizer(&Options::default()).localize(&html, None, dir.path()).await;

    let doc = dom::parse(&localized.html);
    assert_eq!(doc.select("img").length(), 1);
    assert_eq!(localized.images.len(), 1);
    assert!(localized.images[0].ends_with(".gif"));
}

#[tokio::test]
async fn strips_srcset_and_restores_small_stretched_images() {
    let server = MockServer::start().await;
    mount_image(&server, "/icon.png", vec![1_u8; 100], "image/png").await;
    mount_image(&server, "/hero.png", vec![1_u8; 5000], "image/png").await;
    let dir = TempDir::new().unwrap();
    let base = server.uri();

    let html = format!(
        r#"<img src="{base}/icon.png" srcset="{base}/icon@2x.png 2x" style="height: auto; width: 100%;"><img src="{base}/hero.png" style="height: auto; width: 100%;">"#
    );
    let localized = localizer(&Options::default()).localize(&html, None, dir.path()).await;

    let doc = dom::parse(&localized.html);
    assert!(doc.select("[srcset]").is_empty());

    let imgs: Vec<dom::Selection> = doc.select("img").nodes().iter().map(|n| dom::Selection::from(*n)).collect();
    assert_eq!(imgs.len(), 2);
    assert_eq!(imgs[0].attr("style").as_deref(), Some("height: auto;"));
    assert_eq!(imgs[1].attr("style").as_deref(), Some("height: auto; width: 100%;"));
}

#[tokio::test]
async fn processes_at_most_thirty_distinct_images() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/img/\d+\.png$"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![1_u8; 64], "image/png"))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let page = format!("{}/article/", server.uri());

    let html: String = (0..40).map(|i| format!(r#"<img src="/img/{i}.png">"#)).collect();
    let localized = localizer(&Options::default()).localize(&html, Some(&page), dir.path()).await;

    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 30);
    assert_eq!(localized.images.len(), 30);
    assert_eq!(dom::parse(&localized.html).select("img").length(), 30);
}

#[tokio::test]
async fn aggregate_cap_limits_localized_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/img/\d+\.png$"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![1_u8; 400], "image/png"))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let base = server.uri();
    let options = Options {
        max_image_size: 500,
        max_total_image_size: 1000,
        concurrency: 1,
        ..Options::default()
    };

    let html: String = (0..4).map(|i| format!(r#"<img src="{base}/img/{i}.png">"#)).collect();
    let localized = localizer(&options).localize(&html, None, dir.path()).await;

    assert_eq!(localized.images.len(), 2);
}
