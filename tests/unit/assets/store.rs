use std::{io::Cursor, sync::Mutex};

use async_trait::async_trait;

use super::*;
use crate::{
    foundation::error::{CoverError, CoverResult},
    model::cover::ArtistDisplay,
};

fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([10, 20, 30, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[derive(Default)]
struct ScriptedFetcher {
    calls: Mutex<Vec<String>>,
}

#[async_trait]
impl ImageFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> CoverResult<Vec<u8>> {
        self.calls.lock().unwrap().push(url.to_string());
        match url {
            "missing.png" => Err(CoverError::transient("404 Not Found")),
            "garbage.png" => Ok(b"not an image".to_vec()),
            _ => Ok(png_bytes(4, 3)),
        }
    }
}

fn request(artists: Vec<ArtistDisplay>, art: Option<&str>) -> CoverRequest {
    CoverRequest {
        title: "Y".to_string(),
        subtitle: None,
        listener: None,
        artists,
        album_art_url: art.map(str::to_string),
        stamped_at: chrono::Local::now(),
    }
}

#[tokio::test]
async fn failures_are_recorded_not_raised() {
    let req = request(
        vec![
            ArtistDisplay::with_avatar("A", "a.png"),
            ArtistDisplay::with_avatar("B", "missing.png"),
            ArtistDisplay::with_avatar("C", "garbage.png"),
        ],
        Some("art.png"),
    );
    let fetcher = ScriptedFetcher::default();
    let assets = PreparedCoverAssets::prepare(&req, &fetcher).await;

    assert_eq!(assets.len(), 2);
    assert!(assets.image("art.png").is_some());
    assert!(assets.image("a.png").is_some());
    assert!(assets.image("missing.png").is_none());
    assert!(assets.image("garbage.png").is_none());
    assert_eq!(assets.failed(), &["missing.png".to_string(), "garbage.png".to_string()]);
    assert_eq!(assets.image("a.png").unwrap().width, 4);
}

#[tokio::test]
async fn each_url_is_fetched_once() {
    let req = request(
        vec![
            ArtistDisplay::with_avatar("A", "shared.png"),
            ArtistDisplay::with_avatar("B", "shared.png"),
        ],
        Some("shared.png"),
    );
    let fetcher = ScriptedFetcher::default();
    let _ = PreparedCoverAssets::prepare(&req, &fetcher).await;
    assert_eq!(fetcher.calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn no_urls_means_no_fetches() {
    let req = request(vec![ArtistDisplay::bare("A")], None);
    let fetcher = ScriptedFetcher::default();
    let assets = PreparedCoverAssets::prepare(&req, &fetcher).await;
    assert!(assets.is_empty());
    assert!(fetcher.calls.lock().unwrap().is_empty());
    assert!(assets.image_opt(None).is_none());
}
