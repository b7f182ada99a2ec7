use super::*;

#[test]
fn avatars_first_is_a_stable_partition() {
    let artists = vec![
        ArtistDisplay::bare("A"),
        ArtistDisplay::with_avatar("B", "b.png"),
        ArtistDisplay::bare("C"),
        ArtistDisplay::with_avatar("D", "d.png"),
    ];
    let names: Vec<&str> = avatars_first(&artists)
        .into_iter()
        .map(|a| a.name.as_str())
        .collect();
    assert_eq!(names, vec!["B", "D", "A", "C"]);
}

#[test]
fn avatars_first_keeps_order_when_all_equal() {
    let artists = vec![ArtistDisplay::bare("A"), ArtistDisplay::bare("B")];
    let names: Vec<&str> = avatars_first(&artists)
        .into_iter()
        .map(|a| a.name.as_str())
        .collect();
    assert_eq!(names, vec!["A", "B"]);
}

#[test]
fn request_copies_status_fields() {
    let mut status = StatusRecord::new("X", "Y");
    status.subtitle = Some("Live".to_string());
    status.album_art_url = Some("art.png".to_string());
    let req = CoverRequest::from_status(&status, vec![ArtistDisplay::bare("X")], Local::now());
    assert_eq!(req.title, "Y");
    assert_eq!(req.subtitle.as_deref(), Some("Live"));
    assert_eq!(req.album_art_url.as_deref(), Some("art.png"));
    assert_eq!(req.artists.len(), 1);
}

#[test]
fn image_urls_are_deduplicated() {
    let mut status = StatusRecord::new("X", "Y");
    status.album_art_url = Some("same.png".to_string());
    status.listener = Some(ListenerIdentity {
        display_name: "L".to_string(),
        avatar_url: Some("l.png".to_string()),
    });
    let req = CoverRequest::from_status(
        &status,
        vec![
            ArtistDisplay::with_avatar("A", "same.png"),
            ArtistDisplay::with_avatar("B", "b.png"),
            ArtistDisplay::bare("C"),
        ],
        Local::now(),
    );
    assert_eq!(req.image_urls(), vec!["same.png", "l.png", "b.png"]);
}
