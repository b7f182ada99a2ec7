use std::collections::HashMap;

use async_trait::async_trait;

use super::*;
use crate::{
    capability::DirectoryCandidate,
    foundation::error::{CoverError, CoverResult},
};

#[derive(Default)]
struct MapDirectory {
    entries: HashMap<String, Vec<DirectoryCandidate>>,
    failing: Vec<String>,
}

impl MapDirectory {
    fn with(mut self, name: &str, candidates: Vec<(&str, Option<&str>)>) -> Self {
        self.entries.insert(
            name.to_string(),
            candidates
                .into_iter()
                .map(|(n, a)| DirectoryCandidate {
                    name: n.to_string(),
                    avatar_url: a.map(str::to_string),
                })
                .collect(),
        );
        self
    }

    fn failing(mut self, name: &str) -> Self {
        self.failing.push(name.to_string());
        self
    }
}

#[async_trait]
impl DirectoryLookup for MapDirectory {
    async fn find_by_name(&self, name: &str) -> CoverResult<Vec<DirectoryCandidate>> {
        if self.failing.iter().any(|n| n == name) {
            return Err(CoverError::transient("directory unavailable"));
        }
        Ok(self.entries.get(name).cloned().unwrap_or_default())
    }
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn picks_first_candidate_with_avatar() {
    let dir = MapDirectory::default().with(
        "Alpha",
        vec![("Alpha (tribute)", None), ("Alpha", Some("alpha.png")), ("Alpha 2", Some("x.png"))],
    );
    let resolver = ArtistResolver::new(Arc::new(dir));
    let out = resolver.resolve(&names(&["Alpha"])).await;
    assert_eq!(out, vec![ArtistDisplay::with_avatar("Alpha", "alpha.png")]);
}

#[tokio::test]
async fn no_avatar_candidates_yield_bare_name() {
    let dir = MapDirectory::default().with("Beta", vec![("Beta", None)]);
    let resolver = ArtistResolver::new(Arc::new(dir));
    let out = resolver.resolve(&names(&["Beta", "Unknown"])).await;
    assert_eq!(
        out,
        vec![ArtistDisplay::bare("Beta"), ArtistDisplay::bare("Unknown")]
    );
}

#[tokio::test]
async fn one_failed_lookup_does_not_abort_the_batch() {
    let dir = MapDirectory::default()
        .with("A", vec![("A", Some("a.png"))])
        .with("C", vec![("C", Some("c.png"))])
        .failing("B");
    let resolver = ArtistResolver::new(Arc::new(dir));
    let out = resolver.resolve(&names(&["A", "B", "C"])).await;
    assert_eq!(
        out,
        vec![
            ArtistDisplay::with_avatar("A", "a.png"),
            ArtistDisplay::bare("B"),
            ArtistDisplay::with_avatar("C", "c.png"),
        ]
    );
}

#[tokio::test]
async fn empty_directory_name_keeps_requested_name() {
    let dir = MapDirectory::default().with("Gamma", vec![("  ", Some("g.png"))]);
    let resolver = ArtistResolver::new(Arc::new(dir));
    let out = resolver.resolve(&names(&["Gamma"])).await;
    assert_eq!(out, vec![ArtistDisplay::with_avatar("Gamma", "g.png")]);
}
