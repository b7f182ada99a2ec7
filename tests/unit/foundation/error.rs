use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        CoverError::rate_limited("x")
            .to_string()
            .contains("rate limited:")
    );
    assert!(
        CoverError::transient("x")
            .to_string()
            .contains("transient error:")
    );
    assert!(
        CoverError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(CoverError::render("x").to_string().contains("render error:"));
}

#[test]
fn only_rate_limited_is_throttling() {
    assert!(CoverError::rate_limited("slow down").is_rate_limited());
    assert!(!CoverError::transient("timeout").is_rate_limited());
    assert!(!CoverError::render("bad").is_rate_limited());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = CoverError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
    assert!(!err.is_rate_limited());
}
