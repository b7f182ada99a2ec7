use super::*;

fn frame(px: [u8; 4]) -> CoverFrame {
    CoverFrame {
        width: 2,
        height: 1,
        data: px.repeat(2),
    }
}

#[test]
fn unpremultiplies_partial_alpha() {
    let img = frame([100, 50, 0, 128]).to_rgba_image().unwrap();
    let [r, g, b, a] = img.get_pixel(0, 0).0;
    assert_eq!(a, 128);
    assert!((i32::from(r) - 199).abs() <= 1);
    assert!((i32::from(g) - 100).abs() <= 1);
    assert_eq!(b, 0);
}

#[test]
fn png_encoding_decodes_back_to_same_size() {
    let encoded = frame([10, 20, 30, 255]).encode(OutputFormat::Png).unwrap();
    assert_eq!(encoded.format, OutputFormat::Png);
    let decoded = image::load_from_memory(&encoded.bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (2, 1));
}

#[test]
fn jpeg_encoding_produces_jpeg_magic() {
    let encoded = frame([10, 20, 30, 255]).encode(OutputFormat::Jpeg).unwrap();
    assert_eq!(&encoded.bytes[..2], &[0xFF, 0xD8]);
    assert_eq!(OutputFormat::Jpeg.extension(), "jpg");
    assert_eq!(OutputFormat::Png.extension(), "png");
}

#[test]
fn mismatched_length_is_a_render_error() {
    let bad = CoverFrame {
        width: 3,
        height: 3,
        data: vec![0; 4],
    };
    assert!(matches!(bad.to_rgba_image(), Err(CoverError::Render(_))));
}
