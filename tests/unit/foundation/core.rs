use super::*;

#[test]
fn hex_colors_parse_with_and_without_alpha() {
    assert_eq!(Rgba8::from_hex("#1e1e24").unwrap(), Rgba8::rgb(0x1e, 0x1e, 0x24));
    assert_eq!(
        Rgba8::from_hex("ffffff80").unwrap(),
        Rgba8 {
            r: 255,
            g: 255,
            b: 255,
            a: 128
        }
    );
    assert!(Rgba8::from_hex("#12345").is_err());
    assert!(Rgba8::from_hex("#zzzzzz").is_err());
}

#[test]
fn premultiplied_scales_color_by_alpha() {
    assert_eq!(Rgba8::rgb(10, 20, 30).premultiplied(), [10, 20, 30, 255]);
    let half = Rgba8 {
        r: 200,
        g: 100,
        b: 0,
        a: 128,
    };
    assert_eq!(half.premultiplied(), [100, 50, 0, 128]);
}

#[test]
fn canvas_rejects_oversized_and_empty_sizes() {
    assert_eq!(
        Canvas {
            width: 1590,
            height: 920
        }
        .as_u16()
        .unwrap(),
        (1590, 920)
    );
    assert!(
        Canvas {
            width: 70_000,
            height: 10
        }
        .as_u16()
        .is_err()
    );
    assert!(
        Canvas {
            width: 0,
            height: 10
        }
        .as_u16()
        .is_err()
    );
}

#[test]
fn colors_deserialize_from_hex_or_channels() {
    let hex: Rgba8 = serde_json::from_str(r##""#1e1e24""##).unwrap();
    assert_eq!(hex, Rgba8::rgb(0x1e, 0x1e, 0x24));

    let no_alpha: Rgba8 = serde_json::from_str(r#"{"r": 1, "g": 2, "b": 3}"#).unwrap();
    assert_eq!(no_alpha, Rgba8::rgb(1, 2, 3));

    let round_trip: Rgba8 =
        serde_json::from_str(&serde_json::to_string(&Rgba8::rgb(9, 8, 7)).unwrap()).unwrap();
    assert_eq!(round_trip, Rgba8::rgb(9, 8, 7));

    assert!(serde_json::from_str::<Rgba8>(r##""#12""##).is_err());
}
