use std::path::PathBuf;

use super::*;

#[test]
fn builtin_covers_every_sticker_with_vector_art() {
    let lib = StickerLibrary::builtin().unwrap();
    for id in STICKER_IDS {
        let art = lib.get(&StickerId::new(id).unwrap()).unwrap();
        match art {
            StickerArt::Vector(tree) => {
                assert_eq!(tree.size().width(), 40.0);
                assert_eq!(tree.size().height(), 40.0);
            }
            StickerArt::Raster(_) => panic!("{id} should be vector"),
        }
    }
}

#[test]
fn directory_png_overrides_builtin() {
    let dir = PathBuf::from("target").join("unit_sticker_overrides");
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    let png = Photo::solid(5, 5, [0, 128, 0, 255])
        .unwrap()
        .encode_png()
        .unwrap();
    std::fs::write(dir.join("sticker2.png"), png).unwrap();

    let lib = StickerLibrary::with_overrides(&dir).unwrap();
    match lib.get(&StickerId::new("sticker2").unwrap()).unwrap() {
        StickerArt::Raster(p) => assert_eq!(p.width(), 5),
        StickerArt::Vector(_) => panic!("override not applied"),
    }
    assert!(matches!(
        lib.get(&StickerId::new("sticker1").unwrap()).unwrap(),
        StickerArt::Vector(_)
    ));
}

#[test]
fn broken_svg_override_is_an_error() {
    let dir = PathBuf::from("target").join("unit_sticker_broken");
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("sticker4.svg"), b"<svg").unwrap();
    let err = StickerLibrary::with_overrides(&dir).unwrap_err();
    assert!(err.to_string().contains("sticker4.svg"));
}

#[test]
fn missing_override_dir_is_config_error() {
    let err = StickerLibrary::with_overrides(Path::new("target/no-such-sticker-dir")).unwrap_err();
    assert!(matches!(err, BoothError::Config(_)));
}
