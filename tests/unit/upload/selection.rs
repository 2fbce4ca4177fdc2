use std::path::PathBuf;

use super::*;

fn png(color: [u8; 4]) -> Vec<u8> {
    Photo::solid(2, 2, color).unwrap().encode_png().unwrap()
}

fn write_files(name: &str, count: u8) -> Vec<PathBuf> {
    let dir = PathBuf::from("target").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    (0..count)
        .map(|i| {
            let p = dir.join(format!("p{i}.png"));
            std::fs::write(&p, png([i * 40, 0, 0, 255])).unwrap();
            p
        })
        .collect()
}

#[test]
fn five_files_keep_only_first_three() {
    let files = write_files("unit_upload_five", 5);
    let mut sel = UploadSelection::new();
    assert_eq!(sel.add_files(&files).unwrap(), 3);

    let photos = sel.finish().unwrap();
    let reds: Vec<u8> = photos.iter().map(|p| p.pixel(0, 0).unwrap()[0]).collect();
    assert_eq!(reds, [0, 40, 80]);
}

#[test]
fn two_files_block_until_a_third_is_added() {
    let files = write_files("unit_upload_two", 3);
    let mut sel = UploadSelection::new();
    sel.add_files(&files[..2]).unwrap();

    let err = sel.finish().unwrap_err();
    assert!(matches!(err, BoothError::IncompleteSelection(_)));
    assert!(err.to_string().contains("exactly 3"));
    assert_eq!(sel.len(), 2);

    assert_eq!(sel.add_files(&files[2..]).unwrap(), 1);
    assert_eq!(sel.finish().unwrap().len(), 3);
}

#[test]
fn full_selection_ignores_further_files() {
    let mut sel = UploadSelection::new();
    sel.add_bytes(&[png([1, 0, 0, 255]), png([2, 0, 0, 255]), png([3, 0, 0, 255])])
        .unwrap();
    assert_eq!(sel.add_bytes(&[png([4, 0, 0, 255])]).unwrap(), 0);
    assert!(!sel.add_photo(Photo::solid(1, 1, [0, 0, 0, 255]).unwrap()));
    assert_eq!(sel.remaining(), 0);
}

#[test]
fn remove_frees_a_slot() {
    let mut sel = UploadSelection::new();
    sel.add_bytes(&[png([1, 0, 0, 255]), png([2, 0, 0, 255]), png([3, 0, 0, 255])])
        .unwrap();
    let removed = sel.remove(1).unwrap();
    assert_eq!(removed.pixel(0, 0).unwrap()[0], 2);
    assert!(sel.remove(5).is_none());
    assert!(sel.finish().is_err());

    sel.add_bytes(&[png([9, 0, 0, 255])]).unwrap();
    let reds: Vec<u8> = sel
        .finish()
        .unwrap()
        .iter()
        .map(|p| p.pixel(0, 0).unwrap()[0])
        .collect();
    assert_eq!(reds, [1, 3, 9]);
}

#[test]
fn undecodable_bytes_add_nothing() {
    let mut sel = UploadSelection::new();
    let err = sel
        .add_bytes(&[png([1, 0, 0, 255]), b"not an image".to_vec()])
        .unwrap_err();
    assert!(matches!(err, BoothError::Validation(_)));
    assert!(sel.is_empty());
}

#[test]
fn missing_file_is_reported_with_its_path() {
    let mut sel = UploadSelection::new();
    let err = sel
        .add_files(&["target/unit_upload_missing/nope.png"])
        .unwrap_err();
    assert!(err.to_string().contains("nope.png"));
    assert!(sel.is_empty());
}
