use std::cell::RefCell;

use super::*;

fn artifact() -> ExportArtifact {
    ExportArtifact {
        width: 2,
        height: 1,
        rgba8: vec![255, 0, 0, 255, 0, 0, 0, 0],
    }
}

struct Recording {
    available: bool,
    calls: RefCell<Vec<(String, usize, String)>>,
}

impl ShareTarget for Recording {
    fn name(&self) -> &str {
        "recording"
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn share(&self, file_name: &str, png: &[u8], title: &str) -> BoothResult<()> {
        self.calls
            .borrow_mut()
            .push((file_name.to_string(), png.len(), title.to_string()));
        Ok(())
    }
}

#[test]
fn download_writes_fixed_file_name() {
    let dir = PathBuf::from("target").join("unit_export_download");
    let _ = std::fs::remove_dir_all(&dir);
    let path = artifact().save_to_dir(&dir).unwrap();
    assert_eq!(path, dir.join("photostrip_high_quality.png"));

    let decoded = image::open(&path).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (2, 1));
    assert_eq!(decoded.get_pixel(0, 0).0, [255, 0, 0, 255]);
    assert_eq!(decoded.get_pixel(1, 0).0[3], 0);
}

#[test]
fn share_without_target_is_unsupported() {
    let err = share(&artifact(), None, "My Photostrip").unwrap_err();
    assert!(matches!(err, BoothError::UnsupportedCapability(_)));
}

#[test]
fn unavailable_target_is_not_called() {
    let target = Recording {
        available: false,
        calls: RefCell::new(Vec::new()),
    };
    let err = share(&artifact(), Some(&target), "t").unwrap_err();
    assert!(matches!(err, BoothError::UnsupportedCapability(_)));
    assert!(target.calls.borrow().is_empty());
}

#[test]
fn available_target_gets_png_and_title() {
    let target = Recording {
        available: true,
        calls: RefCell::new(Vec::new()),
    };
    share(&artifact(), Some(&target), "My Photostrip").unwrap();
    let calls = target.calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, ARTIFACT_FILE_NAME);
    assert!(calls[0].1 > 8);
    assert_eq!(calls[0].2, "My Photostrip");
}

#[test]
fn directory_target_writes_png_and_title() {
    let dir = PathBuf::from("target").join("unit_export_outbox");
    let _ = std::fs::remove_dir_all(&dir);
    let target = DirectoryShareTarget::new(&dir);
    assert!(target.is_available());
    share(&artifact(), Some(&target), "Hello").unwrap();
    assert!(dir.join(ARTIFACT_FILE_NAME).is_file());
    assert_eq!(
        std::fs::read_to_string(dir.join("photostrip_high_quality.txt")).unwrap(),
        "Hello"
    );
}

#[test]
fn missing_share_program_is_unavailable() {
    let target = CommandShareTarget::new("snapstrip-no-such-share-program");
    assert!(!target.is_available());
    let err = share(&artifact(), Some(&target), "t").unwrap_err();
    assert!(matches!(err, BoothError::UnsupportedCapability(_)));
}

#[test]
fn pixel_is_bounds_checked() {
    let a = artifact();
    assert_eq!(a.pixel(0, 0), Some([255, 0, 0, 255]));
    assert_eq!(a.pixel(2, 0), None);
    assert_eq!(a.file_name(), "photostrip_high_quality.png");
}
