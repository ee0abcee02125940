//! 写真取り込み
//!
//! 画像形式と5MiB上限を確認してから `Photo` にする。
//! ここを通った写真だけがレコードに入る。

use crate::error::{ChecklistError, Result};
use device_checklist_common::{InspectionRecord, Photo, PHOTO_SLOTS};
use std::path::Path;

/// 添付写真の上限サイズ
pub const MAX_PHOTO_BYTES: u64 = 5 * 1024 * 1024;

/// バイト列から写真を作成（形式・サイズ検査付き）
pub fn photo_from_bytes(name: &str, data: Vec<u8>) -> Result<Photo> {
    let size = data.len() as u64;
    if size > MAX_PHOTO_BYTES {
        return Err(ChecklistError::ImageTooLarge {
            name: name.to_string(),
            size,
        });
    }

    let format = image::guess_format(&data)
        .map_err(|_| ChecklistError::InvalidImage(name.to_string()))?;
    let media_type = format.to_mime_type();
    if !media_type.starts_with("image/") {
        return Err(ChecklistError::InvalidImage(name.to_string()));
    }

    Ok(Photo::new(name, media_type, data))
}

/// ファイルから写真を読み込む
pub fn load_photo(path: &Path) -> Result<Photo> {
    if !path.is_file() {
        return Err(ChecklistError::FileNotFound(path.display().to_string()));
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    // 読み込み前にサイズで弾く
    let size = std::fs::metadata(path)?.len();
    if size > MAX_PHOTO_BYTES {
        return Err(ChecklistError::ImageTooLarge { name, size });
    }

    let data = std::fs::read(path)?;
    let photo = photo_from_bytes(&name, data)?;
    tracing::debug!(name = %photo.name, media_type = %photo.media_type, "photo accepted");
    Ok(photo)
}

/// 写真をスロットに添付（スロット番号は1始まり）
pub fn attach_photo(record: &mut InspectionRecord, slot_number: usize, path: &Path) -> Result<()> {
    if slot_number == 0 || slot_number > PHOTO_SLOTS {
        return Err(device_checklist_common::Error::PhotoSlot(slot_number).into());
    }
    let photo = load_photo(path)?;
    record.set_photo(slot_number - 1, Some(photo))?;
    Ok(())
}

/// レコードJSONの読み込み
pub fn load_record(path: &Path) -> Result<InspectionRecord> {
    if !path.is_file() {
        return Err(ChecklistError::FileNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    Ok(InspectionRecord::from_json(&content)?)
}

/// レコードJSONの保存
pub fn save_record(record: &InspectionRecord, path: &Path) -> Result<()> {
    let json = record.to_json()?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(4, 4, image::Rgb([200, 10, 10]));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn test_photo_from_png() {
        let photo = photo_from_bytes("foto.png", png_bytes()).unwrap();
        assert_eq!(photo.media_type, "image/png");
        assert_eq!(photo.name, "foto.png");
    }

    #[test]
    fn test_reject_non_image() {
        let result = photo_from_bytes("notas.txt", b"hello world".to_vec());
        assert!(matches!(result, Err(ChecklistError::InvalidImage(_))));
    }

    #[test]
    fn test_reject_too_large() {
        let mut data = png_bytes();
        data.resize((MAX_PHOTO_BYTES + 1) as usize, 0);
        let result = photo_from_bytes("grande.png", data);
        assert!(matches!(result, Err(ChecklistError::ImageTooLarge { .. })));
    }

    #[test]
    fn test_exactly_max_size_accepted() {
        let mut data = png_bytes();
        data.resize(MAX_PHOTO_BYTES as usize, 0);
        assert!(photo_from_bytes("limite.png", data).is_ok());
    }

    #[test]
    fn test_attach_photo_slot_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        std::fs::write(&path, png_bytes()).unwrap();

        let mut record = InspectionRecord::default();
        attach_photo(&mut record, 2, &path).unwrap();
        assert!(record.photos[1].is_some());

        assert!(attach_photo(&mut record, 0, &path).is_err());
        assert!(attach_photo(&mut record, 4, &path).is_err());
    }

    #[test]
    fn test_load_photo_missing_file() {
        let result = load_photo(Path::new("/nonexistent/foto.jpg"));
        assert!(matches!(result, Err(ChecklistError::FileNotFound(_))));
    }
}
