//! モデルバンドルの永続化
//!
//! Tar.gz形式でモデル・ラベル・メタデータを1ファイルに統合して保存・読み込みします。
//!
//! ファイル構成（tar.gz内部）:
//! - metadata.json  - メタデータ（モデル名、入出力仕様など）
//! - model.tflite   - 学習済みモデル本体（TFLite flatbuffer）
//! - labels.txt     - 改行区切りのクラスラベル一覧

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use tar::{Archive, Builder};

use crate::model::model_metadata::ModelMetadata;

/// メタデータ・ラベルと共にモデルをTar.gz形式で保存
///
/// 1つのtar.gzファイルに以下を含む：
/// - metadata.json : メタデータ
/// - model.tflite : モデル本体
/// - labels.txt : ラベル一覧
pub fn save_model_bundle(
    output_path: &Path,
    metadata: &ModelMetadata,
    model_binary: &[u8],
    labels_text: &str,
) -> Result<()> {
    // output_pathがすでに.tar.gzで終わっている場合はそのまま、そうでなければ拡張子を追加
    let tar_gz_path = if output_path.extension().and_then(|s| s.to_str()) == Some("gz") {
        output_path.to_path_buf()
    } else {
        output_path.with_extension("tar.gz")
    };

    // 親ディレクトリが存在しない場合は作成
    if let Some(parent) = tar_gz_path.parent() {
        std::fs::create_dir_all(parent)
            .context(format!("Failed to create parent directory: {:?}", parent))?;
    }

    let tar_gz_file = File::create(&tar_gz_path)
        .context(format!("Failed to create tar.gz file: {:?}", tar_gz_path))?;

    // Gzip圧縮を設定
    let encoder = GzEncoder::new(tar_gz_file, Compression::default());
    let mut tar_builder = Builder::new(encoder);

    // メタデータをJSONとして追加
    let json_str = metadata.to_json_string()?;
    append_entry(&mut tar_builder, "metadata.json", json_str.as_bytes())
        .context("Failed to add metadata.json to tar")?;

    // モデルバイナリを追加
    append_entry(&mut tar_builder, "model.tflite", model_binary)
        .context("Failed to add model.tflite to tar")?;

    // ラベル一覧を追加
    append_entry(&mut tar_builder, "labels.txt", labels_text.as_bytes())
        .context("Failed to add labels.txt to tar")?;

    // tarアーカイブを完成させる
    tar_builder
        .finish()
        .context("Failed to finalize tar.gz archive")?;

    Ok(())
}

fn append_entry<W: std::io::Write>(
    builder: &mut Builder<W>,
    name: &str,
    data: &[u8],
) -> Result<()> {
    let mut header = tar::Header::new_gnu();
    header.set_path(name)?;
    header.set_size(data.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder.append(&header, data)?;
    Ok(())
}

/// Tar.gzから指定エントリをバイト列として読み込む
fn read_entry(tar_gz_path: &Path, name: &str) -> Result<Vec<u8>> {
    let tar_gz_file = File::open(tar_gz_path)
        .context(format!("Failed to open tar.gz file: {:?}", tar_gz_path))?;

    let decoder = GzDecoder::new(tar_gz_file);
    let mut archive = Archive::new(decoder);

    for entry in archive.entries()? {
        let mut entry = entry?;
        let path = entry.path()?;

        if path.to_str() == Some(name) {
            let mut buffer = Vec::new();
            entry.read_to_end(&mut buffer)?;
            return Ok(buffer);
        }
    }

    Err(anyhow::anyhow!("{} not found in tar.gz archive", name))
}

/// Tar.gzからモデルメタデータを読み込む
pub fn load_metadata(tar_gz_path: &Path) -> Result<ModelMetadata> {
    let buffer = read_entry(tar_gz_path, "metadata.json")?;
    let json_str = String::from_utf8(buffer).context("metadata.json is not valid UTF-8")?;
    ModelMetadata::from_json_string(&json_str)
}

/// Tar.gzからモデルバイナリを読み込む
pub fn load_model_binary(tar_gz_path: &Path) -> Result<Vec<u8>> {
    read_entry(tar_gz_path, "model.tflite")
}

/// Tar.gzからラベル一覧のテキストを読み込む
pub fn load_labels(tar_gz_path: &Path) -> Result<String> {
    let buffer = read_entry(tar_gz_path, "labels.txt")?;
    String::from_utf8(buffer).context("labels.txt is not valid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_bundle_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "photo_classifier_test_{}_{}.tar.gz",
            name,
            rand::random::<u32>()
        ))
    }

    #[test]
    fn test_bundle_roundtrip() {
        let path = temp_bundle_path("roundtrip");
        let metadata = ModelMetadata::new("test_model".to_string(), 224, 1001, true);
        let model_binary = vec![0xAAu8, 0xBB, 0xCC, 0xDD];
        let labels_text = "cat\ndog\n";

        save_model_bundle(&path, &metadata, &model_binary, labels_text).unwrap();

        let restored_metadata = load_metadata(&path).unwrap();
        assert_eq!(restored_metadata.model_name, "test_model");
        assert_eq!(restored_metadata.num_classes, 1001);

        let restored_binary = load_model_binary(&path).unwrap();
        assert_eq!(restored_binary, model_binary);

        let restored_labels = load_labels(&path).unwrap();
        assert_eq!(restored_labels, labels_text);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_missing_file() {
        let path = PathBuf::from("nonexistent/model_bundle.tar.gz");
        assert!(load_metadata(&path).is_err());
        assert!(load_model_binary(&path).is_err());
        assert!(load_labels(&path).is_err());
    }
}
