//! カメラキャプチャ機能
//!
//! GStreamerの既定ビデオソースから1フレームを取得して画像ファイルに
//! 保存します。カメラの有無は起動時に一度だけ確認し、利用できない
//! 場合でもギャラリー選択の動作には影響しません。

use anyhow::Result;
use std::path::{Path, PathBuf};

#[cfg(feature = "camera")]
use anyhow::Context;
#[cfg(feature = "camera")]
use gstreamer as gst;
#[cfg(feature = "camera")]
use gstreamer::prelude::*;
#[cfg(feature = "camera")]
use gstreamer_app as gst_app;

/// 撮影画像の保存先ファイルを作成
///
/// 指定ディレクトリに一意な名前の画像ファイルパスを生成します。
/// 撮影後のファイルのライフサイクルは管理しません（削除しない）。
pub fn create_capture_file(pictures_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(pictures_dir)?;

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let filename = format!("capture_{}_{}.png", timestamp, rand::random::<u32>());

    Ok(pictures_dir.join(filename))
}

/// カメラが利用可能かチェック
///
/// GStreamerの初期化と既定ビデオソースのパイプライン構築を試みます。
/// 起動時に一度だけ呼び出される想定です。
#[cfg(feature = "camera")]
pub fn probe_camera() -> bool {
    if let Err(e) = gst::init() {
        eprintln!("警告: GStreamerが利用できません: {}", e);
        return false;
    }

    let pipeline = match gst::parse::launch("autovideosrc ! fakesink") {
        Ok(p) => p,
        Err(e) => {
            eprintln!("警告: カメラパイプラインを構築できません: {}", e);
            return false;
        }
    };

    // Paused遷移が成功すればソースはオープン可能
    let available = pipeline.set_state(gst::State::Paused).is_ok();
    pipeline.set_state(gst::State::Null).ok();

    if !available {
        eprintln!("警告: カメラデバイスを開けません");
    }

    available
}

/// カメラから1フレームを撮影してファイルに保存
#[cfg(feature = "camera")]
pub fn capture_to_file(output_path: &Path) -> Result<()> {
    use gstreamer_video as gst_video;
    use image::{ImageBuffer, Rgb};

    gst::init().context("GStreamer初期化失敗")?;

    // 既定ビデオソースからRGBフレームを受け取るパイプライン
    let pipeline = gst::parse::launch(
        "autovideosrc ! videoconvert ! video/x-raw,format=RGB ! appsink name=sink",
    )
    .context("パイプライン構築失敗")?;
    let pipeline = pipeline
        .dynamic_cast::<gst::Pipeline>()
        .map_err(|_| anyhow::anyhow!("Pipeline型への変換失敗"))?;

    let appsink = pipeline
        .by_name("sink")
        .ok_or_else(|| anyhow::anyhow!("AppSinkが見つかりません"))?
        .dynamic_cast::<gst_app::AppSink>()
        .map_err(|_| anyhow::anyhow!("AppSink型への変換失敗"))?;

    pipeline
        .set_state(gst::State::Playing)
        .map_err(|e| anyhow::anyhow!("パイプライン開始失敗: {:?}", e))?;

    // 先頭フレームを1枚だけ取得
    let result = (|| -> Result<()> {
        let sample = appsink
            .pull_sample()
            .map_err(|_| anyhow::anyhow!("フレーム取得失敗"))?;

        let buffer = sample
            .buffer()
            .ok_or_else(|| anyhow::anyhow!("バッファ取得失敗"))?;
        let caps = sample
            .caps()
            .ok_or_else(|| anyhow::anyhow!("Caps取得失敗"))?;

        let video_info = gst_video::VideoInfo::from_caps(caps)
            .map_err(|e| anyhow::anyhow!("VideoInfo取得失敗: {:?}", e))?;

        let width = video_info.width();
        let height = video_info.height();

        let map = buffer
            .map_readable()
            .map_err(|_| anyhow::anyhow!("バッファマップ失敗"))?;
        let data = map.as_slice();

        let mut frame = ImageBuffer::<Rgb<u8>, Vec<u8>>::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let src_idx = ((y * width + x) * 3) as usize;
                if src_idx + 2 < data.len() {
                    frame.put_pixel(x, y, Rgb([data[src_idx], data[src_idx + 1], data[src_idx + 2]]));
                }
            }
        }

        frame
            .save(output_path)
            .map_err(|e| anyhow::anyhow!("撮影画像の保存失敗: {}", e))?;

        Ok(())
    })();

    // 成功・失敗を問わずパイプラインを解放する
    pipeline
        .set_state(gst::State::Null)
        .map_err(|e| anyhow::anyhow!("パイプライン停止失敗: {:?}", e))?;

    result
}

// featureが無効な場合のダミー実装
#[cfg(not(feature = "camera"))]
pub fn probe_camera() -> bool {
    false
}

#[cfg(not(feature = "camera"))]
pub fn capture_to_file(_output_path: &Path) -> Result<()> {
    Err(anyhow::anyhow!("カメラ機能が有効化されていません"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_capture_file_unique_names() {
        let dir = std::env::temp_dir().join("photo_classifier_test_captures");
        let a = create_capture_file(&dir).unwrap();
        let b = create_capture_file(&dir).unwrap();

        assert_ne!(a, b);
        assert!(a.starts_with(&dir));
        assert_eq!(a.extension().and_then(|e| e.to_str()), Some("png"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[cfg(not(feature = "camera"))]
    #[test]
    fn test_capture_disabled_without_feature() {
        assert!(!probe_camera());
        assert!(capture_to_file(Path::new("/tmp/never_written.png")).is_err());
    }
}
