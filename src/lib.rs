mod camera;
mod classify_commands;
mod types;

// 分類機能のモジュール
pub mod classifier;
pub mod model;

use model::LabelTable;
use types::{ImagePreview, UiState};

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tauri::{Manager, State};
use url::Url;

/// 既定のモデルバンドルファイル名
const MODEL_BUNDLE_NAME: &str = "mobilenet_v1_224_quant.tar.gz";

pub struct AppState {
    /// 現在の画像ハンドル（file:// URI）。取得前・キャンセル時はNone
    pub(crate) image_uri: Arc<Mutex<Option<Url>>>,
    /// 最後の予測ラベル（表示復元用、初期値は空白1文字）
    pub(crate) label: Arc<Mutex<String>>,
    /// 起動時に一度だけ確認したカメラの利用可否
    pub(crate) camera_available: bool,
    /// ラベルテーブル（起動時に一度だけ読み込み、以降不変）
    pub(crate) label_table: Option<LabelTable>,
    /// モデルバンドルのパス
    pub(crate) model_path: PathBuf,
}

/// プレビュー用のdata URLを生成
///
/// ウェブビューでの表示用に縮小してPNGエンコードする。表示専用であり
/// 推論入力には元画像をそのまま使用する。
fn encode_preview(img: &image::DynamicImage) -> Result<String, String> {
    use image::ImageEncoder;

    let preview = if img.width() > 640 || img.height() > 640 {
        img.thumbnail(640, 640)
    } else {
        img.clone()
    };
    let rgb = preview.to_rgb8();

    let mut png_data = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut png_data);
    encoder
        .write_image(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| format!("PNG エンコードに失敗: {}", e))?;

    let base64_data = base64::Engine::encode(&base64::engine::general_purpose::STANDARD, &png_data);

    Ok(format!("data:image/png;base64,{}", base64_data))
}

/// 画像を検証してハンドルとプレビューを作る共通処理
fn acquire_image(image_path: &Path, state: &AppState) -> Result<ImagePreview, String> {
    let img = image::open(image_path).map_err(|e| format!("画像を開けません: {}", e))?;

    let uri = Url::from_file_path(image_path)
        .map_err(|_| format!("URIへの変換に失敗しました: {:?}", image_path))?;

    let data_url = encode_preview(&img)?;

    // ハンドルはデコードに成功した場合のみ更新する
    *state.image_uri.lock().unwrap() = Some(uri.clone());

    Ok(ImagePreview {
        image_uri: uri.to_string(),
        data_url,
        width: img.width(),
        height: img.height(),
    })
}

// Tauri commands

/// ギャラリーから選択された画像を読み込む
///
/// ファイルピッカーはフロントエンド側（dialogプラグイン）で開き、
/// 選択されたパスがここに渡される。キャンセル時は呼ばれない。
#[tauri::command]
fn select_image(path: String, state: State<AppState>) -> Result<ImagePreview, String> {
    println!("[select_image] パス: {}", path);

    let image_path = PathBuf::from(&path);
    if !image_path.exists() {
        return Err(format!("ファイルが見つかりません: {:?}", image_path));
    }

    acquire_image(&image_path, &state)
}

/// カメラで撮影して画像を取り込む
///
/// ピクチャディレクトリに一意な名前の一時ファイルを作成し、カメラから
/// 1フレームを書き込んでからギャラリー選択と同じ経路で読み込む。
/// カメラが使えない場合はハンドルをNoneのままユーザーに通知する。
#[tauri::command]
fn capture_photo(app: tauri::AppHandle, state: State<AppState>) -> Result<ImagePreview, String> {
    let pictures_dir = app
        .path()
        .picture_dir()
        .unwrap_or_else(|_| std::env::temp_dir())
        .join("photo_classifier");

    capture_photo_to(&pictures_dir, &state)
}

/// 撮影処理の本体
fn capture_photo_to(pictures_dir: &Path, state: &AppState) -> Result<ImagePreview, String> {
    if !state.camera_available {
        eprintln!("[capture_photo] カメラが利用できません");
        return Err("Cannot access device camera".to_string());
    }

    let capture_path = camera::create_capture_file(pictures_dir)
        .map_err(|e| format!("撮影ファイルの作成エラー: {}", e))?;

    println!("[capture_photo] 保存先: {:?}", capture_path);

    if let Err(e) = camera::capture_to_file(&capture_path) {
        eprintln!("[capture_photo] 撮影失敗: {}", e);
        return Err("Cannot access device camera".to_string());
    }

    acquire_image(&capture_path, state)
}

/// 表示状態をクリア
///
/// 画像取得を開始する前にフロントエンドから呼ばれる。
#[tauri::command]
fn clear_display(state: State<AppState>) -> Result<(), String> {
    *state.image_uri.lock().unwrap() = None;
    *state.label.lock().unwrap() = " ".to_string();
    Ok(())
}

/// 現在のUI状態を取得
///
/// ウェブビューの再読み込み後に画像とラベルを復元するために使う。
/// プレビューは保存済みハンドルから再エンコードするだけで、
/// 推論は再実行しない。
#[tauri::command]
fn get_ui_state(state: State<AppState>) -> UiState {
    let uri = state.image_uri.lock().unwrap().clone();
    let label = state.label.lock().unwrap().clone();

    let image_data_url = uri.as_ref().and_then(|uri| {
        let path = uri.to_file_path().ok()?;
        match image::open(&path) {
            Ok(img) => encode_preview(&img).ok(),
            Err(e) => {
                eprintln!("警告: プレビューの復元に失敗しました: {}", e);
                None
            }
        }
    });

    UiState {
        image_uri: uri.map(|u| u.to_string()),
        image_data_url,
        label,
    }
}

/// カメラが利用可能か取得
///
/// 利用不可でもエラーにはせず、フロントエンドが撮影ボタンを
/// 無効化するだけに留める（ギャラリー選択は影響を受けない）。
#[tauri::command]
fn is_camera_available(state: State<AppState>) -> bool {
    state.camera_available
}

/// モデルバンドルのパスを解決
///
/// カレントディレクトリのmodels/を優先し、見つからなければ
/// 実行ファイル隣のmodels/を探す。
fn resolve_model_path() -> PathBuf {
    let default = PathBuf::from("models").join(MODEL_BUNDLE_NAME);
    if default.exists() {
        return default;
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let candidate = dir.join("models").join(MODEL_BUNDLE_NAME);
            if candidate.exists() {
                return candidate;
            }
        }
    }

    default
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    let model_path = resolve_model_path();
    println!("モデルバンドル: {}", model_path.display());

    // ラベルテーブルはプロセス起動時に一度だけ読み込む
    let label_table = match model::load_labels(&model_path) {
        Ok(text) => {
            let table = LabelTable::parse(&text);
            if table.is_empty() {
                eprintln!("警告: ラベルファイルが空です");
            }
            println!("ラベルを読み込みました: {}件", table.len());
            Some(table)
        }
        Err(e) => {
            eprintln!("警告: ラベルの読み込みに失敗しました: {}", e);
            None
        }
    };

    // カメラは起動時に一度だけ確認する。利用不可でも起動は継続し、
    // ギャラリー選択はそのまま使用できる
    let camera_available = camera::probe_camera();
    println!(
        "カメラ: {}",
        if camera_available {
            "利用可能"
        } else {
            "利用不可"
        }
    );

    let app_state = AppState {
        image_uri: Arc::new(Mutex::new(None)),
        label: Arc::new(Mutex::new(" ".to_string())),
        camera_available,
        label_table,
        model_path,
    };

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_fs::init())
        .manage(app_state)
        .invoke_handler(tauri::generate_handler![
            select_image,
            capture_photo,
            clear_display,
            get_ui_state,
            is_camera_available,
            // 分類関連のコマンド
            classify_commands::predict,
            classify_commands::get_model_info,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state(camera_available: bool) -> AppState {
        AppState {
            image_uri: Arc::new(Mutex::new(None)),
            label: Arc::new(Mutex::new(" ".to_string())),
            camera_available,
            label_table: None,
            model_path: PathBuf::from("nonexistent/model_bundle.tar.gz"),
        }
    }

    #[test]
    fn test_capture_with_camera_unavailable() {
        // カメラ利用不可は通知のみで、ハンドルはNoneのまま
        let state = test_state(false);
        let dir = std::env::temp_dir().join("photo_classifier_test_unavailable");

        let result = capture_photo_to(&dir, &state);
        assert_eq!(result.unwrap_err(), "Cannot access device camera");
        assert!(state.image_uri.lock().unwrap().is_none());
    }

    #[cfg(not(feature = "camera"))]
    #[test]
    fn test_capture_failure_leaves_handle_absent() {
        // 撮影自体の失敗も同じ通知に写像され、ハンドルは設定されない
        let state = test_state(true);
        let dir = std::env::temp_dir().join("photo_classifier_test_capture_fail");

        let result = capture_photo_to(&dir, &state);
        assert_eq!(result.unwrap_err(), "Cannot access device camera");
        assert!(state.image_uri.lock().unwrap().is_none());

        std::fs::remove_dir_all(&dir).ok();
    }
}
