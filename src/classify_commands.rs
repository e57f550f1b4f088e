//! 画像分類のTauriコマンド

use tauri::State;

use crate::classifier::{argmax, pack_input_tensor, ClassifierEngine};
use crate::model;
use crate::types::{ModelInfoResponse, PredictionResponse};
use crate::AppState;

/// 現在の画像を分類して最上位ラベルを返す
///
/// 画像ハンドル → 前処理 → 推論 → argmax → ラベル参照の順に実行する。
/// 推論エンジンは呼び出しごとに生成し、スコープを抜けた時点で解放する。
/// 画像未選択のみ復帰可能なエラーとして通知し、それ以外の失敗は
/// 現在の予測の中断になる（リトライしない）。
#[tauri::command]
pub fn predict(state: State<AppState>) -> Result<PredictionResponse, String> {
    run_prediction(&state)
}

/// 予測処理の本体
pub(crate) fn run_prediction(state: &AppState) -> Result<PredictionResponse, String> {
    // 画像ハンドルの存在チェック（未選択はユーザー通知で復帰）
    let uri = state.image_uri.lock().unwrap().clone();
    let uri = match uri {
        Some(uri) => uri,
        None => return Err("No image provided".to_string()),
    };

    let image_path = uri
        .to_file_path()
        .map_err(|_| format!("URIをパスに変換できません: {}", uri))?;

    // デコード失敗（破損画像など）はそのまま操作の失敗として伝播
    let img = image::open(&image_path).map_err(|e| format!("画像を開けません: {}", e))?;

    // 224x224x3へ引き伸ばしてバイト列に詰める
    let input = pack_input_tensor(&img);

    // モデルは予測のたびに読み込み、ブロックを抜けた時点で解放される
    let scores = {
        let model_binary = model::load_model_binary(&state.model_path)
            .map_err(|e| format!("モデルの読み込みエラー: {}", e))?;
        let engine = ClassifierEngine::from_bytes(&model_binary)
            .map_err(|e| format!("推論エンジンの初期化エラー: {}", e))?;
        engine.run(&input).map_err(|e| format!("推論エラー: {}", e))?
    };

    // 最大スコアのインデックスをラベルに変換
    let class_index = argmax(&scores);
    let score = scores[class_index];

    let table = state
        .label_table
        .as_ref()
        .ok_or_else(|| "ラベルテーブルが読み込まれていません".to_string())?;
    let label = table
        .get(class_index)
        .ok_or_else(|| format!("クラスインデックス {} は範囲外です", class_index))?
        .to_string();

    // 表示用ラベルを保持（ウェブビュー再読み込み時の復元に使用）
    *state.label.lock().unwrap() = label.clone();

    println!(
        "[predict] class={} label={} score={:.4}",
        class_index, label, score
    );

    Ok(PredictionResponse {
        class_index,
        label,
        score,
    })
}

/// モデルバンドルのメタデータを取得
#[tauri::command]
pub fn get_model_info(state: State<AppState>) -> Result<ModelInfoResponse, String> {
    let metadata = model::load_metadata(&state.model_path)
        .map_err(|e| format!("メタデータ読み込みエラー: {}", e))?;

    let num_labels = state
        .label_table
        .as_ref()
        .map(|t| t.len())
        .unwrap_or(0);

    Ok(ModelInfoResponse {
        model_name: metadata.model_name,
        input_size: metadata.input_size,
        num_classes: metadata.num_classes,
        quantized: metadata.quantized,
        created_at: metadata.created_at,
        num_labels,
    })
}
