use serde::{Deserialize, Serialize};

/// UI表示状態
///
/// ウェブビューの再読み込み（構成変更相当）後に画像とラベルを
/// 復元するための状態。プロセス終了後には残らない。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiState {
    /// 現在の画像ハンドル（file:// URI）。未選択ならNone
    pub image_uri: Option<String>,

    /// プレビュー用のdata URL（再エンコードで復元、推論は再実行しない）
    #[serde(default)]
    pub image_data_url: Option<String>,

    /// 最後の予測ラベル（初期値は空白1文字）
    pub label: String,
}

/// 画像取得結果（ギャラリー選択・カメラ撮影の双方で使用）
#[derive(Debug, Clone, Serialize)]
pub struct ImagePreview {
    /// 画像ハンドル（file:// URI）
    pub image_uri: String,
    /// プレビュー用のdata URL（base64エンコードされたPNG）
    pub data_url: String,
    /// 元画像の幅
    pub width: u32,
    /// 元画像の高さ
    pub height: u32,
}

/// 予測結果
#[derive(Debug, Clone, Serialize)]
pub struct PredictionResponse {
    /// 選択されたクラスインデックス
    pub class_index: usize,
    /// ラベルテーブルから引いたラベル（そのまま表示する）
    pub label: String,
    /// 選択されたクラスのスコア
    pub score: f32,
}

/// モデル情報（メタデータ表示用）
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfoResponse {
    pub model_name: String,
    pub input_size: u32,
    pub num_classes: u32,
    pub quantized: bool,
    pub created_at: String,
    /// バンドル内のラベル数（出力幅との一致検証は行わない参考値）
    pub num_labels: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ui_state_serialize_deserialize() {
        let state = UiState {
            image_uri: Some("file:///tmp/capture_20250101_000000_1.png".to_string()),
            image_data_url: None,
            label: "cat".to_string(),
        };
        let json = serde_json::to_string(&state).unwrap();
        let restored: UiState = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.image_uri, state.image_uri);
        assert_eq!(restored.label, "cat");
    }

    #[test]
    fn test_ui_state_data_url_defaults_to_none() {
        let json = r#"{"image_uri": null, "label": " "}"#;
        let state: UiState = serde_json::from_str(json).unwrap();
        assert!(state.image_data_url.is_none());
        assert_eq!(state.label, " ");
    }
}
