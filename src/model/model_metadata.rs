//! モデルメタデータの定義と永続化
//!
//! tar.gz形式のモデルバンドルに含まれるメタデータを定義します。
//!
//! ## バンドルの構成
//! - metadata.json  - このメタデータ（JSON形式）
//! - model.tflite   - 学習済みモデル本体（TFLite flatbuffer）
//! - labels.txt     - 改行区切りのクラスラベル一覧

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// モデルメタデータ
///
/// 学習済みモデルの入出力仕様を記録します。参考情報であり、
/// 推論時にラベル数や出力幅との整合性検証には使用しません。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// モデル名
    /// 例: "mobilenet_v1_1.0_224_quant"
    pub model_name: String,

    /// モデル入力サイズ（正方形、通常224）
    pub input_size: u32,

    /// 分類クラス数（出力テンソルの幅、通常1001）
    pub num_classes: u32,

    /// 量子化済みモデルかどうか（uint8入力を受け付けるか）
    pub quantized: bool,

    /// バンドル作成時刻（ISO8601形式）
    pub created_at: String,
}

impl ModelMetadata {
    /// 新しいメタデータを作成
    pub fn new(model_name: String, input_size: u32, num_classes: u32, quantized: bool) -> Self {
        let created_at = chrono::Local::now().to_rfc3339();

        Self {
            model_name,
            input_size,
            num_classes,
            quantized,
            created_at,
        }
    }

    /// メタデータをJSON文字列に変換
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize metadata to JSON")
    }

    /// JSON文字列からメタデータを生成
    pub fn from_json_string(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to deserialize metadata from JSON")
    }
}
