//! モデル推論機能
//!
//! 同梱の学習済みTFLiteモデルをブラックボックスとして実行します。
//! テンソルを渡してスコアのバッファを受け取るだけで、ネットワーク
//! 自体の再実装は行いません。

use anyhow::{Context, Result};
use std::io::Cursor;
use tract_tflite::prelude::*;

use crate::classifier::preprocess::{CHANNELS, INPUT_SIZE};

/// 分類クラス数（出力テンソルの幅）
pub const NUM_CLASSES: usize = 1001;

/// 推論エンジン
///
/// 予測のたびに生成し、スコープを抜けた時点で解放します。
/// リトライは行わず、推論の失敗は現在の予測の失敗になります。
pub struct ClassifierEngine {
    plan: TypedRunnableModel<TypedModel>,
}

impl ClassifierEngine {
    /// モデルバイナリ（TFLite flatbuffer）から推論エンジンを初期化
    pub fn from_bytes(model_binary: &[u8]) -> Result<Self> {
        let mut reader = Cursor::new(model_binary);

        let model = tract_tflite::tflite()
            .model_for_read(&mut reader)
            .context("TFLiteモデルの解析に失敗しました")?;

        let plan = model
            .into_optimized()
            .context("モデルの最適化に失敗しました")?
            .into_runnable()
            .context("実行プランの構築に失敗しました")?;

        Ok(Self { plan })
    }

    /// 入力テンソルを与えて推論を実行
    ///
    /// # 引数
    /// - `input`: 前処理済みの224x224x3 uint8バイト列（行優先HWC）
    ///
    /// # 戻り値
    /// - クラスごとのスコア（NUM_CLASSES個のf32）
    pub fn run(&self, input: &[u8]) -> Result<Vec<f32>> {
        let tensor = Tensor::from_shape(
            &[1, INPUT_SIZE as usize, INPUT_SIZE as usize, CHANNELS],
            input,
        )
        .context("入力テンソルの構築に失敗しました")?;

        let outputs = self
            .plan
            .run(tvec!(tensor.into_tvalue()))
            .context("推論の実行に失敗しました")?;

        // 量子化モデルの出力はuint8のまま返るため、f32へキャストする
        let cast = outputs[0]
            .cast_to::<f32>()
            .context("出力テンソルの変換に失敗しました")?;
        let scores = cast
            .as_slice::<f32>()
            .context("出力バッファの取得に失敗しました")?
            .to_vec();

        Ok(scores)
    }
}

/// スコアが最大のクラスインデックスを返す
///
/// 走査範囲は常に0..NUM_CLASSESで固定。入力は必ずNUM_CLASSES要素
/// あることが契約であり、短いバッファはここで範囲外panicになる。
///
/// 暫定最大値は0.0で初期化し、厳密に大きい値が見つかった場合のみ
/// 更新する（同値なら先に現れたインデックスが勝つ）。このため全要素が
/// 非正の場合は常にインデックス0を返す。既知の仕様であり、
/// 「予測なし」を意味するものではない。
pub fn argmax(scores: &[f32]) -> usize {
    let mut index = 0;
    let mut maximum = 0.0f32;
    for i in 0..NUM_CLASSES {
        if scores[i] > maximum {
            index = i;
            maximum = scores[i];
        }
    }
    index
}
