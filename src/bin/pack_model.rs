//! モデルバンドル作成用バイナリ
//!
//! 学習済みTFLiteモデルとラベルファイルから、アプリが読み込む
//! tar.gz形式のモデルバンドルを作成します。

use photo_classifier_lib::classifier::{INPUT_SIZE, NUM_CLASSES};
use photo_classifier_lib::model::{save_model_bundle, LabelTable, ModelMetadata};
use std::path::PathBuf;

fn main() {
    println!("=== モデルバンドル作成 ===\n");

    // コマンドライン引数を取得
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        eprintln!(
            "使い方: pack_model <model.tflite> <labels.txt> <出力先.tar.gz> [モデル名]"
        );
        std::process::exit(1);
    }

    let model_path = PathBuf::from(&args[1]);
    let labels_path = PathBuf::from(&args[2]);
    let output_path = PathBuf::from(&args[3]);
    let model_name = match args.get(4) {
        Some(name) => name.clone(),
        None => model_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("model")
            .to_string(),
    };

    let model_binary = match std::fs::read(&model_path) {
        Ok(binary) => binary,
        Err(e) => {
            eprintln!("✗ モデルの読み込みエラー: {} ({})", e, model_path.display());
            std::process::exit(1);
        }
    };
    println!("✓ モデル読み込み: {} ({}バイト)", model_path.display(), model_binary.len());

    let labels_text = match std::fs::read_to_string(&labels_path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("✗ ラベルの読み込みエラー: {} ({})", e, labels_path.display());
            std::process::exit(1);
        }
    };
    let label_count = LabelTable::parse(&labels_text).len();
    println!("✓ ラベル読み込み: {} ({}件)", labels_path.display(), label_count);

    if label_count != NUM_CLASSES {
        eprintln!(
            "警告: ラベル数 {} が分類器の出力幅 {} と一致しません",
            label_count, NUM_CLASSES
        );
    }

    let metadata = ModelMetadata::new(model_name, INPUT_SIZE, NUM_CLASSES as u32, true);

    match save_model_bundle(&output_path, &metadata, &model_binary, &labels_text) {
        Ok(()) => {
            println!("\n✓ バンドルを作成しました: {}", output_path.display());
            println!("  モデル名: {}", metadata.model_name);
            println!("  入力サイズ: {}x{}", metadata.input_size, metadata.input_size);
            println!("  クラス数: {}", metadata.num_classes);
        }
        Err(e) => {
            eprintln!("✗ バンドル作成エラー: {}", e);
            std::process::exit(1);
        }
    }
}
