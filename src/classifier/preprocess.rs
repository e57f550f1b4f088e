//! 画像の前処理
//!
//! 任意サイズの画像を分類器の入力テンソル（224x224x3、uint8）に変換します。

use image::imageops::FilterType;
use image::DynamicImage;

/// モデル入力サイズ（正方形）
pub const INPUT_SIZE: u32 = 224;

/// 入力チャネル数（RGB）
pub const CHANNELS: usize = 3;

/// 入力テンソルの総バイト数
pub const INPUT_LEN: usize = (INPUT_SIZE as usize) * (INPUT_SIZE as usize) * CHANNELS;

/// 画像をモデル入力用のバイト列に変換
///
/// アスペクト比は保持せず、224x224へ直接引き伸ばします。
/// 縮小にはバイリニア補間（Triangle）を使用し、最近傍法より
/// わずかに計算コストを払って分類精度を確保します。
///
/// # 引数
/// - `img`: デコード済み画像（サイズ任意）
///
/// # 戻り値
/// - 行優先 (H, W, C) で平坦化されたRGB8バイト列（常に150528バイト）
pub fn pack_input_tensor(img: &DynamicImage) -> Vec<u8> {
    let resized = image::imageops::resize(
        &img.to_rgb8(),
        INPUT_SIZE,
        INPUT_SIZE,
        FilterType::Triangle,
    );

    // RgbImageの内部バッファはそのまま行優先HWCレイアウト
    resized.into_raw()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn solid_image(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
        let img = ImageBuffer::<Rgb<u8>, Vec<u8>>::from_pixel(width, height, Rgb(color));
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_output_size_square_input() {
        let tensor = pack_input_tensor(&solid_image(224, 224, [0, 0, 0]));
        assert_eq!(tensor.len(), INPUT_LEN);
    }

    #[test]
    fn test_output_size_arbitrary_aspect_ratios() {
        // アスペクト比によらず常に224x224x3へ引き伸ばされる
        for (w, h) in [(1, 1), (640, 480), (480, 640), (1920, 1080), (3, 1000)] {
            let tensor = pack_input_tensor(&solid_image(w, h, [10, 20, 30]));
            assert_eq!(tensor.len(), INPUT_LEN, "input {}x{}", w, h);
        }
    }

    #[test]
    fn test_solid_color_preserved() {
        // 単色画像は引き伸ばし後も同じ画素値を保つ
        let tensor = pack_input_tensor(&solid_image(100, 50, [120, 200, 64]));
        for pixel in tensor.chunks(CHANNELS) {
            assert_eq!(pixel, &[120, 200, 64]);
        }
    }

    #[test]
    fn test_layout_is_hwc() {
        // 左半分が赤、右半分が青の画像で行優先HWCレイアウトを確認
        let img = ImageBuffer::<Rgb<u8>, Vec<u8>>::from_fn(200, 200, |x, _y| {
            if x < 100 {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 0, 255])
            }
        });
        let tensor = pack_input_tensor(&DynamicImage::ImageRgb8(img));

        // 先頭行の左端は赤、右端は青
        let left = &tensor[0..3];
        let right_offset = ((INPUT_SIZE as usize) - 1) * CHANNELS;
        let right = &tensor[right_offset..right_offset + 3];
        assert!(left[0] > 200 && left[2] < 50);
        assert!(right[2] > 200 && right[0] < 50);
    }
}
