//! 分類ラベルテーブル
//!
//! モデルバンドルに同梱される改行区切りのラベルファイルを読み込み、
//! クラスインデックスからラベル名を引けるようにします。
//! インデックスは分類器の出力位置と1対1で対応します。

/// ラベルテーブル
///
/// プロセス起動時に一度だけ読み込まれ、以降は変更されません。
/// ラベル数と分類器の出力幅が一致するかどうかの検証は行いません。
#[derive(Debug, Clone)]
pub struct LabelTable {
    labels: Vec<String>,
}

impl LabelTable {
    /// 改行区切りのテキストからラベルテーブルを生成
    ///
    /// 末尾の改行による空行は既知の成果物として取り除きます。
    /// CRLF形式のファイルも許容します。
    pub fn parse(text: &str) -> Self {
        let mut labels: Vec<String> = text
            .split('\n')
            .map(|line| line.trim_end_matches('\r').to_string())
            .collect();

        // 最終行の改行が生む空エントリを除去
        if labels.last().map(|l| l.is_empty()).unwrap_or(false) {
            labels.pop();
        }

        Self { labels }
    }

    /// クラスインデックスからラベルを取得
    ///
    /// 範囲外のインデックスはNoneを返します。呼び出し側では
    /// 現在の操作を中断する致命的エラーとして扱います。
    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(|l| l.as_str())
    }

    /// ラベル数を取得
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let table = LabelTable::parse("cat\ndog\nbird");
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(0), Some("cat"));
        assert_eq!(table.get(1), Some("dog"));
        assert_eq!(table.get(2), Some("bird"));
    }

    #[test]
    fn test_parse_trailing_newline() {
        // 末尾改行による空行は取り除かれる
        let table = LabelTable::parse("cat\ndog\n");
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1), Some("dog"));
    }

    #[test]
    fn test_parse_crlf() {
        let table = LabelTable::parse("cat\r\ndog\r\n");
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0), Some("cat"));
    }

    #[test]
    fn test_lookup_verbatim() {
        // ラベルは一切加工せずそのまま返す
        let table = LabelTable::parse("tabby, tabby cat\ngreat white shark");
        assert_eq!(table.get(0), Some("tabby, tabby cat"));
        assert_eq!(table.get(1), Some("great white shark"));
    }

    #[test]
    fn test_lookup_out_of_range() {
        let table = LabelTable::parse("cat\ndog");
        assert_eq!(table.get(2), None);
        assert_eq!(table.get(1000), None);
    }

    #[test]
    fn test_empty_input() {
        let table = LabelTable::parse("");
        assert!(table.is_empty());
        assert_eq!(table.get(0), None);
    }
}
