//! 一括判定モジュール
//!
//! テキストファイルの1行1シリアルを並列に判定する。
//! 判定は純粋関数なので、共有状態なしでそのまま並列化できる。

use crate::catalog::Catalog;
use crate::error::{GuitarIdError, Result};
use guitar_id_common::{lookup, AggregateResult};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::warn;

/// 1件分の判定結果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchEntry {
    /// 入力ファイルの行番号（1始まり）
    pub line: usize,
    pub serial: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<AggregateResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 入力ファイルの読み込み結果
#[derive(Debug, Clone, Default)]
pub struct BatchInput {
    pub serials: Vec<(usize, String)>,
    /// 空行として読み飛ばした行番号
    pub skipped_lines: Vec<usize>,
}

/// シリアル一覧を読み込み（空行は読み飛ばし）
pub fn read_serials(path: &Path) -> Result<BatchInput> {
    if !path.exists() {
        return Err(GuitarIdError::FileNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    Ok(parse_serial_lines(&content))
}

pub fn parse_serial_lines(content: &str) -> BatchInput {
    let mut input = BatchInput::default();
    for (i, line) in content.lines().enumerate() {
        let serial = line.trim();
        if serial.is_empty() {
            input.skipped_lines.push(i + 1);
        } else {
            input.serials.push((i + 1, serial.to_string()));
        }
    }
    input
}

/// rayonのスレッド数を設定（0 は既定値のまま）
pub fn configure_threads(threads: usize) {
    if threads == 0 {
        return;
    }
    if let Err(e) = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
    {
        warn!("スレッド数の設定に失敗: {}", e);
    }
}

/// 一括判定を実行（入力順を保持）
pub fn run_batch(
    serials: &[(usize, String)],
    neck_block: Option<&str>,
    catalog: &Catalog,
    show_progress: bool,
) -> Vec<BatchEntry> {
    let progress = if show_progress {
        let pb = ProgressBar::new(serials.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    } else {
        ProgressBar::hidden()
    };

    let entries: Vec<BatchEntry> = serials
        .par_iter()
        .map(|(line, serial)| {
            let outcome = lookup(
                serial,
                neck_block,
                &catalog.patterns,
                &catalog.approved_guitars,
            );
            progress.inc(1);
            match outcome {
                Ok(result) => BatchEntry {
                    line: *line,
                    serial: serial.clone(),
                    result: Some(result),
                    error: None,
                },
                Err(e) => BatchEntry {
                    line: *line,
                    serial: serial.clone(),
                    result: None,
                    error: Some(e.to_string()),
                },
            }
        })
        .collect();

    progress.finish_with_message("完了");
    entries
}

/// 判定結果をJSONで書き出す
///
/// 出力先ファイルがなければ `out` にJSON配列のみを書く（リダイレクトでそのまま保存できる）。
pub fn write_results<W: Write>(
    entries: &[BatchEntry],
    output: Option<&Path>,
    out: &mut W,
) -> Result<()> {
    let json = serde_json::to_string_pretty(entries)?;
    match output {
        Some(path) => std::fs::write(path, json)?,
        None => writeln!(out, "{}", json)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serial_lines() {
        let input = parse_serial_lines("E25115614\n\n  5152  \n   \nA12345");
        assert_eq!(
            input.serials,
            vec![
                (1, "E25115614".to_string()),
                (3, "5152".to_string()),
                (5, "A12345".to_string()),
            ]
        );
        assert_eq!(input.skipped_lines, vec![2, 4]);
    }

    #[test]
    fn test_run_batch_preserves_order() {
        let input = parse_serial_lines("E25115614\n5152\nXYZ");
        let entries = run_batch(&input.serials, None, &Catalog::default(), false);

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].serial, "E25115614");
        assert_eq!(
            entries[0].result.as_ref().and_then(|r| r.parse.estimated_year),
            Some(2025)
        );
        assert!(entries[1].result.as_ref().map(|r| r.parse.is_yairi).unwrap_or(false));
        assert_eq!(entries[2].line, 3);
        assert!(entries.iter().all(|e| e.error.is_none()));
    }

    #[test]
    fn test_write_results_stdout_is_pure_json() {
        let input = parse_serial_lines("E25115614\n\n5152");
        let entries = run_batch(&input.serials, None, &Catalog::default(), false);

        let mut out = Vec::new();
        write_results(&entries, None, &mut out).unwrap();

        let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        let array = parsed.as_array().unwrap();
        assert_eq!(array.len(), 2);
        assert_eq!(array[0]["serial"], "E25115614");
    }
}
