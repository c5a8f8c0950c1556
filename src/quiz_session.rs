//! 対話式特徴クイズモジュール
//!
//! 状態は `QuizFlow` が保持し、ここでは選択肢の表示と操作の振り分けのみ行う。

use crate::catalog::Catalog;
use crate::error::{GuitarIdError, Result};
use crate::report::{format_matches, MATCH_DISPLAY_LIMIT};
use dialoguer::Select;
use guitar_id_common::{summarize_answers, QuizFlow};
use serde::Serialize;

/// 対話アクション
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizAction {
    /// n番目の特徴を選択
    Choose(usize),
    /// 前のカテゴリへ戻る
    Back,
    /// 最初からやり直す
    Reset,
    /// 終了
    Quit,
}

/// 選択肢の位置をアクションに変換
///
/// 並び: 特徴（option_count件）→ 戻る → やり直し → 終了
pub fn action_for(index: usize, option_count: usize) -> QuizAction {
    match index.checked_sub(option_count) {
        None => QuizAction::Choose(index),
        Some(0) => QuizAction::Back,
        Some(1) => QuizAction::Reset,
        Some(_) => QuizAction::Quit,
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QuizOutput<'a> {
    observations: Vec<guitar_id_common::FeatureObservation>,
    matches: Vec<guitar_id_common::MatchResult>,
    notes: &'a str,
}

/// 対話式でクイズを進める
pub fn run_interactive_quiz(catalog: &Catalog, json: bool) -> Result<()> {
    let mut flow = QuizFlow::new(
        &catalog.quiz_categories,
        &catalog.features,
        &catalog.associations,
    );

    if flow.categories().is_empty() {
        println!("⚠ 特徴データがありません。カタログフォルダを確認してください");
        return Ok(());
    }

    println!("🎸 特徴を選ぶたびに候補モデルを更新します\n");

    while !flow.is_complete() {
        let total = flow.categories().len();
        let label = flow
            .current_category()
            .map(|c| c.label.clone())
            .unwrap_or_default();
        let options = flow.options(&catalog.features);
        let current = flow.current_answer();

        let mut items: Vec<String> = options
            .iter()
            .map(|f| {
                if Some(f.id) == current {
                    format!("{} ✔", f.name)
                } else {
                    f.name.clone()
                }
            })
            .collect();
        items.push("← 戻る".to_string());
        items.push("↺ 最初から".to_string());
        items.push("終了".to_string());

        let default = current
            .and_then(|id| options.iter().position(|f| f.id == id))
            .unwrap_or(0);

        let selection = Select::new()
            .with_prompt(format!("[{}/{}] {}", flow.step() + 1, total, label))
            .items(&items)
            .default(default)
            .interact_opt()
            .map_err(|e| GuitarIdError::Prompt(e.to_string()))?;

        let action = match selection {
            Some(index) => action_for(index, options.len()),
            None => QuizAction::Quit,
        };

        match action {
            QuizAction::Choose(i) => {
                let feature = options[i];
                flow.answer(feature)?;
                flow.advance()?;
                print!("{}", format_matches(&flow.matches(&catalog.associations), catalog, 3));
                println!();
            }
            QuizAction::Back => {
                if !flow.back() {
                    println!("  → 最初のカテゴリです\n");
                }
            }
            QuizAction::Reset => {
                flow.reset();
                println!("  → すべての回答をリセットしました\n");
            }
            QuizAction::Quit => {
                println!("終了します...");
                break;
            }
        }
    }

    let matches = flow.matches(&catalog.associations);
    let notes = summarize_answers(&flow, &catalog.features);

    if json {
        let output = QuizOutput {
            observations: flow.observations(),
            matches,
            notes: &notes,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("\n📋 候補モデル:");
    print!("{}", format_matches(&matches, catalog, MATCH_DISPLAY_LIMIT));
    if !notes.is_empty() {
        println!("\n備考欄用テキスト:\n{}", notes);
    }
    Ok(())
}
