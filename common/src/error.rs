//! エラー型定義

use thiserror::Error;

/// 共通エラー型
///
/// 判定不能なシリアルや解読できないネックブロックはエラーではない。
/// ここに並ぶのは呼び出し側が対処すべき条件のみ。
#[derive(Error, Debug)]
pub enum Error {
    #[error("Serial number is missing")]
    MissingSerial,

    #[error("Quiz step is unanswered: {0}")]
    QuizUnanswered(String),

    #[error("Unknown feature for current category: {0}")]
    UnknownFeature(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
