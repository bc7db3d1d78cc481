use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 题目难度枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// 简单
    Easy,
    /// 中等
    Medium,
    /// 困难
    Hard,
}

/// 未知难度值
#[derive(Debug, Clone, Error)]
#[error("unknown difficulty value: {0}")]
pub struct UnknownDifficulty(pub String);

impl Difficulty {
    /// 获取接口使用的小写名称
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// 获取展示用名称（首字母大写）
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    /// 尝试从字符串解析难度（精确匹配）
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// 从接口字段解析难度，未知值视为解码失败
    pub fn parse(s: &str) -> Result<Self, UnknownDifficulty> {
        Self::from_str(s).ok_or_else(|| UnknownDifficulty(s.to_string()))
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 单条题目元数据
///
/// 分类字符串可能带有冒号分隔的命名空间前缀（如 "Entertainment: Film"），
/// 也可能包含 HTML 实体编码的标点，原样保存
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub category: String,
    pub difficulty: Difficulty,
}

/// 分类的展示用名称
///
/// 去掉 "Entertainment: " / "Science: " 命名空间前缀，
/// 并解码常见的 HTML 实体（`&quot;` 和 `&#039;`）
pub fn display_category(category: &str) -> String {
    let trimmed = category
        .strip_prefix("Entertainment: ")
        .or_else(|| category.strip_prefix("Science: "))
        .unwrap_or(category);

    trimmed.replace("&quot;", "\"").replace("&#039;", "'")
}
