//! Open Trivia Database API 客户端
//!
//! 封装批量拉取题目的 HTTP 调用，负责状态码分类和字段解码

use crate::config::Config;
use crate::error::FetchError;
use crate::models::{Difficulty, Question};
use serde::Deserialize;
use tracing::debug;

/// 接口返回的原始题目记录（只保留本系统使用的字段，其余忽略）
#[derive(Debug, Deserialize)]
struct RawQuestion {
    category: String,
    difficulty: String,
}

/// 接口响应体
#[derive(Debug, Deserialize)]
struct TriviaResponse {
    response_code: u32,
    #[serde(default)]
    results: Vec<RawQuestion>,
}

/// 题库 API 客户端
pub struct TriviaClient {
    http: reqwest::Client,
    base_url: String,
    batch_size: usize,
}

impl TriviaClient {
    /// 创建新的题库客户端
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_base_url.clone(),
            batch_size: config.batch_size,
        })
    }

    /// 批量拉取题目
    ///
    /// 请求固定数量的题目，字符串字段使用 RFC 3986 百分号编码模式返回。
    /// 状态码映射：
    /// - HTTP 429 → `FetchError::RateLimited`（由控制器安排重试）
    /// - 其他非 2xx → `FetchError::Http`
    /// - `response_code != 0` → `FetchError::Api`
    pub async fn fetch_batch(&self) -> Result<Vec<Question>, FetchError> {
        let url = format!(
            "{}/api.php?amount={}&encode=url3986",
            self.base_url, self.batch_size
        );

        debug!("请求题目批次: {}", url);

        let response = self.http.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited);
        }

        if !response.status().is_success() {
            return Err(FetchError::http(response.status().as_u16()));
        }

        let body: TriviaResponse = response.json().await?;

        if body.response_code != 0 {
            return Err(FetchError::api(body.response_code));
        }

        let questions = body
            .results
            .into_iter()
            .map(decode_question)
            .collect::<Result<Vec<_>, _>>()?;

        debug!("成功解码 {} 个题目", questions.len());

        Ok(questions)
    }
}

// ========== 辅助函数 ==========

/// 解码单条原始记录
fn decode_question(raw: RawQuestion) -> Result<Question, FetchError> {
    let category = decode_field(&raw.category)?;
    let difficulty_name = decode_field(&raw.difficulty)?;

    let difficulty = Difficulty::parse(&difficulty_name)
        .map_err(|e| FetchError::decode(e.to_string()))?;

    Ok(Question {
        category,
        difficulty,
    })
}

/// 对接口字段做百分号解码
fn decode_field(raw: &str) -> Result<String, FetchError> {
    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| FetchError::decode(format!("invalid percent-encoding in '{}': {}", raw, e)))
}
