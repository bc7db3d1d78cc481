use std::fmt;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// 题目拉取错误
    Fetch(FetchError),
    /// 配置错误
    Config(ConfigError),
    /// 其他错误（用于包装第三方库错误）
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Fetch(e) => write!(f, "拉取错误: {}", e),
            AppError::Config(e) => write!(f, "配置错误: {}", e),
            AppError::Other(msg) => write!(f, "错误: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Fetch(e) => Some(e),
            AppError::Config(e) => Some(e),
            AppError::Other(_) => None,
        }
    }
}

/// 题目拉取错误
///
/// `Display` 输出即是面向用户的错误文案，展示层只依赖这一个字符串；
/// 频率限制类消息必须包含 "rate"/"retry"，以便界面做柔性提示
#[derive(Debug)]
pub enum FetchError {
    /// 网络请求未能完成
    Network {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// HTTP 状态码错误（非 2xx 且非 429）
    Http {
        status: u16,
    },
    /// 请求频率限制（HTTP 429），由控制器自动安排重试
    RateLimited,
    /// API 应用层错误（response_code != 0）
    Api {
        code: u32,
    },
    /// 响应内容解码失败
    Decode {
        detail: String,
    },
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Network { source } => {
                write!(f, "failed to fetch trivia data: {}", source)
            }
            FetchError::Http { status } => {
                write!(f, "failed to fetch questions (HTTP {})", status)
            }
            FetchError::RateLimited => {
                write!(f, "rate limited by the trivia API, retrying shortly")
            }
            FetchError::Api { code } => {
                write!(f, "the trivia API returned an error (response_code {})", code)
            }
            FetchError::Decode { detail } => {
                write!(f, "failed to decode trivia payload: {}", detail)
            }
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Network { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// 读取配置文件失败
    ReadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 解析配置文件失败
    ParseFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ReadFailed { path, source } => {
                write!(f, "读取配置文件失败 ({}): {}", path, source)
            }
            ConfigError::ParseFailed { path, source } => {
                write!(f, "解析配置文件失败 ({}): {}", path, source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ReadFailed { source, .. } | ConfigError::ParseFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
        }
    }
}

// ========== 从常见错误类型转换 ==========

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Network {
            source: Box::new(err),
        }
    }
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        AppError::Fetch(err)
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err)
    }
}

// ========== 便捷构造函数 ==========

impl FetchError {
    /// 创建 HTTP 状态码错误
    pub fn http(status: u16) -> Self {
        FetchError::Http { status }
    }

    /// 创建 API 应用层错误
    pub fn api(code: u32) -> Self {
        FetchError::Api { code }
    }

    /// 创建解码错误
    pub fn decode(detail: impl Into<String>) -> Self {
        FetchError::Decode {
            detail: detail.into(),
        }
    }
}

impl ConfigError {
    pub fn read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ConfigError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        }
    }

    pub fn parse_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ConfigError::ParseFailed {
            path: path.into(),
            source: Box::new(source),
        }
    }
}

/// 判断错误文案是否属于频率限制场景
///
/// 展示层据此在普通错误提示之外追加一条柔性说明
pub fn is_rate_limit_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("rate") || lower.contains("retry")
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_message_matches_soft_hint() {
        // 频率限制类消息必须能被展示层识别
        assert!(is_rate_limit_message(&FetchError::RateLimited.to_string()));
        assert!(is_rate_limit_message("Rate Limited"));
        assert!(!is_rate_limit_message(&FetchError::http(500).to_string()));
    }

    #[test]
    fn test_fetch_error_display() {
        assert_eq!(
            FetchError::http(503).to_string(),
            "failed to fetch questions (HTTP 503)"
        );
        assert_eq!(
            FetchError::api(2).to_string(),
            "the trivia API returned an error (response_code 2)"
        );
    }
}
