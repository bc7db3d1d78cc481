//! # Trivia Question Stats
//!
//! 一个从 Open Trivia Database 拉取题目元数据并统计分布的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的三层架构：
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - 封装与题库 HTTP 接口的交互
//! - `TriviaClient` - 批量拉取题目，分类状态码，解码字段
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能算什么"，纯函数、无副作用
//! - `aggregation` - 筛选 / 分类分布 / 难度分布 / 视图推导
//!
//! ### ③ 编排层（Orchestration）
//! - `orchestrator/` - 拉取/重试控制器，唯一的状态持有者
//! - `App` - 管理重试定时器、拉取代数、状态快照与变更入口
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;

// 重新导出常用类型
pub use clients::TriviaClient;
pub use config::Config;
pub use error::{AppError, AppResult, ConfigError, FetchError};
pub use models::{
    display_category, ChartView, Difficulty, DistributionEntry, FilterSelection, Question,
    SummaryStats,
};
pub use orchestrator::{App, DashboardSnapshot, FetchOutcome};
pub use services::aggregation::{derive_view, DerivedView};
