//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层是整个系统唯一的状态持有者和调度中心。
//!
//! ### `dashboard` - 看板控制器
//! - 管理应用生命周期（初始化、运行、清理）
//! - 持有题目集、筛选条件、加载/错误状态、图表视图
//! - 管理频率限制的重试定时器（单槽位，可取消）
//! - 以拉取代数丢弃被取代的迟到结果
//! - 对外提供快照读取与变更方法
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::App (持有全部共享状态)
//!     ↓
//! services::aggregation (纯函数推导分布视图)
//!     ↓
//! clients::TriviaClient (HTTP 拉取题目)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一上下文**：共享状态只归 App 所有，下层不持有状态
//! 2. **纯函数推导**：视图在读取时整体重算，不做缓存
//! 3. **向下依赖**：编排层 → services → clients

pub mod dashboard;

// 重新导出主要类型
pub use dashboard::{App, DashboardSnapshot, FetchOutcome};
