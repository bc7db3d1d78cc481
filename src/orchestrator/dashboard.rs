//! 看板控制器
//!
//! 单一持有上下文：题目集、筛选条件、加载/错误状态、图表视图、
//! 重试定时器与拉取代数全部归 `App` 所有，展示层只通过快照读取、
//! 通过变更方法写入

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::Result;
use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::clients::TriviaClient;
use crate::config::Config;
use crate::error::{is_rate_limit_message, AppError, AppResult, FetchError};
use crate::logger;
use crate::models::{display_category, ChartView, Difficulty, FilterSelection, Question};
use crate::services::aggregation;
use crate::services::aggregation::DerivedView;

/// 一次拉取调用的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// 成功加载（携带题目数量）
    Loaded(usize),
    /// 命中频率限制，已安排一次自动重试
    RetryScheduled,
    /// 结果已被更新的拉取取代，状态未改动
    Superseded,
}

/// 看板状态快照（供展示层只读消费）
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    /// 聚合推导出的分布视图
    pub view: DerivedView,
    /// 当前选中的分类（插入顺序）
    pub selected_categories: Vec<String>,
    /// 当前选中的难度（插入顺序）
    pub selected_difficulties: Vec<Difficulty>,
    /// 难度图表视图
    pub chart_view: ChartView,
    /// 是否正在加载（频率限制等待期间保持 true）
    pub loading: bool,
    /// 最近一次终态失败的文案，成功后清空
    pub error: Option<String>,
}

/// 看板共享状态
#[derive(Debug, Default)]
struct DashboardState {
    questions: Vec<Question>,
    selection: FilterSelection,
    chart_view: ChartView,
    loading: bool,
    error: Option<String>,
}

struct AppInner {
    config: Config,
    client: TriviaClient,
    state: Mutex<DashboardState>,
    /// 单槽位重试定时器：任意时刻最多一个未触发的重试
    retry_timer: Mutex<Option<JoinHandle<()>>>,
    /// 拉取代数，用于丢弃被取代的迟到结果
    generation: AtomicU64,
}

impl Drop for AppInner {
    fn drop(&mut self) {
        // 上下文销毁时取消未触发的重试定时器
        if let Ok(slot) = self.retry_timer.get_mut() {
            if let Some(handle) = slot.take() {
                handle.abort();
            }
        }
    }
}

/// 应用主结构（拉取/重试控制器 + 状态持有者）
#[derive(Clone)]
pub struct App {
    inner: Arc<AppInner>,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> Result<Self> {
        // 初始化日志文件
        logger::init_log_file(&config.output_log_file)?;

        let client = TriviaClient::new(&config)?;

        Ok(Self {
            inner: Arc::new(AppInner {
                config,
                client,
                state: Mutex::new(DashboardState {
                    loading: true,
                    ..Default::default()
                }),
                retry_timer: Mutex::new(None),
                generation: AtomicU64::new(0),
            }),
        })
    }

    /// 运行应用主逻辑：拉取一次并输出分布报告
    pub async fn run(&self) -> Result<()> {
        log_startup(&self.inner.config);

        match self.fetch_questions().await {
            Ok(FetchOutcome::Loaded(_)) => {}
            Ok(FetchOutcome::RetryScheduled) => {
                info!("⏳ 已安排自动重试，等待频率限制解除...");
            }
            Ok(FetchOutcome::Superseded) => {}
            Err(e) => warn!("❌ 拉取失败: {}", e),
        }

        // 重试路径在后台完成，轮询 loading 直到进入终态
        self.wait_until_loaded().await;
        self.render_report();

        Ok(())
    }

    // ========== 拉取/重试控制 ==========

    /// 拉取题目
    ///
    /// 重复调用总是安全的：每次调用取消未触发的重试定时器、
    /// 递增拉取代数，之前未完成的拉取即使迟到也不会再写入状态
    /// （后启动者胜出）
    pub async fn fetch_questions(&self) -> AppResult<FetchOutcome> {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;

        self.cancel_retry_timer();
        {
            let mut state = self.lock_state();
            state.loading = true;
            state.error = None;
        }

        self.attempt_fetch(generation).await
    }

    /// 执行一次拉取尝试
    ///
    /// 重试定时器触发时会以同一代数再次进入，返回 BoxFuture
    /// 以允许这种自引用的调度
    fn attempt_fetch(&self, generation: u64) -> BoxFuture<'static, AppResult<FetchOutcome>> {
        let app = self.clone();

        async move {
            let result = app.inner.client.fetch_batch().await;

            // 等待网络期间启动了新的拉取，这份结果直接丢弃
            if app.current_generation() != generation {
                debug!("忽略已被取代的拉取结果 (第 {} 代)", generation);
                return Ok(FetchOutcome::Superseded);
            }

            match result {
                Ok(questions) => {
                    let count = app.complete_fetch(questions);
                    Ok(FetchOutcome::Loaded(count))
                }
                Err(FetchError::RateLimited) => {
                    warn!(
                        "⚠️ 命中频率限制 (HTTP 429)，{} 秒后自动重试",
                        app.inner.config.retry_delay().as_secs()
                    );
                    // loading/error 保持不变，停留在加载中直到重试落定
                    app.schedule_retry(generation);
                    Ok(FetchOutcome::RetryScheduled)
                }
                Err(err) => {
                    let mut state = app.lock_state();
                    state.error = Some(err.to_string());
                    state.loading = false;
                    drop(state);

                    warn!("❌ 拉取题目失败: {}", err);
                    Err(AppError::Fetch(err))
                }
            }
        }
        .boxed()
    }

    /// 成功拉取后整体替换题目集
    fn complete_fetch(&self, questions: Vec<Question>) -> usize {
        let count = questions.len();
        let (categories, difficulties) = aggregation::facet_values(&questions);

        let mut state = self.lock_state();
        // 数据集整体替换后，修剪掉已消失取值上的筛选
        state.selection.retain_available(&categories, &difficulties);
        state.questions = questions;
        state.loading = false;
        state.error = None;
        drop(state);

        info!("✓ 成功加载 {} 个题目", count);
        count
    }

    /// 安排一次延迟重试（单槽位：新定时器取代旧定时器）
    fn schedule_retry(&self, generation: u64) {
        let weak = Arc::downgrade(&self.inner);
        let delay = self.inner.config.retry_delay();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            // 上下文已销毁则直接放弃
            let Some(inner) = weak.upgrade() else { return };
            let app = App { inner };

            // 等待期间有新的拉取启动，这次重试已被取代
            if app.current_generation() != generation {
                return;
            }

            let _ = app.attempt_fetch(generation).await;
        });

        self.store_retry_timer(handle);
    }

    fn store_retry_timer(&self, handle: JoinHandle<()>) {
        let mut slot = self
            .inner
            .retry_timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = slot.replace(handle) {
            previous.abort();
        }
    }

    fn cancel_retry_timer(&self) {
        let mut slot = self
            .inner
            .retry_timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = slot.take() {
            previous.abort();
        }
    }

    fn current_generation(&self) -> u64 {
        self.inner.generation.load(Ordering::SeqCst)
    }

    fn lock_state(&self) -> MutexGuard<'_, DashboardState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// 等待加载结束（重试路径在后台任务中完成）
    async fn wait_until_loaded(&self) {
        loop {
            if !self.lock_state().loading {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        }
    }

    // ========== 筛选与视图变更 ==========

    /// 添加分类筛选，取值必须出现在当前数据集中
    pub fn add_category(&self, category: &str) {
        let mut state = self.lock_state();
        let (categories, _) = aggregation::facet_values(&state.questions);
        if !categories.iter().any(|c| c == category) {
            warn!("⚠️ 忽略未知分类筛选: {}", category);
            return;
        }
        state.selection.add_category(category);
    }

    /// 移除分类筛选（不存在则为空操作）
    pub fn remove_category(&self, category: &str) {
        self.lock_state().selection.remove_category(category);
    }

    /// 添加难度筛选，档位必须出现在当前数据集中
    pub fn add_difficulty(&self, difficulty: Difficulty) {
        let mut state = self.lock_state();
        let (_, difficulties) = aggregation::facet_values(&state.questions);
        if !difficulties.contains(&difficulty) {
            warn!("⚠️ 忽略未知难度筛选: {}", difficulty);
            return;
        }
        state.selection.add_difficulty(difficulty);
    }

    /// 移除难度筛选（不存在则为空操作）
    pub fn remove_difficulty(&self, difficulty: Difficulty) {
        self.lock_state().selection.remove_difficulty(difficulty);
    }

    /// 清空全部筛选（两个维度一起生效）
    pub fn clear_all_filters(&self) {
        self.lock_state().selection.clear_all();
    }

    /// 切换难度图表视图
    pub fn set_chart_view(&self, view: ChartView) {
        self.lock_state().chart_view = view;
    }

    // ========== 读取 ==========

    /// 生成看板快照
    ///
    /// 分布视图在每次读取时重新推导（纯计算，足够廉价），不做缓存
    pub fn snapshot(&self) -> DashboardSnapshot {
        let state = self.lock_state();

        DashboardSnapshot {
            view: aggregation::derive_view(&state.questions, &state.selection),
            selected_categories: state.selection.categories().to_vec(),
            selected_difficulties: state.selection.difficulties().to_vec(),
            chart_view: state.chart_view,
            loading: state.loading,
            error: state.error.clone(),
        }
    }

    /// 将当前快照渲染为文本报告输出到日志
    pub fn render_report(&self) {
        let snapshot = self.snapshot();

        if let Some(error) = &snapshot.error {
            warn!("❌ 数据加载失败: {}", error);
            if is_rate_limit_message(error) {
                info!("💡 Open Trivia Database 限制每 5 秒 1 次请求，请稍候再手动刷新");
            }
            return;
        }

        let view = &snapshot.view;

        if self.inner.config.verbose_logging {
            debug!("原始分类名: {:?}", view.categories);
        }

        info!("{}", "=".repeat(60));
        info!("📊 题目分布统计");
        info!("{}", "=".repeat(60));
        info!("📋 题目总数: {}", view.stats.total_questions);
        info!("🗂️ 分类数量: {}", view.stats.total_categories);
        info!("🎯 难度档位: {}", view.stats.total_difficulties);

        if !snapshot.selected_categories.is_empty() || !snapshot.selected_difficulties.is_empty() {
            info!(
                "🔍 当前筛选: 分类 {:?} / 难度 {:?}",
                snapshot.selected_categories, snapshot.selected_difficulties
            );
        }

        if view.total_filtered == 0 {
            info!("⚠️ 没有匹配当前筛选的数据");
            info!("{}", "=".repeat(60));
            return;
        }

        info!("{}", "─".repeat(60));
        info!("📈 分类分布 (按数量降序)");
        for entry in &view.category_distribution {
            info!(
                "  {:<40} {:>3} ({:>3}%)",
                display_category(&entry.label),
                entry.count,
                entry.percentage
            );
        }

        info!("{}", "─".repeat(60));
        info!("📉 难度分布 ({} 视图)", snapshot.chart_view.as_str());
        for entry in &view.difficulty_distribution {
            let label = Difficulty::from_str(&entry.label)
                .map(|d| d.label().to_string())
                .unwrap_or_else(|| entry.label.clone());

            match snapshot.chart_view {
                ChartView::Bar => {
                    let bar = "█".repeat((entry.percentage / 5) as usize);
                    info!("  {:<8} {:<20} {:>3} ({:>3}%)", label, bar, entry.count, entry.percentage);
                }
                ChartView::Pie => {
                    info!("  {:<8} {:>3} ({:>3}%)", label, entry.count, entry.percentage);
                }
            }
        }
        info!("{}", "=".repeat(60));
    }
}

// ========== 日志辅助函数 ==========

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 题目分布统计");
    info!("🌐 数据来源: {}", config.api_base_url);
    info!("📦 单批题目数量: {}", config.batch_size);
    info!("{}", "=".repeat(60));
}
