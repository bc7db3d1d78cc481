//! 分布聚合服务 - 业务能力层
//!
//! (题目集, 筛选条件) → 派生视图的纯函数推导。无副作用、无 I/O、
//! 结果完全确定，可以在每次状态变化时整体重算（单遍遍历加一次排序）

use std::collections::BTreeMap;

use crate::models::{Difficulty, DistributionEntry, FilterSelection, Question, SummaryStats};

/// 聚合推导出的完整视图
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedView {
    /// 分类分布（按数量降序，只含筛选后出现的分类）
    pub category_distribution: Vec<DistributionEntry>,
    /// 难度分布（覆盖全局已知的每个难度，含 0 计数）
    pub difficulty_distribution: Vec<DistributionEntry>,
    /// 全量数据集中出现过的分类（字典序），用于填充可选项
    pub categories: Vec<String>,
    /// 全量数据集中出现过的难度（按名称字典序），用于填充可选项
    pub difficulties: Vec<Difficulty>,
    /// 筛选后的题目总数
    pub total_filtered: usize,
    /// 汇总统计
    pub stats: SummaryStats,
}

/// 提取可选项取值
///
/// 永远基于未筛选的全量数据集，保证可选项不会随筛选收窄
pub fn facet_values(questions: &[Question]) -> (Vec<String>, Vec<Difficulty>) {
    let mut categories: Vec<String> = Vec::new();
    let mut difficulties: Vec<Difficulty> = Vec::new();

    for question in questions {
        if !categories.contains(&question.category) {
            categories.push(question.category.clone());
        }
        if !difficulties.contains(&question.difficulty) {
            difficulties.push(question.difficulty);
        }
    }

    categories.sort();
    difficulties.sort_by_key(|d| d.as_str());

    (categories, difficulties)
}

/// 应用筛选条件
///
/// 两个维度是相互独立的 AND 条件，空集表示不过滤
pub fn apply_filter<'a>(
    questions: &'a [Question],
    selection: &FilterSelection,
) -> Vec<&'a Question> {
    questions.iter().filter(|q| selection.matches(q)).collect()
}

/// 分类分布
///
/// 只包含筛选后实际出现的分类，按数量降序排列；
/// 计数累积在 BTreeMap 中再做稳定排序，同数量时保持字典序，
/// 相同输入必然得到相同输出
pub fn category_distribution(filtered: &[&Question]) -> Vec<DistributionEntry> {
    let total = filtered.len();

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for question in filtered {
        *counts.entry(question.category.as_str()).or_insert(0) += 1;
    }

    let mut entries: Vec<DistributionEntry> = counts
        .into_iter()
        .map(|(category, count)| DistributionEntry {
            label: category.to_string(),
            count,
            percentage: percentage_of(count, total),
        })
        .collect();

    entries.sort_by(|a, b| b.count.cmp(&a.count));

    entries
}

/// 难度分布
///
/// 与分类分布不同：覆盖 `all_difficulties` 中的每个难度，
/// 即使筛选后计数为 0 也保留条目，顺序跟随 `all_difficulties`
pub fn difficulty_distribution(
    filtered: &[&Question],
    all_difficulties: &[Difficulty],
) -> Vec<DistributionEntry> {
    let total = filtered.len();

    all_difficulties
        .iter()
        .map(|difficulty| {
            let count = filtered
                .iter()
                .filter(|q| q.difficulty == *difficulty)
                .count();

            DistributionEntry {
                label: difficulty.as_str().to_string(),
                count,
                percentage: percentage_of(count, total),
            }
        })
        .collect()
}

/// 推导完整视图
///
/// 状态每次变化后整体重算，不做缓存
pub fn derive_view(questions: &[Question], selection: &FilterSelection) -> DerivedView {
    let (categories, difficulties) = facet_values(questions);
    let filtered = apply_filter(questions, selection);
    let total_filtered = filtered.len();

    let category_distribution = category_distribution(&filtered);
    let difficulty_distribution = difficulty_distribution(&filtered, &difficulties);

    let stats = SummaryStats {
        total_questions: total_filtered,
        total_categories: category_distribution.len(),
        total_difficulties: difficulty_distribution.len(),
    };

    DerivedView {
        category_distribution,
        difficulty_distribution,
        categories,
        difficulties,
        total_filtered,
        stats,
    }
}

/// 整数百分比，总数为 0 时恒为 0
fn percentage_of(count: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((count as f64 / total as f64) * 100.0).round() as u8
}
