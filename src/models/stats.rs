use serde::{Deserialize, Serialize};

/// 单个维度取值的分布统计条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistributionEntry {
    /// 维度取值（分类名或难度名）
    pub label: String,
    /// 筛选后命中的题目数量
    pub count: usize,
    /// 占筛选后总数的百分比（四舍五入到整数；总数为 0 时恒为 0）
    pub percentage: u8,
}

/// 图表视图类型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartView {
    #[default]
    Pie,
    Bar,
}

impl ChartView {
    pub fn as_str(self) -> &'static str {
        match self {
            ChartView::Pie => "pie",
            ChartView::Bar => "bar",
        }
    }
}

/// 汇总统计（展示层的统计卡片数据）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SummaryStats {
    /// 筛选后的题目总数
    pub total_questions: usize,
    /// 筛选后出现的分类数量
    pub total_categories: usize,
    /// 全局已知的难度档位数量
    pub total_difficulties: usize,
}
