use crate::models::question::{Difficulty, Question};

/// 筛选条件
///
/// 两个维度各自维护一份选中值列表，保持插入顺序用于展示；
/// 语义上是集合：重复添加是空操作，移除不存在的值也是空操作。
/// 空列表表示"不过滤"（全部通过），而不是"全部排除"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    selected_categories: Vec<String>,
    selected_difficulties: Vec<Difficulty>,
}

impl FilterSelection {
    /// 创建空的筛选条件
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前选中的分类（插入顺序）
    pub fn categories(&self) -> &[String] {
        &self.selected_categories
    }

    /// 当前选中的难度（插入顺序）
    pub fn difficulties(&self) -> &[Difficulty] {
        &self.selected_difficulties
    }

    /// 两个维度都未选择
    pub fn is_empty(&self) -> bool {
        self.selected_categories.is_empty() && self.selected_difficulties.is_empty()
    }

    /// 添加分类筛选（已存在则为空操作）
    pub fn add_category(&mut self, category: impl Into<String>) {
        let category = category.into();
        if !self.selected_categories.contains(&category) {
            self.selected_categories.push(category);
        }
    }

    /// 移除分类筛选（不存在则为空操作）
    pub fn remove_category(&mut self, category: &str) {
        self.selected_categories.retain(|c| c != category);
    }

    /// 添加难度筛选（已存在则为空操作）
    pub fn add_difficulty(&mut self, difficulty: Difficulty) {
        if !self.selected_difficulties.contains(&difficulty) {
            self.selected_difficulties.push(difficulty);
        }
    }

    /// 移除难度筛选（不存在则为空操作）
    pub fn remove_difficulty(&mut self, difficulty: Difficulty) {
        self.selected_difficulties.retain(|d| *d != difficulty);
    }

    /// 清空全部筛选
    ///
    /// 两个维度在同一次 `&mut` 调用内一起清空，调用方读到的
    /// 永远是两者同时生效后的状态
    pub fn clear_all(&mut self) {
        self.selected_categories.clear();
        self.selected_difficulties.clear();
    }

    /// 判断题目是否通过筛选
    ///
    /// 两个维度是相互独立的 AND 条件
    pub fn matches(&self, question: &Question) -> bool {
        let matches_category = self.selected_categories.is_empty()
            || self.selected_categories.contains(&question.category);

        let matches_difficulty = self.selected_difficulties.is_empty()
            || self.selected_difficulties.contains(&question.difficulty);

        matches_category && matches_difficulty
    }

    /// 只保留仍然存在于当前数据集的选中值
    ///
    /// 数据集整体替换后调用，维持"选中值必须出现在当前可选项中"的约束
    pub fn retain_available(&mut self, categories: &[String], difficulties: &[Difficulty]) {
        self.selected_categories.retain(|c| categories.contains(c));
        self.selected_difficulties.retain(|d| difficulties.contains(d));
    }
}
