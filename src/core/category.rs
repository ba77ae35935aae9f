//! 节点分类

/// 场景批处理
pub const CATEGORY_SCENES: &str = "Scenes/Batch_Opt";
/// 新闻
pub const CATEGORY_NEWS: &str = "News";
