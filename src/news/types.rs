//! 新闻接口的枚举与常量

use rand::{seq::IndexedRandom, Rng};
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// 新闻源目录
pub const SOURCES: [&str; 9] = [
    "abc-news",
    "bbc-news",
    "cnn",
    "fox-news",
    "google-news",
    "reuters",
    "the-verge",
    "time",
    "wired",
];

/// 支持的语言
pub const LANGUAGES: [&str; 14] = [
    "ar", "de", "en", "es", "fr", "he", "it", "nl", "no", "pt", "ru", "se", "ud", "zh",
];

/// 未指定过滤条件时的默认国家
pub const DEFAULT_COUNTRY: &str = "us";

/// 新闻分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, EnumIter, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Category {
    Business,
    Entertainment,
    General,
    Health,
    Science,
    Sports,
    Technology,
    /// 每次调用随机选择一个具体分类
    Random,
}

impl Category {
    /// 节点下拉选项
    pub fn choices() -> Vec<String> {
        Category::iter().map(|v| v.to_string()).collect()
    }

    /// 将 `random` 解析为具体分类, 其余原样返回
    pub fn resolve<R: Rng + ?Sized>(self, rng: &mut R) -> Category {
        if self != Category::Random {
            return self;
        }
        let concrete: Vec<Category> = Category::iter()
            .filter(|c| *c != Category::Random)
            .collect();
        *concrete.choose(rng).unwrap_or(&Category::General)
    }
}

/// 新闻查询类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, EnumIter, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum NewsType {
    /// 头条新闻
    TopHeadlines,
    /// 全量搜索
    Everything,
}

impl NewsType {
    pub fn choices() -> Vec<String> {
        NewsType::iter().map(|v| v.to_string()).collect()
    }
}
