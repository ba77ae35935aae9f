//! 新闻条目及内容清理

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const UNKNOWN_SOURCE: &str = "Unknown source";
pub const UNKNOWN_AUTHOR: &str = "Unknown author";
pub const NO_TITLE: &str = "No title";
pub const NO_DESCRIPTION: &str = "No description";
pub const NO_CONTENT: &str = "No content";

lazy_static! {
    // 末尾的字数标注, 如 "[+1234 chars]"
    static ref CHAR_COUNT_SUFFIX: Regex =
        Regex::new(r"\s*\[\s*\+?\d+\s*(?:chars?|characteres?)?\s*\]\s*$")
            .expect("valid char count regex");
}

/// 接口返回的原始新闻来源
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawSource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// 接口返回的原始新闻
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawArticle {
    #[serde(default)]
    pub source: Option<RawSource>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub url_to_image: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
}

/// 归一化后的新闻, 以 url 作为唯一标识
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub source: String,
    pub author: String,
    pub title: String,
    pub description: String,
    pub content: String,
    pub url: String,
    #[serde(rename = "urlToImage")]
    pub url_to_image: String,
    #[serde(rename = "publishedAt")]
    pub published_at: String,
}

/// 归一化新闻列表, 丢弃没有 url 的条目
pub fn process_articles(articles: Vec<RawArticle>, max_content_length: usize) -> Vec<Article> {
    articles
        .into_iter()
        .filter(|a| a.url.as_deref().is_some_and(|url| !url.is_empty()))
        .map(|a| {
            let raw_content = a.content.unwrap_or_else(|| NO_CONTENT.to_string());
            Article {
                source: a
                    .source
                    .and_then(|s| s.name)
                    .unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
                author: a.author.unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
                title: a.title.unwrap_or_else(|| NO_TITLE.to_string()),
                description: a.description.unwrap_or_else(|| NO_DESCRIPTION.to_string()),
                content: process_content(&raw_content, max_content_length),
                url: a.url.unwrap_or_default(),
                url_to_image: a.url_to_image.unwrap_or_default(),
                published_at: a.published_at.unwrap_or_default(),
            }
        })
        .collect()
}

/// 去除末尾字数标注并按字符数截断
///
/// 超长时优先在限制之前的最后一个空格处截断 (需位于限制的 90% 之后),
/// 否则直接截断, 两种情况都追加 "..."
pub fn process_content(content: &str, max_length: usize) -> String {
    if content.is_empty() || content == NO_CONTENT {
        return NO_CONTENT.to_string();
    }

    let content = CHAR_COUNT_SUFFIX.replace(content, "");

    let chars: Vec<char> = content.chars().collect();
    if max_length > 0 && chars.len() > max_length {
        let last_space = chars[..max_length].iter().rposition(|c| *c == ' ');
        let cut = match last_space {
            Some(pos) if pos as f64 > max_length as f64 * 0.9 => pos,
            _ => max_length,
        };
        let truncated: String = chars[..cut].iter().collect();
        return format!("{}...", truncated.trim());
    }

    content.trim().to_string()
}
