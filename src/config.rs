//! 运行配置
//!
//! 节点输入优先, 为空时读取环境变量 (支持 ComfyUI 根目录下的 `.env`).

use std::env;

use log::warn;

pub const DEFAULT_NEWS_API_BASE_URL: &str = "https://newsapi.org";
pub const DEFAULT_FEISHU_BASE_URL: &str = "https://open.feishu.cn/open-apis";
pub const DEFAULT_NEWS_API_RETRIES: u32 = 1;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub news_api_key: Option<String>,
    pub news_api_base_url: String,
    /// 单次请求的传输失败重试总次数, 至少 1
    pub news_api_retries: u32,
    pub feishu_base_url: String,
    pub feishu_app_id: Option<String>,
    pub feishu_app_secret: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            news_api_key: None,
            news_api_base_url: DEFAULT_NEWS_API_BASE_URL.to_string(),
            news_api_retries: DEFAULT_NEWS_API_RETRIES,
            feishu_base_url: DEFAULT_FEISHU_BASE_URL.to_string(),
            feishu_app_id: None,
            feishu_app_secret: None,
        }
    }
}

impl Settings {
    /// 从进程环境加载
    pub fn load() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 从任意键值来源加载
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let defaults = Self::default();
        let news_api_retries = match non_empty("NEWS_API_RETRIES") {
            Some(v) => match v.parse::<u32>() {
                Ok(n) => n.max(1),
                Err(e) => {
                    warn!("invalid NEWS_API_RETRIES {v:?}, {e}");
                    defaults.news_api_retries
                }
            },
            None => defaults.news_api_retries,
        };

        Self {
            news_api_key: non_empty("NEWS_API_KEY"),
            news_api_base_url: non_empty("NEWS_API_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.news_api_base_url),
            news_api_retries,
            feishu_base_url: non_empty("FEISHU_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.feishu_base_url),
            feishu_app_id: non_empty("FEISHU_APP_ID"),
            feishu_app_secret: non_empty("FEISHU_APP_SECRET"),
        }
    }
}

/// 节点输入不为空时优先使用
pub fn prefer_input(input: &str, fallback: Option<&String>) -> Option<String> {
    let input = input.trim();
    if !input.is_empty() {
        return Some(input.to_string());
    }
    fallback.cloned()
}
