//! NewsAPI 客户端
//!
//! 接口文档: https://newsapi.org/docs/endpoints

use std::time::Duration;

use log::warn;
use reqwest::blocking::Client;
use serde::Deserialize;

use super::article::RawArticle;
use crate::error::Error;

/// 头条接口超时
pub const HEADLINES_TIMEOUT: Duration = Duration::from_secs(10);
/// 搜索接口超时
pub const EVERYTHING_TIMEOUT: Duration = Duration::from_secs(15);
/// 接口允许的最大 pageSize
pub const MAX_PAGE_SIZE: usize = 100;

/// 头条接口的过滤条件, 接口不允许 sources 与 category 同时出现
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadlinesFilter {
    Sources(String),
    Category(String),
    Country(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlinesQuery {
    pub language: String,
    pub page_size: usize,
    pub page: usize,
    pub filter: HeadlinesFilter,
}

impl HeadlinesQuery {
    /// 请求参数, 不含 apiKey
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("language", self.language.clone()),
            ("pageSize", self.page_size.to_string()),
            ("page", self.page.to_string()),
        ];
        match &self.filter {
            HeadlinesFilter::Sources(v) => params.push(("sources", v.clone())),
            HeadlinesFilter::Category(v) => params.push(("category", v.clone())),
            HeadlinesFilter::Country(v) => params.push(("country", v.clone())),
        }
        params
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EverythingQuery {
    pub keyword: String,
    pub language: String,
    pub page_size: usize,
    pub sources: String,
    pub page: usize,
}

impl EverythingQuery {
    /// 请求参数, 不含 apiKey; 关键词去除空白后为空时不带 q
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("language", self.language.clone()),
            ("pageSize", self.page_size.to_string()),
            ("sources", self.sources.clone()),
            ("page", self.page.to_string()),
            ("sortBy", "publishedAt".to_string()),
        ];
        if !self.keyword.trim().is_empty() {
            params.push(("q", self.keyword.clone()));
        }
        params
    }
}

/// 新闻数据来源
pub trait NewsSource {
    fn top_headlines(&mut self, query: &HeadlinesQuery) -> Result<Vec<RawArticle>, Error>;

    fn everything(&mut self, query: &EverythingQuery) -> Result<Vec<RawArticle>, Error>;
}

/// 接口响应
#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Option<Vec<RawArticle>>,
}

impl NewsApiResponse {
    fn into_articles(self) -> Result<Vec<RawArticle>, Error> {
        if self.status != "ok" {
            return Err(Error::NewsApi(
                self.message.unwrap_or_else(|| "Unknown error".to_string()),
            ));
        }
        Ok(self.articles.unwrap_or_default())
    }
}

/// 基于 reqwest blocking 的 NewsAPI 客户端
pub struct NewsApiClient {
    client: Client,
    base_url: String,
    api_key: String,
    retries: u32,
}

impl NewsApiClient {
    pub fn new(base_url: &str, api_key: &str, retries: u32) -> Result<Self, Error> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            retries: retries.max(1),
        })
    }

    /// 发送请求, 仅在传输失败时重试
    fn get(
        &self,
        path: &str,
        params: Vec<(&'static str, String)>,
        timeout: Duration,
    ) -> Result<Vec<RawArticle>, Error> {
        let url = format!("{}{path}", self.base_url);
        let mut query = vec![("apiKey", self.api_key.clone())];
        query.extend(params);

        let mut last_error = None;
        for attempt in 1..=self.retries {
            match self.client.get(&url).query(&query).timeout(timeout).send() {
                Ok(response) => {
                    let body: NewsApiResponse = response.json()?;
                    return body.into_articles();
                }
                Err(e) => {
                    warn!("request {path} failed, attempt {attempt}/{}, {e}", self.retries);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) => Err(e.into()),
            None => Err(Error::NewsApi(format!("no request sent to {path}"))),
        }
    }
}

impl NewsSource for NewsApiClient {
    fn top_headlines(&mut self, query: &HeadlinesQuery) -> Result<Vec<RawArticle>, Error> {
        self.get("/v2/top-headlines", query.params(), HEADLINES_TIMEOUT)
    }

    fn everything(&mut self, query: &EverythingQuery) -> Result<Vec<RawArticle>, Error> {
        self.get("/v2/everything", query.params(), EVERYTHING_TIMEOUT)
    }
}
