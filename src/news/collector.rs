//! 新闻收集
//!
//! 轮换新闻源分页请求, 按 url 去重, 数量不足时统一补充一次.

use std::collections::HashSet;

use log::{debug, info, warn};
use rand::{seq::IndexedRandom, Rng};

use super::{
    article::{process_articles, Article, RawArticle},
    article_cache::ArticleCache,
    news_api::{EverythingQuery, HeadlinesFilter, HeadlinesQuery, NewsSource, MAX_PAGE_SIZE},
    source_queue::{SourceQueue, SOURCES_PER_ROUND, SOURCE_REPLICAS},
    types::{Category, NewsType, DEFAULT_COUNTRY, SOURCES},
};
use crate::error::Error;

/// 单次收集的参数
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOptions {
    pub category: Category,
    pub language: String,
    pub news_type: NewsType,
    pub keyword: String,
    pub news_nums: usize,
    pub nums_per_batch: usize,
    pub max_attempts: usize,
    pub max_content_length: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            category: Category::Random,
            language: "en".to_string(),
            news_type: NewsType::TopHeadlines,
            keyword: String::new(),
            news_nums: 3,
            nums_per_batch: 10,
            max_attempts: 5,
            max_content_length: 500,
        }
    }
}

/// 选择头条接口的过滤条件
///
/// 同时存在 sources 与 category 时由随机数决定使用哪一个
pub fn headlines_filter<R: Rng + ?Sized>(
    sources: Option<&str>,
    category: Option<&str>,
    rng: &mut R,
) -> HeadlinesFilter {
    let sources = sources.filter(|s| !s.is_empty());
    let category = category.filter(|c| !c.is_empty());
    match (sources, category) {
        (Some(s), Some(c)) => {
            if rng.random_bool(0.5) {
                HeadlinesFilter::Sources(s.to_string())
            } else {
                HeadlinesFilter::Category(c.to_string())
            }
        }
        (Some(s), None) => HeadlinesFilter::Sources(s.to_string()),
        (None, Some(c)) => HeadlinesFilter::Category(c.to_string()),
        (None, None) => HeadlinesFilter::Country(DEFAULT_COUNTRY.to_string()),
    }
}

/// 新闻收集器
///
/// 队列与缓存在每次 [`NewsCollector::collect`] 开始时新建, 调用之间不保留状态
pub struct NewsCollector<S, R> {
    source: S,
    rng: R,
}

impl<S: NewsSource, R: Rng> NewsCollector<S, R> {
    pub fn new(source: S, rng: R) -> Self {
        Self { source, rng }
    }

    #[cfg(test)]
    pub fn into_source(self) -> S {
        self.source
    }

    /// 收集最多 `news_nums` 条不重复的新闻
    pub fn collect(&mut self, options: &FetchOptions) -> Vec<Article> {
        let target = options.news_nums;
        let page_size = options
            .nums_per_batch
            .max(target)
            .clamp(1, MAX_PAGE_SIZE);
        let category = options.category.resolve(&mut self.rng);

        let mut queue = SourceQueue::new(&SOURCES, SOURCE_REPLICAS, &mut self.rng);
        let mut cache = ArticleCache::new();
        let mut collected: Vec<Article> = Vec::new();
        let mut attempts = 0;
        let mut page = 1;

        while collected.len() < target && attempts < options.max_attempts {
            let sources = queue
                .next_sources(SOURCES_PER_ROUND, &mut self.rng)
                .join(",");

            let fetched = match options.news_type {
                NewsType::TopHeadlines => {
                    let filter = headlines_filter(
                        Some(sources.as_str()),
                        Some(category.as_ref()),
                        &mut self.rng,
                    );
                    self.source.top_headlines(&HeadlinesQuery {
                        language: options.language.clone(),
                        page_size,
                        page,
                        filter,
                    })
                }
                NewsType::Everything => self.source.everything(&EverythingQuery {
                    keyword: options.keyword.clone(),
                    language: options.language.clone(),
                    page_size,
                    sources,
                    page,
                }),
            };

            let articles = self.normalize(fetched, options);
            if !articles.is_empty() {
                let fresh = cache.admit(articles);
                debug!("round {attempts}, page {page}: {} new articles", fresh.len());
                collected.extend(fresh);

                if collected.len() >= target {
                    break;
                }
                page += 1;
            }
            attempts += 1;
        }

        if collected.len() > target {
            collected = collected
                .choose_multiple(&mut self.rng, target)
                .cloned()
                .collect();
        } else if collected.len() < target {
            self.backfill(&mut collected, &mut cache, options);
        }

        collected.truncate(target);
        info!(
            "collected {} of {target} articles in {attempts} rounds",
            collected.len()
        );
        collected
    }

    /// 使用全部新闻源补充一次, 不带分类
    fn backfill(
        &mut self,
        collected: &mut Vec<Article>,
        cache: &mut ArticleCache,
        options: &FetchOptions,
    ) {
        let missing = options.news_nums.saturating_sub(collected.len());
        if missing == 0 {
            return;
        }

        let all_sources = SOURCES.join(",");
        let page_size = (missing * 2).clamp(1, MAX_PAGE_SIZE);
        let fetched = match options.news_type {
            NewsType::TopHeadlines => {
                let filter = headlines_filter(Some(all_sources.as_str()), None, &mut self.rng);
                self.source.top_headlines(&HeadlinesQuery {
                    language: options.language.clone(),
                    page_size,
                    page: 1,
                    filter,
                })
            }
            NewsType::Everything => self.source.everything(&EverythingQuery {
                keyword: String::new(),
                language: options.language.clone(),
                page_size,
                sources: all_sources,
                page: 1,
            }),
        };

        let collected_urls: HashSet<String> = collected.iter().map(|a| a.url.clone()).collect();
        let candidates: Vec<Article> = self
            .normalize(fetched, options)
            .into_iter()
            .filter(|a| !collected_urls.contains(&a.url))
            .collect();
        let fresh = cache.admit(candidates);
        debug!("backfill: {} new articles for {missing} missing", fresh.len());
        collected.extend(fresh.into_iter().take(missing));
    }

    /// 单轮失败记录日志并视为零条
    fn normalize(
        &self,
        fetched: Result<Vec<RawArticle>, Error>,
        options: &FetchOptions,
    ) -> Vec<Article> {
        match fetched {
            Ok(raw) => process_articles(raw, options.max_content_length),
            Err(e) => {
                warn!("fetch {} failed, {e}", options.news_type);
                Vec::new()
            }
        }
    }
}
