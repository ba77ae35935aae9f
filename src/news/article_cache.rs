//! 单次调用内的新闻去重缓存

use std::collections::HashMap;

use super::article::Article;

/// url -> Article
#[derive(Debug, Default)]
pub struct ArticleCache {
    articles: HashMap<String, Article>,
}

impl ArticleCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.articles.contains_key(url)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.articles.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    /// 过滤已缓存的新闻, 写入并返回新出现的新闻
    ///
    /// 同一批次内 url 重复时只保留第一条
    pub fn admit(&mut self, articles: Vec<Article>) -> Vec<Article> {
        let mut fresh = Vec::with_capacity(articles.len());
        for article in articles {
            if self.contains(&article.url) {
                continue;
            }
            self.articles.insert(article.url.clone(), article.clone());
            fresh.push(article);
        }
        fresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(url: &str, title: &str) -> Article {
        Article {
            source: "s".into(),
            author: "a".into(),
            title: title.into(),
            description: "d".into(),
            content: "c".into(),
            url: url.into(),
            url_to_image: String::new(),
            published_at: String::new(),
        }
    }

    #[test]
    fn test_admit_filters_seen_urls() {
        let mut cache = ArticleCache::new();
        let fresh = cache.admit(vec![article("u1", "a"), article("u2", "b")]);
        assert_eq!(fresh.len(), 2);

        // 只按 url 判断重复, 其他字段不同也视为重复
        let fresh = cache.admit(vec![article("u2", "changed"), article("u3", "c")]);
        assert_eq!(fresh, vec![article("u3", "c")]);
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_admit_dedups_within_batch() {
        let mut cache = ArticleCache::new();
        let fresh = cache.admit(vec![article("u1", "a"), article("u1", "b")]);
        assert_eq!(fresh, vec![article("u1", "a")]);
        assert!(cache.contains("u1"));
        assert!(!cache.is_empty());
    }
}
