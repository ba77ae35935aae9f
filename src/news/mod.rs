//! 新闻相关的节点
use pyo3::{
    types::{PyModule, PyModuleMethods},
    Bound, PyResult, Python,
};

use crate::core::node::NodeRegister;

pub mod article;
pub mod article_cache;
pub mod collector;
pub mod news_api;
pub mod source_queue;
pub mod types;

mod news_api_fetcher;
pub use news_api_fetcher::NewsApiFetcher;

mod parse_news_content;
pub use parse_news_content::{parse_news, NewsFields, ParseNewsContent, ParseNewsError};

/// 新闻模块
pub fn submodule(py: Python<'_>) -> PyResult<Bound<'_, PyModule>> {
    let submodule = PyModule::new(py, "news")?;
    submodule.add_class::<NewsApiFetcher>()?;
    submodule.add_class::<ParseNewsContent>()?;
    Ok(submodule)
}

/// News node register
pub fn node_register(py: Python<'_>) -> PyResult<Vec<NodeRegister<'_>>> {
    let nodes: Vec<NodeRegister> = vec![
        NodeRegister(
            "NewsAPI_Fetcher",
            py.get_type::<NewsApiFetcher>(),
            "Get MyShell News",
        ),
        NodeRegister(
            "Parse_News_Content",
            py.get_type::<ParseNewsContent>(),
            "Parse News Content",
        ),
    ];
    Ok(nodes)
}
