//! 飞书开放平台客户端

use std::time::Duration;

use log::debug;
use reqwest::blocking::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize};

use crate::{
    error::Error,
    feishu::bitable::{collect_pages, BitableRecord, BitableTable, Page},
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const PAGE_SIZE: u32 = 100;

/// 开放平台通用响应
#[derive(Debug, Deserialize)]
pub struct FeishuResponse<T> {
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    pub data: Option<T>,
}

impl<T> FeishuResponse<T> {
    /// `code != 0` 视为失败
    pub fn into_data(self) -> Result<T, Error> {
        if self.code != 0 {
            return Err(Error::Feishu(format!("code {}, {}", self.code, self.msg)));
        }
        self.data
            .ok_or_else(|| Error::Feishu(format!("empty data, {}", self.msg)))
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    code: i64,
    #[serde(default)]
    msg: String,
    tenant_access_token: Option<String>,
}

/// 飞书多维表格客户端
pub struct FeishuClient {
    client: Client,
    base_url: String,
}

impl FeishuClient {
    pub fn new(base_url: &str) -> Result<Self, Error> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// 获取租户访问令牌
    pub fn tenant_access_token(&self, app_id: &str, app_secret: &str) -> Result<String, Error> {
        let url = format!("{}/auth/v3/tenant_access_token/internal", self.base_url);
        let body = serde_json::json!({ "app_id": app_id, "app_secret": app_secret });

        let result: TokenResponse = self.client.post(&url).json(&body).send()?.json()?;
        if result.code != 0 {
            return Err(Error::Feishu(format!(
                "get tenant access token failed, {}",
                result.msg
            )));
        }
        result
            .tenant_access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::Feishu("empty tenant access token".to_string()))
    }

    /// 多维表格中的所有数据表
    pub fn tables(&self, token: &str, base_id: &str) -> Result<Vec<BitableTable>, Error> {
        let url = format!("{}/bitable/v1/apps/{base_id}/tables", self.base_url);
        collect_pages(|page_token| self.get_page(self.client.get(&url), token, page_token))
    }

    /// 按名称查找数据表 id
    pub fn table_id_by_name(&self, token: &str, base_id: &str, name: &str) -> Result<String, Error> {
        self.tables(token, base_id)?
            .into_iter()
            .find(|t| t.name == name)
            .map(|t| t.table_id)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// 数据表中的所有记录
    pub fn all_records(
        &self,
        token: &str,
        base_id: &str,
        table_id: &str,
    ) -> Result<Vec<BitableRecord>, Error> {
        let url = format!(
            "{}/bitable/v1/apps/{base_id}/tables/{table_id}/records",
            self.base_url
        );
        collect_pages(|page_token| self.get_page(self.client.get(&url), token, page_token))
    }

    fn get_page<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        token: &str,
        page_token: Option<&str>,
    ) -> Result<Page<T>, Error> {
        let mut query = vec![("page_size", PAGE_SIZE.to_string())];
        if let Some(page_token) = page_token {
            query.push(("page_token", page_token.to_string()));
        }
        debug!("feishu page request, page_token: {page_token:?}");

        let response: FeishuResponse<Page<T>> =
            request.bearer_auth(token).query(&query).send()?.json()?;
        response.into_data()
    }
}
