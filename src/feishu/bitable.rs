//! 飞书多维表格
//!
//! 表格地址形如 `https://xxx.feishu.cn/base/<base_id>?table=<table_id>&view=<view_id>`

use serde::Deserialize;
use serde_json::{Map, Value};
use url::Url;

use crate::{error::Error, scene::scene_xml::Scene};

/// 场景描述字段
pub const FIELD_SCENE_DESC: &str = "场景要求";
/// 首画面提示词字段
pub const FIELD_PROMPT1: &str = "首画面提示词";
/// 中画面提示词字段
pub const FIELD_PROMPT2: &str = "中画面提示词";
/// 尾画面提示词字段
pub const FIELD_PROMPT3: &str = "尾画面提示词";

/// 从表格地址中解析出的标识
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitableUrl {
    pub base_id: String,
    pub table_id: Option<String>,
}

/// 解析多维表格地址
pub fn parse_bitable_url(raw: &str) -> Result<BitableUrl, Error> {
    let url = Url::parse(raw.trim())?;

    let base_id = url
        .path_segments()
        .and_then(|mut segments| {
            segments.find(|s| *s == "base")?;
            segments.next()
        })
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::InvalidUrl(format!("no base id in {raw}")))?;

    let table_id = url
        .query_pairs()
        .find(|(k, _)| k == "table")
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty());

    Ok(BitableUrl { base_id, table_id })
}

/// 数据表
#[derive(Debug, Clone, Deserialize)]
pub struct BitableTable {
    pub table_id: String,
    #[serde(default)]
    pub name: String,
}

/// 表格记录
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BitableRecord {
    #[serde(default)]
    pub record_id: Option<String>,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

/// 分页数据, 空表的 items 为 null
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    pub items: Option<Vec<T>>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub page_token: Option<String>,
}

/// 按 `has_more` / `page_token` 依次拉取所有分页
pub fn collect_pages<T, F>(mut fetch_page: F) -> Result<Vec<T>, Error>
where
    F: FnMut(Option<&str>) -> Result<Page<T>, Error>,
{
    let mut items = Vec::new();
    let mut page_token: Option<String> = None;
    loop {
        let page = fetch_page(page_token.as_deref())?;
        items.extend(page.items.unwrap_or_default());

        match page.page_token.filter(|t| !t.is_empty()) {
            Some(token) if page.has_more => page_token = Some(token),
            _ => break,
        }
    }
    Ok(items)
}

/// 单元格内容转为文本
///
/// 富文本单元格是 `[{"type": "text", "text": ...}]` 形式的数组
pub fn field_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(segments)) => segments
            .iter()
            .map(|segment| match segment {
                Value::String(s) => s.clone(),
                Value::Object(obj) => match obj.get("text") {
                    Some(Value::String(s)) => s.clone(),
                    _ => String::new(),
                },
                other => other.to_string(),
            })
            .collect(),
        Some(Value::Object(obj)) => match obj.get("text") {
            Some(Value::String(s)) => s.clone(),
            _ => Value::Object(obj.clone()).to_string(),
        },
        Some(other) => other.to_string(),
    }
}

/// 记录转为场景, 序号从 1 开始
pub fn records_to_scenes(records: &[BitableRecord]) -> Vec<Scene> {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| Scene {
            seq: i as i64 + 1,
            scene_desc: field_text(record.fields.get(FIELD_SCENE_DESC)),
            prompt1: field_text(record.fields.get(FIELD_PROMPT1)),
            prompt2: field_text(record.fields.get(FIELD_PROMPT2)),
            prompt3: field_text(record.fields.get(FIELD_PROMPT3)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_bitable_url() -> anyhow::Result<()> {
        let parsed = parse_bitable_url(
            "https://example.feishu.cn/base/Pn1PbIEv5aAMq?table=tbloPwjcY41f&view=vewqIGF",
        )?;
        assert_eq!(parsed.base_id, "Pn1PbIEv5aAMq");
        assert_eq!(parsed.table_id.as_deref(), Some("tbloPwjcY41f"));

        let parsed = parse_bitable_url("https://example.feishu.cn/base/Pn1PbIEv5aAMq")?;
        assert_eq!(parsed.table_id, None);
        Ok(())
    }

    #[test]
    fn test_parse_bitable_url_invalid() {
        assert!(matches!(
            parse_bitable_url("https://example.feishu.cn/wiki/abc?table=t"),
            Err(Error::InvalidUrl(_))
        ));
        assert!(matches!(
            parse_bitable_url("https://example.feishu.cn/base/"),
            Err(Error::InvalidUrl(_))
        ));
        assert!(matches!(
            parse_bitable_url("not a url"),
            Err(Error::UrlParse(_))
        ));
    }

    #[test]
    fn test_field_text() {
        assert_eq!(field_text(None), "");
        assert_eq!(field_text(Some(&Value::Null)), "");
        assert_eq!(field_text(Some(&json!("plain"))), "plain");
        assert_eq!(
            field_text(Some(&json!([
                {"type": "text", "text": "rich "},
                {"type": "mention", "text": "text"}
            ]))),
            "rich text"
        );
        assert_eq!(field_text(Some(&json!({"link": "https://a", "text": "A"}))), "A");
        assert_eq!(field_text(Some(&json!(12))), "12");
    }

    #[test]
    fn test_records_to_scenes() -> anyhow::Result<()> {
        let records: Vec<BitableRecord> = serde_json::from_value(json!([
            {"record_id": "rec1", "fields": {"场景要求": "清晨", "首画面提示词": "sunrise", "尾画面提示词": "sunset"}},
            {"record_id": "rec2", "fields": {}}
        ]))?;

        let scenes = records_to_scenes(&records);
        assert_eq!(scenes.len(), 2);
        assert_eq!(scenes[0].seq, 1);
        assert_eq!(scenes[0].scene_desc, "清晨");
        assert_eq!(scenes[0].prompts(), ["sunrise", "", "sunset"]);
        assert_eq!(scenes[1], Scene { seq: 2, ..Default::default() });
        Ok(())
    }

    #[test]
    fn test_collect_pages() -> anyhow::Result<()> {
        let mut seen_tokens = Vec::new();
        let items = collect_pages(|token| {
            seen_tokens.push(token.map(str::to_string));
            let page = match token {
                None => Page {
                    items: Some(vec![1, 2]),
                    has_more: true,
                    page_token: Some("p2".to_string()),
                },
                Some("p2") => Page {
                    items: Some(vec![3]),
                    has_more: true,
                    page_token: Some("p3".to_string()),
                },
                Some(_) => Page {
                    items: Some(vec![4]),
                    has_more: false,
                    page_token: Some("p4".to_string()),
                },
            };
            Ok(page)
        })?;

        assert_eq!(items, vec![1, 2, 3, 4]);
        assert_eq!(
            seen_tokens,
            vec![None, Some("p2".to_string()), Some("p3".to_string())]
        );
        Ok(())
    }

    #[test]
    fn test_page_null_items() -> anyhow::Result<()> {
        let page: Page<BitableRecord> =
            serde_json::from_value(json!({"items": null, "has_more": false, "total": 0}))?;
        assert!(page.items.is_none());

        // 数据表没有 Default, 缺少 items 字段时同样为 None
        let page: Page<BitableTable> = serde_json::from_value(json!({"has_more": false}))?;
        assert!(page.items.is_none());

        let items = collect_pages(|_| {
            Ok(Page::<BitableRecord> {
                items: None,
                has_more: false,
                page_token: None,
            })
        })?;
        assert!(items.is_empty());
        Ok(())
    }

    #[test]
    fn test_collect_pages_stops_without_token() -> anyhow::Result<()> {
        let mut calls = 0;
        let items: Vec<i32> = collect_pages(|_| {
            calls += 1;
            Ok(Page {
                items: Some(vec![calls]),
                has_more: true,
                page_token: None,
            })
        })?;
        assert_eq!(items, vec![1]);
        Ok(())
    }
}
