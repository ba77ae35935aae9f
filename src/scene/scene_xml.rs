//! 场景 XML
//!
//! ```xml
//! <scenes>
//!   <scene><seq/><scene_desc/><prompt1/><prompt2/><prompt3/></scene>
//! </scenes>
//! ```

use quick_xml::{escape::escape, events::Event, Reader};

use crate::error::Error;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// 单个场景
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scene {
    pub seq: i64,
    pub scene_desc: String,
    pub prompt1: String,
    pub prompt2: String,
    pub prompt3: String,
}

impl Scene {
    /// 三个画面的提示词
    pub fn prompts(&self) -> [&str; 3] {
        [&self.prompt1, &self.prompt2, &self.prompt3]
    }
}

/// 生成场景 XML, 文本内容做转义
pub fn render_scenes(scenes: &[Scene]) -> String {
    let mut lines = vec![XML_DECLARATION.to_string(), "<scenes>".to_string()];
    for scene in scenes {
        lines.push("<scene>".to_string());
        lines.push(format!("<seq>{}</seq>", scene.seq));
        lines.push(format!(
            "<scene_desc>{}</scene_desc>",
            escape(scene.scene_desc.as_str())
        ));
        lines.push(format!("<prompt1>{}</prompt1>", escape(scene.prompt1.as_str())));
        lines.push(format!("<prompt2>{}</prompt2>", escape(scene.prompt2.as_str())));
        lines.push(format!("<prompt3>{}</prompt3>", escape(scene.prompt3.as_str())));
        lines.push("</scene>".to_string());
    }
    lines.push("</scenes>".to_string());
    lines.join("\n")
}

#[derive(Debug, Default)]
struct SceneNode {
    seq: Option<String>,
    scene_desc: Option<String>,
    prompt1: Option<String>,
    prompt2: Option<String>,
    prompt3: Option<String>,
}

impl SceneNode {
    /// 同名字段重复时保留第一个
    fn set(&mut self, field: &str, text: String) {
        let slot = match field {
            "seq" => &mut self.seq,
            "scene_desc" => &mut self.scene_desc,
            "prompt1" => &mut self.prompt1,
            "prompt2" => &mut self.prompt2,
            "prompt3" => &mut self.prompt3,
            _ => return,
        };
        if slot.is_none() {
            *slot = Some(text);
        }
    }

    fn into_scene(self) -> Option<Scene> {
        let seq = self.seq.as_deref()?.trim().parse::<i64>().ok()?;
        Some(Scene {
            seq,
            scene_desc: self.scene_desc.unwrap_or_default(),
            prompt1: self.prompt1.unwrap_or_default(),
            prompt2: self.prompt2.unwrap_or_default(),
            prompt3: self.prompt3.unwrap_or_default(),
        })
    }
}

/// 解析场景 XML
///
/// 文本内容原样保留, 不裁剪空白. 缺少 seq 或 seq 不是整数的场景被跳过.
pub fn parse_scenes(xml: &str) -> Result<Vec<Scene>, Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut scenes = Vec::new();
    let mut open: Vec<String> = Vec::new();
    let mut node: Option<SceneNode> = None;
    let mut text: Option<String> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                match open.len() {
                    1 if name == "scene" => node = Some(SceneNode::default()),
                    2 if node.is_some() => text = Some(String::new()),
                    _ => {}
                }
                open.push(name);
            }
            Event::Text(e) => {
                if let Some(text) = text.as_mut() {
                    text.push_str(&e.unescape()?);
                }
            }
            Event::CData(e) => {
                if let Some(text) = text.as_mut() {
                    text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Event::End(_) => {
                let name = open.pop().unwrap_or_default();
                match open.len() {
                    1 if name == "scene" => {
                        if let Some(scene) = node.take().and_then(SceneNode::into_scene) {
                            scenes.push(scene);
                        }
                    }
                    2 => {
                        if let (Some(node), Some(text)) = (node.as_mut(), text.take()) {
                            node.set(&name, text);
                        }
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(name) = open.last() {
        return Err(Error::InvalidXml(format!("unclosed element <{name}>")));
    }
    Ok(scenes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_escapes_text() {
        let xml = render_scenes(&[Scene {
            seq: 1,
            scene_desc: "雨夜 & 霓虹".into(),
            prompt1: "a <red> car".into(),
            prompt2: String::new(),
            prompt3: "\"quoted\"".into(),
        }]);

        assert!(xml.starts_with(XML_DECLARATION));
        assert!(xml.contains("<seq>1</seq>"));
        assert!(xml.contains("<scene_desc>雨夜 &amp; 霓虹</scene_desc>"));
        assert!(xml.contains("<prompt1>a &lt;red&gt; car</prompt1>"));
        assert!(xml.contains("<prompt2></prompt2>"));
        assert!(xml.ends_with("</scenes>"));
    }

    #[test]
    fn test_parse_rendered_document() -> anyhow::Result<()> {
        let scenes = vec![
            Scene {
                seq: 1,
                scene_desc: "开场".into(),
                prompt1: "sunrise over <hills>".into(),
                prompt2: "a & b".into(),
                prompt3: "close up".into(),
            },
            Scene {
                seq: 2,
                prompt1: "only first".into(),
                ..Default::default()
            },
        ];

        let parsed = parse_scenes(&render_scenes(&scenes))?;
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0], scenes[0]);
        assert_eq!(parsed[1].seq, 2);
        assert_eq!(parsed[1].prompt1, "only first");
        assert!(parsed[1].prompt2.is_empty());
        Ok(())
    }

    #[test]
    fn test_parse_skips_invalid_seq() -> anyhow::Result<()> {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<scenes>
  <scene><seq>x</seq><prompt1>bad seq</prompt1></scene>
  <scene><prompt1>no seq</prompt1></scene>
  <scene>
    <seq> 7 </seq>
    <prompt1>kept</prompt1>
  </scene>
</scenes>"#;
        let scenes = parse_scenes(xml)?;
        assert_eq!(scenes.len(), 1);
        assert_eq!(scenes[0].seq, 7);
        assert_eq!(scenes[0].prompt1, "kept");
        Ok(())
    }

    #[test]
    fn test_parse_empty_and_broken() -> anyhow::Result<()> {
        assert!(parse_scenes("<scenes></scenes>")?.is_empty());
        assert!(matches!(
            parse_scenes("<scenes><scene><seq>1</seq>"),
            Err(Error::InvalidXml(_)) | Err(Error::Xml(_))
        ));
        assert!(matches!(
            parse_scenes("<scenes><scene></seq></scenes>"),
            Err(Error::Xml(_))
        ));
        Ok(())
    }

    #[test]
    fn test_parse_keeps_whitespace() -> anyhow::Result<()> {
        let scenes = vec![Scene {
            seq: 1,
            scene_desc: " 雨夜 ".into(),
            prompt1: "  leading and trailing  ".into(),
            prompt2: "   ".into(),
            prompt3: "line1\nline2\n".into(),
        }];

        let parsed = parse_scenes(&render_scenes(&scenes))?;
        assert_eq!(parsed, scenes);
        Ok(())
    }

    #[test]
    fn test_parse_cdata_and_first_duplicate() -> anyhow::Result<()> {
        let xml = "<scenes><scene><seq>2</seq><prompt1><![CDATA[a <b> & c]]></prompt1>\
                   <prompt2>first</prompt2><prompt2>second</prompt2></scene></scenes>";
        let scenes = parse_scenes(xml)?;
        assert_eq!(scenes.len(), 1);
        assert_eq!(scenes[0].prompt1, "a <b> & c");
        assert_eq!(scenes[0].prompt2, "first");
        Ok(())
    }
}
