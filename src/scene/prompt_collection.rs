//! 按场景序号范围挑选提示词并分配种子

use serde::Serialize;

use crate::{
    error::Error,
    scene::{scene_xml::Scene, seed_generator::SeedGenerator},
};

/// 提示词与种子
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptSeed {
    pub prompt: String,
    pub seed: u64,
}

/// 选出 `start..=end` 范围内场景的提示词
///
/// 范围颠倒时自动交换. 每个命中的场景都消耗三个种子, 空提示词不输出.
pub fn select_prompts(
    scenes: &[Scene],
    start: i64,
    end: i64,
    seeds: &mut SeedGenerator,
) -> Result<Vec<PromptSeed>, Error> {
    let (start, end) = if start > end { (end, start) } else { (start, end) };

    let mut collections = Vec::new();
    for scene in scenes.iter().filter(|s| (start..=end).contains(&s.seq)) {
        let scene_seeds = [seeds.generate()?, seeds.generate()?, seeds.generate()?];
        for (prompt, seed) in scene.prompts().into_iter().zip(scene_seeds) {
            if prompt.is_empty() {
                continue;
            }
            collections.push(PromptSeed {
                prompt: prompt.to_string(),
                seed,
            });
        }
    }
    Ok(collections)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::scene::seed_generator::SeedMode;

    fn scene(seq: i64, prompts: [&str; 3]) -> Scene {
        Scene {
            seq,
            scene_desc: format!("scene {seq}"),
            prompt1: prompts[0].to_string(),
            prompt2: prompts[1].to_string(),
            prompt3: prompts[2].to_string(),
        }
    }

    fn fixed_seeds(base: u64) -> SeedGenerator {
        SeedGenerator::with_rng(SeedMode::Fixed, base, ChaCha8Rng::seed_from_u64(0))
    }

    #[test]
    fn test_select_range_with_fixed_seeds() -> anyhow::Result<()> {
        let scenes = vec![
            scene(1, ["a1", "a2", "a3"]),
            scene(2, ["b1", "", "b3"]),
            scene(3, ["c1", "c2", "c3"]),
        ];

        let mut seeds = fixed_seeds(10);
        let prompts = select_prompts(&scenes, 1, 2, &mut seeds)?;

        let expected = vec![
            ("a1", 11),
            ("a2", 12),
            ("a3", 13),
            ("b1", 14),
            // b2 为空, 种子 15 被跳过
            ("b3", 16),
        ];
        let got: Vec<(&str, u64)> = prompts.iter().map(|p| (p.prompt.as_str(), p.seed)).collect();
        assert_eq!(got, expected);
        Ok(())
    }

    #[test]
    fn test_select_reversed_range() -> anyhow::Result<()> {
        let scenes = vec![scene(1, ["a", "", ""]), scene(5, ["e", "", ""]), scene(9, ["i", "", ""])];

        let forward = select_prompts(&scenes, 1, 5, &mut fixed_seeds(0))?;
        let reversed = select_prompts(&scenes, 5, 1, &mut fixed_seeds(0))?;
        assert_eq!(forward, reversed);
        assert_eq!(forward.len(), 2);
        Ok(())
    }

    #[test]
    fn test_select_keeps_document_order() -> anyhow::Result<()> {
        let scenes = vec![scene(3, ["third", "", ""]), scene(1, ["first", "", ""])];
        let prompts = select_prompts(&scenes, 1, 3, &mut fixed_seeds(0))?;
        assert_eq!(prompts[0].prompt, "third");
        assert_eq!(prompts[1].prompt, "first");
        assert_eq!(prompts[1].seed, 4);
        Ok(())
    }

    #[test]
    fn test_select_outside_range_is_empty() -> anyhow::Result<()> {
        let scenes = vec![scene(1, ["a", "b", "c"])];
        assert!(select_prompts(&scenes, 2, 4, &mut fixed_seeds(0))?.is_empty());
        assert!(select_prompts(&[], 1, 4, &mut fixed_seeds(0))?.is_empty());
        Ok(())
    }

    #[test]
    fn test_prompt_seed_serialize() -> anyhow::Result<()> {
        let value = serde_json::to_value(PromptSeed {
            prompt: "p".into(),
            seed: 42,
        })?;
        assert_eq!(value, serde_json::json!({"prompt": "p", "seed": 42}));
        Ok(())
    }
}
