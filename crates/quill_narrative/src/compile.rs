//! Final document assembly.

use quill_core::{Chapter, Story};
use std::fmt::Write;

/// Render the story as Markdown.
///
/// Chapters ascend by number and scenes ascend within each chapter. Scenes
/// without content are left out.
///
/// # Examples
///
/// ```
/// use quill_core::{Chapter, Scene, Story};
/// use quill_narrative::compile_document;
///
/// let story = Story { title: "Ashfall".into(), ..Default::default() };
/// let mut chapter = Chapter::new(1, "Embers", "");
/// chapter.upsert_scene(Scene { number: 1, outline: String::new(), content: Some("Smoke.".into()) });
///
/// let doc = compile_document(&story, &[chapter]);
/// assert!(doc.starts_with("# Ashfall"));
/// assert!(doc.contains("## Chapter 1: Embers"));
/// assert!(doc.contains("### Scene 1\n\nSmoke."));
/// ```
#[tracing::instrument(skip_all, fields(chapters = chapters.len()))]
pub fn compile_document(story: &Story, chapters: &[Chapter]) -> String {
    let title = if story.title.trim().is_empty() {
        "Untitled"
    } else {
        story.title.trim()
    };
    let mut doc = format!("# {}\n", title);

    let mut ordered: Vec<&Chapter> = chapters.iter().collect();
    ordered.sort_by_key(|c| c.number);

    let mut omitted = 0usize;
    for chapter in ordered {
        let _ = write!(doc, "\n## Chapter {}: {}\n", chapter.number, chapter.title);
        let mut scenes: Vec<_> = chapter.scenes.iter().collect();
        scenes.sort_by_key(|s| s.number);
        for scene in scenes {
            match scene.content.as_deref().filter(|c| !c.trim().is_empty()) {
                Some(content) => {
                    let _ = write!(doc, "\n### Scene {}\n\n{}\n", scene.number, content.trim());
                }
                None => omitted += 1,
            }
        }
    }
    if omitted > 0 {
        tracing::warn!(omitted, "Unwritten scenes left out of the document");
    }
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::Scene;

    fn scene(number: u32, content: Option<&str>) -> Scene {
        Scene {
            number,
            outline: String::new(),
            content: content.map(str::to_string),
        }
    }

    #[test]
    fn out_of_order_input_is_sorted() {
        let mut two = Chapter::new(2, "Two", "");
        two.scenes = vec![scene(2, Some("D")), scene(1, Some("C"))];
        let mut one = Chapter::new(1, "One", "");
        one.scenes = vec![scene(1, Some("A")), scene(2, Some("B"))];

        let doc = compile_document(&Story::default(), &[two, one]);
        let order: Vec<usize> = ["A", "B", "C", "D"]
            .iter()
            .map(|s| doc.find(&format!("\n\n{}\n", s)).unwrap())
            .collect();
        assert!(order.windows(2).all(|w| w[0] < w[1]));
        assert!(doc.starts_with("# Untitled\n"));
    }

    #[test]
    fn unwritten_scenes_are_omitted() {
        let mut one = Chapter::new(1, "One", "");
        one.scenes = vec![scene(1, Some("A")), scene(2, None)];
        let doc = compile_document(&Story::default(), &[one]);
        assert!(doc.contains("### Scene 1"));
        assert!(!doc.contains("### Scene 2"));
    }
}
