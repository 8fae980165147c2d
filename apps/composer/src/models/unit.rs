use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Upstream stages send `null` for fields they have nothing to say about.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Anything other than an array (`null`, `"none"`, an object) means no safe areas.
fn lenient_safe_areas<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(items),
        _ => Ok(Vec::new()),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Image reference
// ────────────────────────────────────────────────────────────────────────────

/// Opaque reference to an image, as produced by the upstream authoring stage.
///
/// Upstream sends file paths, data URIs or bare base64 payloads interchangeably;
/// `kind()` tells them apart without touching the filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(pub String);

/// How an `ImageRef` should be interpreted by an image service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageRefKind {
    FilePath,
    DataUri,
    Remote,
    Base64,
}

const MAX_PATH_LEN: usize = 260;
const IMAGE_EXTENSIONS: [&str; 4] = [".jpg", ".jpeg", ".png", ".webp"];

impl ImageRef {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Classifies the reference.
    ///
    /// A file path needs a separator and a known image extension and must fit within
    /// common OS path limits; anything unrecognized is treated as a base64 payload.
    pub fn kind(&self) -> ImageRefKind {
        let s = self.0.trim();
        if s.starts_with("data:image") {
            return ImageRefKind::DataUri;
        }
        if s.starts_with("http://") || s.starts_with("https://") {
            return ImageRefKind::Remote;
        }
        let has_sep = s.contains('/') || s.contains('\\');
        let lower = s.to_ascii_lowercase();
        let has_ext = IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext));
        if !s.is_empty() && s.len() <= MAX_PATH_LEN && has_sep && has_ext {
            ImageRefKind::FilePath
        } else {
            ImageRefKind::Base64
        }
    }

    /// Short form for logs; base64 payloads can run to megabytes.
    pub fn preview(&self) -> String {
        const PREVIEW_CHARS: usize = 48;
        let mut preview: String = self.0.chars().take(PREVIEW_CHARS).collect();
        if self.0.chars().count() > PREVIEW_CHARS {
            preview.push('…');
        }
        preview
    }

    /// True when the reference is empty or the upstream "no image" marker.
    pub fn is_blank(&self) -> bool {
        let s = self.0.trim();
        s.is_empty() || s == "no_image"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Design and vision records
// ────────────────────────────────────────────────────────────────────────────

/// Decisions made by the design stage upstream. All fields are free-form labels;
/// the geometry resolver parses them leniently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DesignDirective {
    /// Explicit text alignment (`left`, `text-right`, ...). Wins over vision boxes.
    #[serde(default, alias = "text_alignment")]
    pub alignment: Option<String>,
    /// Category / type label used for split-ratio selection.
    #[serde(default, alias = "type")]
    pub category: Option<String>,
    /// Template family hint (`hero_overlay_smart`, `separated_grid`, ...).
    #[serde(default)]
    pub layout_strategy: Option<String>,
}

impl DesignDirective {
    pub fn is_empty(&self) -> bool {
        self.alignment.is_none() && self.category.is_none() && self.layout_strategy.is_none()
    }
}

/// Output of the vision stage for one image.
///
/// `safe_areas` stays loosely typed: the vision model regularly emits 3-tuples,
/// strings or nested objects, and those must be discarded per entry rather than
/// failing the whole record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisionAnalysis {
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dominant_colors: Vec<String>,
    #[serde(default, deserialize_with = "lenient_safe_areas")]
    pub safe_areas: Vec<Value>,
    /// Which side of the image carries the visual weight, e.g. "subject on the right".
    #[serde(default)]
    pub visual_weight: Option<String>,
    /// Layout mode suggested by the vision stage (`Overlay` / `Separated`).
    #[serde(default)]
    pub recommendation: Option<String>,
}

impl VisionAnalysis {
    /// Keeps the palette and mood, drops everything tied to the image's geometry.
    /// Used for continuation fragments, which no longer carry the image.
    pub fn without_geometry(&self) -> Self {
        Self {
            mood: self.mood.clone(),
            dominant_colors: self.dominant_colors.clone(),
            safe_areas: Vec::new(),
            visual_weight: None,
            recommendation: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.mood.is_none()
            && self.dominant_colors.is_empty()
            && self.safe_areas.is_empty()
            && self.visual_weight.is_none()
            && self.recommendation.is_none()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Content unit
// ────────────────────────────────────────────────────────────────────────────

/// One article-equivalent chunk of content: the atomic item being laid out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentUnit {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub body: String,
    /// Generated heading, when the editor produced one distinct from the title.
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default, alias = "image_path")]
    pub image: Option<ImageRef>,
    #[serde(default, alias = "design_spec")]
    pub design: Option<DesignDirective>,
    #[serde(default, alias = "vision_analysis")]
    pub vision: Option<VisionAnalysis>,
    /// Category label; the design directive's category takes precedence when set.
    #[serde(default)]
    pub category: Option<String>,
}

impl ContentUnit {
    pub fn new(id: impl Into<String>, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: body.into(),
            headline: None,
            caption: None,
            image: None,
            design: None,
            vision: None,
            category: None,
        }
    }

    /// The image reference, ignoring blank markers.
    pub fn image_ref(&self) -> Option<&ImageRef> {
        self.image.as_ref().filter(|r| !r.is_blank())
    }

    pub fn has_image(&self) -> bool {
        self.image_ref().is_some()
    }

    pub fn has_caption(&self) -> bool {
        self.caption
            .as_deref()
            .map(|c| !c.trim().is_empty())
            .unwrap_or(false)
    }

    /// Body length in characters (not bytes).
    pub fn body_len(&self) -> usize {
        self.body.chars().count()
    }

    /// Effective category label: design directive first, then the unit's own label.
    pub fn category_label(&self) -> Option<&str> {
        self.design
            .as_ref()
            .and_then(|d| d.category.as_deref())
            .or(self.category.as_deref())
    }

    pub fn alignment_label(&self) -> Option<&str> {
        self.design.as_ref().and_then(|d| d.alignment.as_deref())
    }

    pub fn visual_weight(&self) -> Option<&str> {
        self.vision.as_ref().and_then(|v| v.visual_weight.as_deref())
    }

    pub fn safe_areas(&self) -> &[Value] {
        self.vision
            .as_ref()
            .map(|v| v.safe_areas.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_ref_kinds() {
        assert_eq!(ImageRef::new("assets/cover.JPG").kind(), ImageRefKind::FilePath);
        assert_eq!(ImageRef::new("C:\\img\\a.webp").kind(), ImageRefKind::FilePath);
        assert_eq!(
            ImageRef::new("data:image/png;base64,AAAA").kind(),
            ImageRefKind::DataUri
        );
        assert_eq!(
            ImageRef::new("https://cdn.example.com/a.png").kind(),
            ImageRefKind::Remote
        );
        // No separator → not a path, even with an extension.
        assert_eq!(ImageRef::new("cover.png").kind(), ImageRefKind::Base64);
        assert_eq!(ImageRef::new("iVBORw0KGgo=").kind(), ImageRefKind::Base64);
    }

    #[test]
    fn test_overlong_path_is_not_a_path() {
        let long = format!("dir/{}.png", "a".repeat(300));
        assert_eq!(ImageRef::new(long).kind(), ImageRefKind::Base64);
    }

    #[test]
    fn test_blank_image_is_not_an_image() {
        let mut unit = ContentUnit::new("a1", "T", "body");
        unit.image = Some(ImageRef::new("no_image"));
        assert!(!unit.has_image());
        unit.image = Some(ImageRef::new("  "));
        assert!(!unit.has_image());
    }

    #[test]
    fn test_deserializes_upstream_aliases() {
        let json = serde_json::json!({
            "id": "a1",
            "title": "Hello",
            "body": "World.",
            "image_path": "img/a.png",
            "design_spec": { "text_alignment": "text-right", "type": "Street" },
            "vision_analysis": { "safe_areas": [[0.1, 0.1, 0.5, 0.5], "garbage"] }
        });
        let unit: ContentUnit = serde_json::from_value(json).unwrap();
        assert_eq!(unit.image, Some(ImageRef::new("img/a.png")));
        assert_eq!(unit.alignment_label(), Some("text-right"));
        assert_eq!(unit.category_label(), Some("Street"));
        assert_eq!(unit.safe_areas().len(), 2);
    }

    #[test]
    fn test_null_and_non_array_fields_do_not_reject_the_batch() {
        let json = serde_json::json!([
            {
                "id": "a",
                "title": null,
                "body": null,
                "vision_analysis": { "mood": "Calm", "safe_areas": null, "dominant_colors": null }
            },
            {
                "id": "b",
                "title": "Second",
                "body": "Text.",
                "vision_analysis": { "safe_areas": "none" }
            },
            {
                "id": "c",
                "title": "Third",
                "vision_analysis": { "safe_areas": { "box": [0, 0, 1, 1] } }
            }
        ]);
        let units: Vec<ContentUnit> = serde_json::from_value(json).unwrap();

        assert_eq!(units.len(), 3);
        assert_eq!(units[0].title, "");
        assert_eq!(units[0].body, "");
        assert!(units[0].safe_areas().is_empty());
        let vision = units[0].vision.as_ref().unwrap();
        assert_eq!(vision.mood.as_deref(), Some("Calm"));
        assert!(vision.dominant_colors.is_empty());
        assert!(units[1].safe_areas().is_empty());
        assert_eq!(units[1].body, "Text.");
        assert!(units[2].safe_areas().is_empty());
    }

    #[test]
    fn test_category_label_prefers_design() {
        let mut unit = ContentUnit::new("a1", "T", "b");
        unit.category = Some("minimalist".to_string());
        assert_eq!(unit.category_label(), Some("minimalist"));
        unit.design = Some(DesignDirective {
            category: Some("street".to_string()),
            ..Default::default()
        });
        assert_eq!(unit.category_label(), Some("street"));
    }

    #[test]
    fn test_body_len_counts_chars() {
        let unit = ContentUnit::new("k", "T", "가나다");
        assert_eq!(unit.body_len(), 3);
    }

    #[test]
    fn test_without_geometry_keeps_palette() {
        let vision = VisionAnalysis {
            mood: Some("Calm".to_string()),
            dominant_colors: vec!["#112233".to_string()],
            safe_areas: vec![serde_json::json!([0, 0, 1, 1])],
            visual_weight: Some("right".to_string()),
            recommendation: Some("Overlay".to_string()),
        };
        let stripped = vision.without_geometry();
        assert_eq!(stripped.mood.as_deref(), Some("Calm"));
        assert_eq!(stripped.dominant_colors.len(), 1);
        assert!(stripped.safe_areas.is_empty());
        assert!(stripped.visual_weight.is_none());
        assert!(stripped.recommendation.is_none());
    }
}
