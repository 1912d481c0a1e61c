use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub font_weight: String,
    pub label_color: String,
    pub line_color: String,
    pub line_width: f32,
    pub node_stroke: String,
    pub node_stroke_width: f32,
    /// Fill per depth bucket, root first. Deeper nodes use `fallback_fill`.
    pub depth_fills: Vec<String>,
    pub fallback_fill: String,
    pub shadow_opacity: f32,
    pub background: String,
    pub legend_background: String,
    pub legend_border: String,
    pub legend_text: String,
}

impl Theme {
    pub fn light() -> Self {
        Self {
            font_family: "sans-serif".to_string(),
            font_size: 14.0,
            font_weight: "600".to_string(),
            label_color: "#FFFFFF".to_string(),
            line_color: "#CBD5E1".to_string(),
            line_width: 2.0,
            node_stroke: "#FFFFFF".to_string(),
            node_stroke_width: 2.0,
            depth_fills: vec![
                "#3B82F6".to_string(),
                "#10B981".to_string(),
                "#F59E0B".to_string(),
            ],
            fallback_fill: "#64748B".to_string(),
            shadow_opacity: 0.1,
            background: "#F8FAFC".to_string(),
            legend_background: "#FFFFFF".to_string(),
            legend_border: "#E2E8F0".to_string(),
            legend_text: "#64748B".to_string(),
        }
    }

    pub fn dark() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 14.0,
            font_weight: "600".to_string(),
            label_color: "#F8FAFC".to_string(),
            line_color: "#475569".to_string(),
            line_width: 2.0,
            node_stroke: "#0F172A".to_string(),
            node_stroke_width: 2.0,
            depth_fills: vec![
                "#2563EB".to_string(),
                "#059669".to_string(),
                "#D97706".to_string(),
            ],
            fallback_fill: "#475569".to_string(),
            shadow_opacity: 0.3,
            background: "#0F172A".to_string(),
            legend_background: "#1E293B".to_string(),
            legend_border: "#334155".to_string(),
            legend_text: "#94A3B8".to_string(),
        }
    }

    /// Fill for a node at `depth`. Same depth, same color.
    pub fn fill_for_depth(&self, depth: usize) -> &str {
        self.depth_fills
            .get(depth)
            .map(String::as_str)
            .unwrap_or(self.fallback_fill.as_str())
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_buckets_fall_back_after_level_two() {
        let theme = Theme::light();
        assert_eq!(theme.fill_for_depth(0), "#3B82F6");
        assert_eq!(theme.fill_for_depth(1), "#10B981");
        assert_eq!(theme.fill_for_depth(2), "#F59E0B");
        assert_eq!(theme.fill_for_depth(3), "#64748B");
        assert_eq!(theme.fill_for_depth(17), theme.fill_for_depth(3));
    }
}
