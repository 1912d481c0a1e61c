use crate::ingest::{ContentKind, SourceContent};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Levels of node nesting spelled out in the response schema.
const SCHEMA_NODE_LEVELS: usize = 5;

pub(crate) const SYSTEM_INSTRUCTION: &str = "\
You are an expert Mind Map Architect.
Your goal is to analyze the provided content and structure it into a hierarchical JSON format suitable for visualization.

Rules:
1. Identify the central theme (Root Node).
2. Identify major categories (Level 1 Children).
3. Identify details and sub-points (Level 2+ Children).
4. Keep labels concise (1-5 words).
5. Use 'details' for a short explanation if necessary.
6. Ensure the JSON is strictly valid and matches the requested schema.
7. Generate at least 3 levels of depth if the content allows.";

const TEXT_PROMPT: &str = "Analyze the following text and generate a mind map structure:";
const IMAGE_PROMPT: &str = "Analyze this image. If it contains text, diagrams, or notes, convert the information into a structured mind map JSON.";

static RESPONSE_SCHEMA: Lazy<Value> = Lazy::new(|| {
    let mut root = node_schema(SCHEMA_NODE_LEVELS - 1);
    root["required"] = json!(["id", "label", "children"]);
    json!({
        "type": "OBJECT",
        "properties": { "root": root },
        "required": ["root"],
    })
});

/// Explicitly nested, since the API rejects recursive schemas.
fn node_schema(levels_below: usize) -> Value {
    let mut properties = json!({
        "id": { "type": "STRING" },
        "label": { "type": "STRING" },
        "details": { "type": "STRING" },
    });
    if levels_below > 0 {
        properties["children"] = json!({
            "type": "ARRAY",
            "items": node_schema(levels_below - 1),
        });
    }
    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": ["id", "label"],
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    pub system_instruction: Content,
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
    pub response_mime_type: &'static str,
    pub response_schema: Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Candidate {
    pub content: Option<Content>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, if any.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        if text.trim().is_empty() { None } else { Some(text) }
    }
}

fn text_part(text: impl Into<String>) -> Part {
    Part {
        text: Some(text.into()),
        inline_data: None,
    }
}

pub(crate) fn build_request(source: &SourceContent) -> GenerateContentRequest {
    let parts = match source.kind {
        ContentKind::Image => vec![
            Part {
                text: None,
                inline_data: Some(InlineData {
                    mime_type: source.mime_type.clone(),
                    data: source.data.clone(),
                }),
            },
            text_part(IMAGE_PROMPT),
        ],
        ContentKind::Text => vec![text_part(format!("{TEXT_PROMPT}\n\n{}", source.data))],
    };

    GenerateContentRequest {
        system_instruction: Content {
            role: None,
            parts: vec![text_part(SYSTEM_INSTRUCTION)],
        },
        contents: vec![Content {
            role: Some("user".to_string()),
            parts,
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
            response_schema: RESPONSE_SCHEMA.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema_depth(schema: &Value) -> usize {
        match schema["properties"].get("children") {
            Some(children) => 1 + schema_depth(&children["items"]),
            None => 1,
        }
    }

    #[test]
    fn schema_nests_five_levels() {
        let root = &RESPONSE_SCHEMA["properties"]["root"];
        assert_eq!(schema_depth(root), 5);
        assert_eq!(root["required"], json!(["id", "label", "children"]));
        assert_eq!(
            root["properties"]["children"]["items"]["required"],
            json!(["id", "label"])
        );
    }

    #[test]
    fn text_request_inlines_the_content() {
        let source = SourceContent::text("notes.md", "text/markdown", "Ownership and borrowing");
        let body = serde_json::to_value(build_request(&source)).unwrap();
        let parts = &body["contents"][0]["parts"];
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(parts.as_array().unwrap().len(), 1);
        assert!(parts[0]["text"].as_str().unwrap().ends_with("\n\nOwnership and borrowing"));
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert!(body["systemInstruction"]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("Mind Map Architect"));
    }

    #[test]
    fn image_request_sends_inline_data_first() {
        let source = SourceContent::image("board.png", "image/png", b"png-bytes");
        let body = serde_json::to_value(build_request(&source)).unwrap();
        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[0]["inlineData"]["data"], source.data.as_str());
        assert!(parts[0].get("text").is_none());
        assert!(parts[1]["text"].as_str().unwrap().starts_with("Analyze this image"));
    }

    #[test]
    fn response_text_joins_parts() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"{\"root\":"},{"text":"1}"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(response.text().as_deref(), Some("{\"root\":1}"));
        let empty: GenerateContentResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(empty.text().is_none());
    }
}
