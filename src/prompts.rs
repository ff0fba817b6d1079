pub const CHAT_SYSTEM: &str = include_str!("../data/prompts/chat_system.txt");
pub const IMAGE_ENRICHMENT: &str = include_str!("../data/prompts/image_enrichment.txt");

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}

/// Turns a raw user utterance into the prompt sent to the image provider.
pub trait PromptEnricher: Send + Sync {
    fn enrich(&self, raw: &str) -> String;
}

/// Enricher backed by a template with a `{{prompt}}` placeholder.
#[derive(Debug, Clone)]
pub struct TemplateEnricher {
    template: String,
}

impl TemplateEnricher {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into().trim().to_string(),
        }
    }

    /// Ceramic product photography.
    pub fn ceramic() -> Self {
        Self::new(IMAGE_ENRICHMENT)
    }
}

impl Default for TemplateEnricher {
    fn default() -> Self {
        Self::ceramic()
    }
}

impl PromptEnricher for TemplateEnricher {
    fn enrich(&self, raw: &str) -> String {
        render(&self.template, &[("prompt", raw)])
    }
}
