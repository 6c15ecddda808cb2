//! XML-style prompt formatting helpers.
//!
//! Keeps every generator prompt structured the same way: clearly separated
//! sections with instructions at the top.

/// Wraps content in an XML tag with the given name.
pub fn xml_tag(name: &str, content: &str) -> String {
    format!("<{}>{}</{}>", name, content, name)
}

/// Wraps multi-line content in an XML tag, preserving the content as-is.
pub fn xml_tag_raw(name: &str, content: &str) -> String {
    format!("<{}>\n{}\n</{}>", name, content.trim(), name)
}

/// Builder for XML-structured prompts.
///
/// Section order is fixed: stage, instructions, inputs, constraints.
pub struct PromptBuilder {
    stage: Option<String>,
    instructions: Option<String>,
    inputs: Vec<(String, String)>,
    constraints: Vec<String>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self {
            stage: None,
            instructions: None,
            inputs: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// Sets the stage name (e.g., "analyze", "compose").
    pub fn stage(mut self, stage: &str) -> Self {
        self.stage = Some(stage.to_string());
        self
    }

    pub fn instructions(mut self, instructions: &str) -> Self {
        self.instructions = Some(instructions.to_string());
        self
    }

    /// Adds a labelled input section (e.g., "email-body", "calendar").
    pub fn input(mut self, label: &str, value: &str) -> Self {
        self.inputs.push((label.to_string(), value.to_string()));
        self
    }

    pub fn constraint(mut self, constraint: &str) -> Self {
        self.constraints.push(constraint.to_string());
        self
    }

    pub fn build(self) -> String {
        let mut sections = Vec::new();

        if let Some(stage) = &self.stage {
            sections.push(xml_tag("stage", stage));
        }

        if let Some(instructions) = &self.instructions {
            sections.push(xml_tag_raw("instructions", instructions));
        }

        if !self.inputs.is_empty() {
            let inputs_content: Vec<String> = self
                .inputs
                .iter()
                .map(|(label, value)| xml_tag_raw(label, value))
                .collect();
            sections.push(xml_tag_raw("inputs", &inputs_content.join("\n")));
        }

        if !self.constraints.is_empty() {
            let constraints_content = self
                .constraints
                .iter()
                .map(|c| format!("- {}", c))
                .collect::<Vec<_>>()
                .join("\n");
            sections.push(xml_tag_raw("constraints", &constraints_content));
        }

        format!("<user-prompt>\n{}\n</user-prompt>", sections.join("\n"))
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xml_tag() {
        assert_eq!(xml_tag("stage", "analyze"), "<stage>analyze</stage>");
    }

    #[test]
    fn test_xml_tag_raw_trims_content() {
        assert_eq!(xml_tag_raw("a", "  b  "), "<a>\nb\n</a>");
    }

    #[test]
    fn test_builder_section_order() {
        let prompt = PromptBuilder::new()
            .stage("compose")
            .instructions("Draft a reply.")
            .input("email-body", "Hi")
            .constraint("Provide only the email body")
            .build();

        let stage = prompt.find("<stage>").unwrap();
        let instructions = prompt.find("<instructions>").unwrap();
        let inputs = prompt.find("<inputs>").unwrap();
        let constraints = prompt.find("<constraints>").unwrap();
        assert!(stage < instructions && instructions < inputs && inputs < constraints);
        assert!(prompt.starts_with("<user-prompt>"));
        assert!(prompt.ends_with("</user-prompt>"));
    }

    #[test]
    fn test_builder_skips_empty_sections() {
        let prompt = PromptBuilder::new().stage("analyze").build();
        assert!(!prompt.contains("<instructions>"));
        assert!(!prompt.contains("<inputs>"));
        assert!(!prompt.contains("<constraints>"));
    }
}
