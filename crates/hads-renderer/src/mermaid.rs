//! Mermaid diagram code block processor.

use std::collections::HashMap;
use std::fmt::Write;

use crate::code_block::{CodeBlockProcessor, ProcessResult};
use crate::state::escape_html;

/// Turns ```` ```mermaid ```` blocks into diagram containers.
///
/// The diagram source is kept as escaped text inside `<div class="mermaid">`
/// and rendered client-side by the mermaid script.
#[derive(Debug, Default, Clone, Copy)]
pub struct MermaidProcessor;

impl CodeBlockProcessor for MermaidProcessor {
    fn process(
        &mut self,
        language: &str,
        _attrs: &HashMap<String, String>,
        source: &str,
    ) -> ProcessResult {
        if language != "mermaid" {
            return ProcessResult::PassThrough;
        }

        let mut html = String::with_capacity(source.len() + 32);
        write!(html, r#"<div class="mermaid">{}</div>"#, escape_html(source)).unwrap();
        ProcessResult::Inline(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mermaid_block() {
        let result = MermaidProcessor.process("mermaid", &HashMap::new(), "graph TD; A-->B;\n");
        assert_eq!(
            result,
            ProcessResult::Inline(
                "<div class=\"mermaid\">graph TD; A--&gt;B;\n</div>".to_owned()
            )
        );
    }

    #[test]
    fn test_other_language_passes_through() {
        let result = MermaidProcessor.process("rust", &HashMap::new(), "fn main() {}");
        assert_eq!(result, ProcessResult::PassThrough);
    }
}
