//! System prompts for block analysis and page summarisation.
//!
//! Centralising every prompt here keeps a single source of truth for model
//! behaviour and lets unit tests inspect prompts directly without a live
//! model call.

/// System prompt for the vision block-analysis call.
///
/// The model receives the page's underlying text and a full-page image and
/// must both classify and transcribe every distinct content unit. Tabular
/// and figure data are encoded as HTML tables so merged cells survive
/// (`rowspan`/`colspan`), which a plain-text or Markdown table cannot
/// express.
pub const BLOCK_ANALYSIS_PROMPT: &str = r#"Parse the provided PDF page data (underlying text and full-page image) and identify all document blocks.

A block is a single unit of information: each distinct element (paragraph, header, image, title, table, list item, key-value pair) is a separate block.

For every block report:
- its semantic type
- its raw content. Leave content empty for images. For tables and figures, use an HTML table to represent the underlying data, with `rowspan` and `colspan` attributes for merged cells, for example:

<table>
    <tr>
        <th>Header 1</th>
        <th>Header 2</th>
    </tr>
    <tr>
        <td>Data 1</td>
        <td>Data 2</td>
    </tr>
</table>

- a detailed semantic description of the content or data in the block."#;

/// System prompt for the per-page embedding summary call.
pub const PAGE_SUMMARY_PROMPT: &str = "Create a detailed semantic description of this page content \
optimized for vector embedding and semantic search. Include key concepts, \
entities, relationships, and main ideas. Be comprehensive but focused.";

/// User message carrying the page's extracted text.
pub fn page_text_message(page_num: usize, text: &str) -> String {
    format!("Page {page_num} text: ```{text}```")
}

/// Label preceding the inlined page image.
pub fn page_image_label(page_num: usize) -> String {
    format!("Page {page_num} image:")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_prompt_demands_html_tables() {
        assert!(BLOCK_ANALYSIS_PROMPT.contains("rowspan"));
        assert!(BLOCK_ANALYSIS_PROMPT.contains("colspan"));
        assert!(BLOCK_ANALYSIS_PROMPT.contains("<table>"));
    }

    #[test]
    fn summary_prompt_targets_embedding() {
        assert!(PAGE_SUMMARY_PROMPT.contains("embedding"));
    }

    #[test]
    fn page_text_message_fences_content() {
        let msg = page_text_message(3, "hello");
        assert!(msg.starts_with("Page 3 text:"));
        assert!(msg.contains("```hello```"));
    }
}
