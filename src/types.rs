//! Data model shared by every pipeline stage.
//!
//! The flow of ownership mirrors the pipeline: the extractor produces
//! [`PageRecord`]s, the analyzer consumes them and produces
//! [`DocumentBlock`]s, the aggregator folds blocks into [`DocumentChunk`]s,
//! and [`ParsedDocument`] is the final value handed back to the caller.
//! Everything downstream of extraction is immutable once constructed.
//!
//! All output types serialise to the wire shape consumed by storage and
//! retrieval layers:
//!
//! ```json
//! { "chunks": [ { "content": "...", "embed": "...",
//!     "blocks": [ { "type": "Text", "page_num": 1,
//!                   "content": "...", "semantic_content": "..." } ] } ] }
//! ```

use serde::{Deserialize, Serialize};

/// Structural role of a content block on a document page.
///
/// A closed set: the analysis model is constrained to these values through
/// the structured-output schema, so deserialisation of a model response can
/// only ever produce one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockType {
    Header,
    Footer,
    Title,
    #[serde(rename = "Section Header")]
    SectionHeader,
    #[serde(rename = "Page Number")]
    PageNumber,
    #[serde(rename = "List Item")]
    ListItem,
    Figure,
    Table,
    Image,
    #[serde(rename = "Key Value")]
    KeyValue,
    Text,
    Comment,
}

impl BlockType {
    /// Wire names accepted by the structured-output schema, in declaration order.
    pub const WIRE_NAMES: [&'static str; 12] = [
        "Header",
        "Footer",
        "Title",
        "Section Header",
        "Page Number",
        "List Item",
        "Figure",
        "Table",
        "Image",
        "Key Value",
        "Text",
        "Comment",
    ];
}

/// One semantically distinct content unit on a page.
///
/// Created by the block analyzer from a single model response item and
/// stamped with the page it came from. For tables and figures `content`
/// holds an HTML table (with `rowspan`/`colspan` for merged cells); for
/// images it is typically empty and `semantic_content` carries the
/// description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentBlock {
    /// Semantic type classification of the block.
    #[serde(rename = "type")]
    pub kind: BlockType,
    /// 1-indexed page number the block was found on.
    pub page_num: usize,
    /// Raw content of the block; may be empty (e.g. for images).
    pub content: String,
    /// Detailed semantic description of the block's content.
    pub semantic_content: String,
}

/// Per-page extraction result: the raw material for one analyzer call.
///
/// Short-lived: produced by the page extractor, consumed by the analyzer,
/// then dropped. The image is an alpha-free JPEG, base64-encoded and ready
/// to be inlined as a data URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    /// 1-indexed page number.
    pub page_num: usize,
    /// Plain text extracted from the page.
    pub text: String,
    /// Base64-encoded JPEG render of the page.
    pub image_base64: String,
}

/// A retrieval unit composed of one or more blocks.
///
/// `content` is what gets displayed or fed to downstream processing;
/// `embed` is the text optimised for vector embedding. In page mode `embed`
/// is a model-generated summary of the whole page; in block mode it is the
/// block's own semantic description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentChunk {
    /// Full textual content of the chunk.
    pub content: String,
    /// Content optimised for embedding and semantic retrieval.
    pub embed: String,
    /// Constituent blocks, never empty, in analyzer output order.
    pub blocks: Vec<DocumentBlock>,
}

/// The final parse result: an ordered collection of chunks.
///
/// When chunking by page, chunk order follows ascending page number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDocument {
    pub chunks: Vec<DocumentChunk>,
}

impl ParsedDocument {
    /// Total number of blocks across all chunks.
    pub fn block_count(&self) -> usize {
        self.chunks.iter().map(|c| c.blocks.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_block(page: usize) -> DocumentBlock {
        DocumentBlock {
            kind: BlockType::Text,
            page_num: page,
            content: "Lorem ipsum".into(),
            semantic_content: "A paragraph of placeholder text".into(),
        }
    }

    #[test]
    fn block_type_wire_names_round_trip() {
        for name in BlockType::WIRE_NAMES {
            let json = format!("\"{name}\"");
            let kind: BlockType = serde_json::from_str(&json).unwrap();
            assert_eq!(serde_json::to_string(&kind).unwrap(), json);
        }
    }

    #[test]
    fn multi_word_block_types_keep_spaces() {
        assert_eq!(
            serde_json::to_string(&BlockType::SectionHeader).unwrap(),
            "\"Section Header\""
        );
        assert_eq!(
            serde_json::to_string(&BlockType::KeyValue).unwrap(),
            "\"Key Value\""
        );
        assert_eq!(
            serde_json::to_string(&BlockType::PageNumber).unwrap(),
            "\"Page Number\""
        );
    }

    #[test]
    fn block_serialises_kind_as_type() {
        let json = serde_json::to_value(sample_block(3)).unwrap();
        assert_eq!(json["type"], "Text");
        assert_eq!(json["page_num"], 3);
        assert!(json.get("kind").is_none());
    }

    #[test]
    fn parsed_document_round_trip() {
        let doc = ParsedDocument {
            chunks: vec![DocumentChunk {
                content: "Lorem ipsum\n<table><tr><td>1</td></tr></table>".into(),
                embed: "Placeholder text and a one-cell table".into(),
                blocks: vec![sample_block(1), {
                    let mut b = sample_block(1);
                    b.kind = BlockType::Table;
                    b.content = "<table><tr><td>1</td></tr></table>".into();
                    b
                }],
            }],
        };
        let json = serde_json::to_string(&doc).unwrap();
        let back: ParsedDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn block_count_sums_across_chunks() {
        let doc = ParsedDocument {
            chunks: vec![
                DocumentChunk {
                    content: String::new(),
                    embed: String::new(),
                    blocks: vec![sample_block(1), sample_block(1)],
                },
                DocumentChunk {
                    content: String::new(),
                    embed: String::new(),
                    blocks: vec![sample_block(2)],
                },
            ],
        };
        assert_eq!(doc.block_count(), 3);
    }

    #[test]
    fn unknown_block_type_is_rejected() {
        assert!(serde_json::from_str::<BlockType>("\"Sidebar\"").is_err());
    }
}
