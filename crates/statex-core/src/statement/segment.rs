//! Splitting page text into one block of lines per transaction.
//!
//! A transaction starts on an anchor line and may wrap over following lines,
//! including onto the next page. The [`Segmenter`] keeps the open block
//! between pages so a wrapped transaction is parsed once, with the page it
//! started on.

use tracing::{debug, trace};

/// Lines a block may span, anchor included, before it is dropped as
/// incomplete.
pub const LOOKAHEAD_LINES: usize = 4;

/// The lines of one transaction, anchor first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Page the anchor line is on.
    pub page: u32,
    /// Trimmed, non-empty lines.
    pub lines: Vec<String>,
}

impl Block {
    fn start(page: u32, anchor: &str) -> Self {
        Self {
            page,
            lines: vec![anchor.to_string()],
        }
    }

    /// The anchor line.
    pub fn anchor(&self) -> &str {
        self.lines.first().map(String::as_str).unwrap_or_default()
    }

    /// All lines joined with single spaces.
    pub fn text(&self) -> String {
        self.lines.join(" ")
    }

    /// Short description for log messages.
    pub fn preview(&self) -> String {
        self.anchor().chars().take(60).collect()
    }
}

/// How a bank lays transactions out on the page.
pub trait BlockLayout {
    /// Headers, footers and separators, skipped before anchor matching.
    fn is_noise(&self, line: &str) -> bool;

    /// Whether `line` starts a transaction.
    fn is_anchor(&self, line: &str) -> bool;

    /// Whether `lines` (anchor first) hold everything needed to parse it.
    fn is_complete(&self, lines: &[String]) -> bool;

    /// Headers and footers met while a block is open. Defaults to
    /// [`is_noise`](Self::is_noise).
    fn is_noise_in_block(&self, line: &str) -> bool {
        self.is_noise(line)
    }

    /// Lines a block may span, anchor included.
    fn lookahead(&self) -> usize {
        LOOKAHEAD_LINES
    }
}

/// Block splitter carrying an open block across pages.
#[derive(Debug, Default)]
pub struct Segmenter {
    pending: Option<Block>,
    dropped: usize,
}

impl Segmenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one page of text, returning the blocks completed on it.
    ///
    /// A block still open at the end of the page stays pending for the
    /// next page.
    pub fn feed_page<L: BlockLayout + ?Sized>(&mut self, layout: &L, page: u32, text: &str) -> Vec<Block> {
        let mut blocks = Vec::new();

        for line in text.lines().map(str::trim) {
            let noise = match self.pending {
                Some(_) => layout.is_noise_in_block(line),
                None => layout.is_noise(line),
            };
            if line.is_empty() || noise {
                continue;
            }

            if layout.is_anchor(line) {
                if let Some(open) = self.pending.take() {
                    self.drop_block(open, "next transaction started");
                }
                let block = Block::start(page, line);
                if layout.is_complete(&block.lines) {
                    blocks.push(block);
                } else {
                    self.pending = Some(block);
                }
                continue;
            }

            let Some(mut open) = self.pending.take() else {
                trace!("Page {}: ignoring line outside a transaction: {}", page, line);
                continue;
            };

            open.lines.push(line.to_string());
            if layout.is_complete(&open.lines) {
                blocks.push(open);
            } else if open.lines.len() >= layout.lookahead() {
                self.drop_block(open, "no amounts within the look-ahead window");
            } else {
                self.pending = Some(open);
            }
        }

        blocks
    }

    /// End of document: drop whatever block is still open.
    pub fn finish(&mut self) {
        if let Some(open) = self.pending.take() {
            self.drop_block(open, "document ended");
        }
    }

    /// Whether a block is waiting for lines from the next page.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Number of incomplete blocks dropped so far.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    fn drop_block(&mut self, block: Block, reason: &str) {
        self.dropped += 1;
        debug!(
            "Page {}: dropping incomplete transaction ({}): {}",
            block.page,
            reason,
            block.preview()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Rows start with '#', complete once a line ends in '$'.
    struct DollarLayout;

    impl BlockLayout for DollarLayout {
        fn is_noise(&self, line: &str) -> bool {
            line.starts_with("Page")
        }

        fn is_anchor(&self, line: &str) -> bool {
            line.starts_with('#')
        }

        fn is_complete(&self, lines: &[String]) -> bool {
            lines.iter().any(|l| l.ends_with('$'))
        }
    }

    #[test]
    fn test_single_and_wrapped_rows() {
        let mut segmenter = Segmenter::new();
        let blocks = segmenter.feed_page(&DollarLayout, 1, "header\n#1 coffee 5$\n#2 rent\n  for may\n100$\n");

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].lines, vec!["#1 coffee 5$"]);
        assert_eq!(blocks[1].text(), "#2 rent for may 100$");
        assert!(!segmenter.has_pending());
    }

    #[test]
    fn test_block_continues_on_next_page() {
        let mut segmenter = Segmenter::new();
        assert!(segmenter.feed_page(&DollarLayout, 1, "#1 salary\nPage 1 of 2").is_empty());
        assert!(segmenter.has_pending());

        let blocks = segmenter.feed_page(&DollarLayout, 2, "Page 2 of 2\n\n9000$\n#2 tea 2$");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].page, 1);
        assert_eq!(blocks[0].text(), "#1 salary 9000$");
        assert_eq!(blocks[1].page, 2);
    }

    #[test]
    fn test_incomplete_blocks_are_dropped() {
        let mut segmenter = Segmenter::new();
        let blocks = segmenter.feed_page(&DollarLayout, 1, "#1 a\n#2 b\nx\ny\nz\nw\n5$\n#3 c");
        assert!(blocks.is_empty());
        segmenter.finish();
        assert_eq!(segmenter.dropped(), 3);
        assert!(!segmenter.has_pending());
    }

    #[test]
    fn test_window_counts_the_anchor() {
        let mut segmenter = Segmenter::new();
        let blocks = segmenter.feed_page(&DollarLayout, 1, "#1 a\nb\nc\n4$\n#2 a\nb\nc\nd\n5$\n");

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text(), "#1 a b c 4$");
        assert_eq!(segmenter.dropped(), 1);
        assert!(!segmenter.has_pending());
    }
}
