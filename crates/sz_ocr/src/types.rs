/// Vertical distance (pixels) under which two blocks are on the same line.
pub const LINE_HEIGHT_THRESHOLD: i32 = 20;

/// One recognized text block.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrResult {
    pub text: String,
    pub confidence: f32,
    pub bounding_box: BoundingBox,
}

/// Bounding box of a text block, in crop pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }
}

/// Group blocks into reading-order lines.
///
/// Blocks whose top edges are within `threshold` of a line's first block join that line.
/// Each line is ordered left to right and merged into one result whose box covers its blocks.
pub fn group_into_lines(mut blocks: Vec<OcrResult>, threshold: i32) -> Vec<OcrResult> {
    blocks.sort_by_key(|b| b.bounding_box.y);

    let mut lines: Vec<Vec<OcrResult>> = Vec::new();
    for block in blocks {
        let line = lines.iter_mut().find(|line| {
            line.first()
                .is_some_and(|first| (block.bounding_box.y - first.bounding_box.y).abs() <= threshold)
        });
        match line {
            Some(line) => line.push(block),
            None => lines.push(vec![block]),
        }
    }

    let mut merged: Vec<OcrResult> = lines.into_iter().filter_map(merge_line).collect();
    merged.sort_by_key(|r| r.bounding_box.y);
    merged
}

fn merge_line(mut blocks: Vec<OcrResult>) -> Option<OcrResult> {
    blocks.sort_by_key(|b| b.bounding_box.x);

    let text = blocks
        .iter()
        .map(|b| b.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if text.is_empty() {
        return None;
    }

    let min_x = blocks.iter().map(|b| b.bounding_box.x).min()?;
    let min_y = blocks.iter().map(|b| b.bounding_box.y).min()?;
    let max_x = blocks.iter().map(|b| b.bounding_box.right()).max()?;
    let max_y = blocks.iter().map(|b| b.bounding_box.bottom()).max()?;
    let confidence = blocks.iter().map(|b| b.confidence).sum::<f32>() / blocks.len() as f32;

    Some(OcrResult {
        text,
        confidence,
        bounding_box: BoundingBox {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        },
    })
}

/// Join line texts with newlines, trimming trailing whitespace per line.
pub fn join_result_texts_trimmed(results: &[OcrResult]) -> String {
    results
        .iter()
        .map(|r| r.text.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}
