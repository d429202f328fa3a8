use crate::captions::record::CaptionRecord;
use crate::foundation::core::FrameIndex;

/// Separator placed between the texts of overlapping captions.
pub const CAPTION_JOINER: &str = " | ";

#[derive(Clone, Copy, Debug)]
struct Span<'a> {
    start: u64,
    end: u64,
    ordinal: usize,
    text: &'a str,
}

/// Interval index answering "which caption text applies to frame `i`".
///
/// Spans are kept sorted by range start so a lookup only scans spans that begin at or before the
/// frame. Texts of overlapping spans are joined in the order the records were supplied (caption
/// index insertion order), not in range order.
#[derive(Clone, Debug)]
pub struct CaptionTimeline<'a> {
    spans: Vec<Span<'a>>,
    // Running maximum of `end` over the sorted prefix; lets lookups stop scanning early.
    prefix_max_end: Vec<u64>,
}

impl<'a> CaptionTimeline<'a> {
    /// Build the index from records in insertion order.
    pub fn new(records: &'a [CaptionRecord]) -> Self {
        let mut spans: Vec<Span<'a>> = records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.start_frame <= r.end_frame)
            .map(|(ordinal, r)| Span {
                start: r.start_frame,
                end: r.end_frame,
                ordinal,
                text: r.text.as_str(),
            })
            .collect();
        spans.sort_by_key(|s| (s.start, s.ordinal));

        let mut prefix_max_end = Vec::with_capacity(spans.len());
        let mut max_end = 0u64;
        for s in &spans {
            max_end = max_end.max(s.end);
            prefix_max_end.push(max_end);
        }

        Self {
            spans,
            prefix_max_end,
        }
    }

    /// Whether no record contributes to any frame.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Texts covering `frame`, in insertion order.
    pub fn texts_at(&self, frame: FrameIndex) -> Vec<&'a str> {
        let f = frame.0;
        let upper = self.spans.partition_point(|s| s.start <= f);
        if upper == 0 || self.prefix_max_end[upper - 1] < f {
            return Vec::new();
        }

        let mut hits: Vec<Span<'a>> = self.spans[..upper]
            .iter()
            .filter(|s| s.end >= f)
            .copied()
            .collect();
        hits.sort_by_key(|s| s.ordinal);
        hits.into_iter().map(|s| s.text).collect()
    }

    /// Combined caption for `frame`, or `None` when no record covers it.
    pub fn text_at(&self, frame: FrameIndex) -> Option<String> {
        let texts = self.texts_at(frame);
        if texts.is_empty() {
            None
        } else {
            Some(texts.join(CAPTION_JOINER))
        }
    }
}
