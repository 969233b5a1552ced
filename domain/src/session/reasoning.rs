//! Separation of inline reasoning from answer text.
//!
//! Several models interleave their chain of thought with the answer, wrapped
//! in `<think>…</think>`. [`ReasoningSplitter`] is a two-state machine fed
//! with arbitrary chunks; delimiters may be split across chunk boundaries.
//!
//! ```text
//!            "<think>"
//!  Outside ────────────▶ Inside
//!     ▲                    │
//!     └────────────────────┘
//!            "</think>"
//! ```
//!
//! Outside text is released as soon as it cannot be the start of an opening
//! delimiter. Inside text is held until the closing delimiter arrives, so a
//! reasoning block is always emitted whole.

pub const OPEN_TAG: &str = "<think>";
pub const CLOSE_TAG: &str = "</think>";

/// A classified piece of model output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Reasoning(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    #[default]
    Outside,
    Inside,
}

/// Per-stream reasoning splitter; create one per stream and drop it after.
#[derive(Debug, Default)]
pub struct ReasoningSplitter {
    state: State,
    pending: String,
}

impl ReasoningSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk, returning every segment that is now unambiguous.
    pub fn push(&mut self, chunk: &str) -> Vec<Segment> {
        self.pending.push_str(chunk);
        let mut out = Vec::new();

        loop {
            match self.state {
                State::Outside => {
                    if let Some(pos) = self.pending.find(OPEN_TAG) {
                        let before: String = self.pending.drain(..pos).collect();
                        self.pending.drain(..OPEN_TAG.len());
                        push_text(&mut out, before);
                        self.state = State::Inside;
                        continue;
                    }
                    let hold = partial_tag_suffix(&self.pending, OPEN_TAG);
                    let ready = self.pending.len() - hold;
                    let text: String = self.pending.drain(..ready).collect();
                    push_text(&mut out, text);
                    break;
                }
                State::Inside => {
                    if let Some(pos) = self.pending.find(CLOSE_TAG) {
                        let reasoning: String = self.pending.drain(..pos).collect();
                        self.pending.drain(..CLOSE_TAG.len());
                        push_reasoning(&mut out, reasoning);
                        self.state = State::Outside;
                        continue;
                    }
                    break;
                }
            }
        }

        out
    }

    /// Flush whatever is still held when the stream ends.
    ///
    /// An unterminated reasoning block is still reported as reasoning.
    pub fn finish(&mut self) -> Vec<Segment> {
        let rest = std::mem::take(&mut self.pending);
        let mut out = Vec::new();
        match self.state {
            State::Outside => push_text(&mut out, rest),
            State::Inside => push_reasoning(&mut out, rest),
        }
        self.state = State::Outside;
        out
    }

    pub fn is_inside(&self) -> bool {
        self.state == State::Inside
    }
}

/// Split a complete response into `(reasoning, content)`.
pub fn split_reasoning(text: &str) -> (Option<String>, String) {
    let mut splitter = ReasoningSplitter::new();
    let mut segments = splitter.push(text);
    segments.extend(splitter.finish());

    let mut reasoning = Vec::new();
    let mut content = String::new();
    for segment in segments {
        match segment {
            Segment::Text(t) => content.push_str(&t),
            Segment::Reasoning(r) => reasoning.push(r),
        }
    }

    let reasoning = (!reasoning.is_empty()).then(|| reasoning.join("\n\n"));
    (reasoning, content.trim_start().to_string())
}

fn push_text(out: &mut Vec<Segment>, text: String) {
    if !text.is_empty() {
        out.push(Segment::Text(text));
    }
}

fn push_reasoning(out: &mut Vec<Segment>, reasoning: String) {
    let trimmed = reasoning.trim();
    if !trimmed.is_empty() {
        out.push(Segment::Reasoning(trimmed.to_string()));
    }
}

/// Length of the longest suffix of `s` that is a proper prefix of `tag`.
fn partial_tag_suffix(s: &str, tag: &str) -> usize {
    (1..tag.len())
        .rev()
        .find(|&k| s.ends_with(&tag[..k]))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(chunks: &[&str]) -> Vec<Segment> {
        let mut splitter = ReasoningSplitter::new();
        let mut out: Vec<Segment> = chunks.iter().flat_map(|c| splitter.push(c)).collect();
        out.extend(splitter.finish());
        out
    }

    fn joined(segments: &[Segment]) -> (String, String) {
        let mut text = String::new();
        let mut reasoning = String::new();
        for s in segments {
            match s {
                Segment::Text(t) => text.push_str(t),
                Segment::Reasoning(r) => reasoning.push_str(r),
            }
        }
        (text, reasoning)
    }

    #[test]
    fn test_plain_text_passes_through() {
        assert_eq!(run(&["hello ", "world"]), vec![
            Segment::Text("hello ".into()),
            Segment::Text("world".into())
        ]);
    }

    #[test]
    fn test_single_chunk_block() {
        let out = run(&["<think>weigh CAC</think>Our target is $120."]);
        assert_eq!(out, vec![
            Segment::Reasoning("weigh CAC".into()),
            Segment::Text("Our target is $120.".into())
        ]);
    }

    #[test]
    fn test_delimiters_split_across_chunks() {
        let out = run(&["Intro <th", "ink>step one", " step two</th", "ink> answer"]);
        let (text, reasoning) = joined(&out);
        assert_eq!(text, "Intro  answer");
        assert_eq!(reasoning, "step one step two");
    }

    #[test]
    fn test_reasoning_held_until_close() {
        let mut splitter = ReasoningSplitter::new();
        assert!(splitter.push("<think>partial").is_empty());
        assert!(splitter.is_inside());
        assert_eq!(splitter.push(" thought</think>"), vec![Segment::Reasoning(
            "partial thought".into()
        )]);
    }

    #[test]
    fn test_false_partial_tag_is_released() {
        let mut splitter = ReasoningSplitter::new();
        assert_eq!(splitter.push("a <t"), vec![Segment::Text("a ".into())]);
        assert_eq!(splitter.push("able"), vec![Segment::Text("<table".into())]);
    }

    #[test]
    fn test_unterminated_reasoning_flushed_on_finish() {
        let out = run(&["<think>never closed"]);
        assert_eq!(out, vec![Segment::Reasoning("never closed".into())]);
    }

    #[test]
    fn test_split_reasoning_helper() {
        let (reasoning, content) = split_reasoning("<think>hmm</think>\n\nFinal answer");
        assert_eq!(reasoning.as_deref(), Some("hmm"));
        assert_eq!(content, "Final answer");

        let (reasoning, content) = split_reasoning("No tags here");
        assert!(reasoning.is_none());
        assert_eq!(content, "No tags here");
    }
}
