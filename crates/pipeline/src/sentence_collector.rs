//! Accumulates streamed text fragments into whole sentences.

const TRIGGER_CHARS: [char; 6] = ['.', '!', '?', ';', ':', '\n'];
const DEFAULT_MIN_CHECK_INTERVAL: u32 = 15;

pub struct SentenceCollector {
    buffer: String,
    token_counter: u32,
    min_check_interval: u32,
}

impl Default for SentenceCollector {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_CHECK_INTERVAL)
    }
}

impl SentenceCollector {
    pub fn new(min_check_interval: u32) -> Self {
        Self { buffer: String::new(), token_counter: 0, min_check_interval }
    }

    /// Append `fragment`; return any sentences it completed.
    pub fn put(&mut self, fragment: &str) -> Vec<String> {
        if fragment.is_empty() {
            return Vec::new();
        }

        self.buffer.push_str(fragment);
        self.token_counter += 1;

        let is_punctuation = fragment.chars().any(|c| TRIGGER_CHARS.contains(&c));

        if is_punctuation || self.token_counter >= self.min_check_interval {
            self.process_buffer()
        } else {
            Vec::new()
        }
    }

    /// Return the remaining buffer as a final sentence, if non-blank.
    pub fn flush(&mut self) -> Vec<String> {
        if self.buffer.trim().is_empty() {
            self.buffer.clear();
            return Vec::new();
        }

        let remainder = std::mem::take(&mut self.buffer);
        self.token_counter = 0;
        vec![remainder]
    }

    fn process_buffer(&mut self) -> Vec<String> {
        self.token_counter = 0;

        let mut parts = segment(&self.buffer);

        if parts.len() > 1 {
            let tail = parts.pop().expect("len > 1");
            self.buffer = tail;
            parts.into_iter().filter(|s| !s.trim().is_empty()).collect()
        } else {
            Vec::new()
        }
    }
}

/// Rule-based sentence segmenter satisfying the collector's contract: splits
/// `text` right after a trigger character run followed by whitespace, keeping
/// the split character with the sentence it ends. The last element may be an
/// incomplete sentence; concatenating the parts reproduces `text` exactly.
fn segment(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);

        if TRIGGER_CHARS.contains(&c) {
            match chars.peek() {
                Some(next) if next.is_whitespace() => {
                    while let Some(&ws) = chars.peek() {
                        if ws.is_whitespace() {
                            current.push(ws);
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    parts.push(std::mem::take(&mut current));
                }
                None => {
                    parts.push(std::mem::take(&mut current));
                }
                _ => {}
            }
        }
    }

    if !current.is_empty() {
        parts.push(current);
    }

    if parts.is_empty() {
        parts.push(text.to_string());
    }

    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_sentence_once_a_following_segment_starts() {
        let mut collector = SentenceCollector::default();
        assert!(collector.put("Hello").is_empty());
        assert!(collector.put(" world. ").is_empty());
        let out = collector.put("Next.");
        assert_eq!(out, vec!["Hello world. ".to_string()]);
    }

    #[test]
    fn emits_after_min_check_interval_without_punctuation() {
        let mut collector = SentenceCollector::new(3);
        assert!(collector.put("a").is_empty());
        assert!(collector.put("b").is_empty());
        let out = collector.put("c");
        assert!(out.is_empty() || out.iter().all(|s| !s.trim().is_empty()));
    }

    #[test]
    fn flush_returns_remaining_non_blank_buffer() {
        let mut collector = SentenceCollector::default();
        collector.put("partial thought");
        let out = collector.flush();
        assert_eq!(out, vec!["partial thought".to_string()]);
    }

    #[test]
    fn flush_on_blank_buffer_is_empty() {
        let mut collector = SentenceCollector::default();
        let out = collector.flush();
        assert!(out.is_empty());
    }

    #[test]
    fn retains_incomplete_tail_across_calls() {
        let mut collector = SentenceCollector::default();
        let first = collector.put("First sentence. Second starts");
        assert_eq!(first, vec!["First sentence. ".to_string()]);

        // A lone trailing sentence with nothing after it cannot be confirmed
        // complete yet; it stays buffered until another segment starts or
        // flush() is called.
        let second = collector.put(" here. ");
        assert!(second.is_empty());

        let flushed = collector.flush();
        assert_eq!(flushed, vec!["Second starts here. ".to_string()]);
    }
}
