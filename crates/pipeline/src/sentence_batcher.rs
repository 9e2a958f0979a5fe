//! Groups sentences into synthesis batches bounded by the TTS context budget.
//! A pure state machine: one in-flight batch, no I/O.

pub struct SentenceBatcher {
    limit_chars: usize,
    sentences: Vec<String>,
    char_count: usize,
}

impl SentenceBatcher {
    /// `tts_context_size` is the TTS model's raw context size; the usable
    /// limit is `0.9 * tts_context_size` characters.
    pub fn new(tts_context_size: usize) -> Self {
        Self { limit_chars: (tts_context_size as f64 * 0.9) as usize, sentences: Vec::new(), char_count: 0 }
    }

    /// Feed one sentence; returns a completed batch if this sentence didn't
    /// fit in the current one.
    pub fn push(&mut self, sentence: String) -> Option<String> {
        if self.sentences.is_empty() {
            self.char_count = sentence.chars().count();
            self.sentences.push(sentence);
            return None;
        }

        let additional = sentence.chars().count() + 1;
        if self.char_count + additional <= self.limit_chars {
            self.char_count += additional;
            self.sentences.push(sentence);
            None
        } else {
            let batch = self.sentences.join(" ");
            self.sentences.clear();
            self.char_count = sentence.chars().count();
            self.sentences.push(sentence);
            Some(batch)
        }
    }

    /// Flush the in-flight batch at end-of-stream, if non-empty.
    pub fn finish(&mut self) -> Option<String> {
        if self.sentences.is_empty() {
            None
        } else {
            let batch = self.sentences.join(" ");
            self.sentences.clear();
            self.char_count = 0;
            Some(batch)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batches_under_budget_into_one() {
        let mut batcher = SentenceBatcher::new(1000);
        assert!(batcher.push("Short one.".to_string()).is_none());
        assert!(batcher.push("Short two.".to_string()).is_none());
        let batch = batcher.finish().unwrap();
        assert_eq!(batch, "Short one. Short two.");
    }

    #[test]
    fn emits_batch_when_next_sentence_would_overflow() {
        let mut batcher = SentenceBatcher::new(20);
        assert!(batcher.push("a".repeat(15)).is_none());
        let emitted = batcher.push("b".repeat(15));
        assert_eq!(emitted, Some("a".repeat(15)));
    }

    #[test]
    fn oversize_sentence_becomes_its_own_batch() {
        let mut batcher = SentenceBatcher::new(10);
        let emitted = batcher.push("a".repeat(50));
        assert!(emitted.is_none());
        let batch = batcher.finish().unwrap();
        assert_eq!(batch.chars().count(), 50);
    }

    #[test]
    fn finish_on_empty_batcher_yields_nothing() {
        let mut batcher = SentenceBatcher::new(100);
        assert!(batcher.finish().is_none());
    }
}
