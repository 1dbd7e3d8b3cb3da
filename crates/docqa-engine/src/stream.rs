//! Word-by-word answer emission.
use futures::stream::{self, Stream};
use std::iter::FusedIterator;

/// Lazily yields each whitespace-separated word of an answer followed by a
/// single space.
///
/// Only the answer text and a cursor are held; words are sliced out on
/// demand. Dropping the stream mid-way is the cancellation path. Once the
/// last word is out the text is released.
#[derive(Debug, Clone)]
pub struct AnswerStream {
    text: String,
    pos: usize,
}

impl AnswerStream {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), pos: 0 }
    }

    pub fn is_finished(&self) -> bool {
        self.text[self.pos..].trim_start().is_empty()
    }

    /// Adapt into a `futures::Stream` for async sinks such as a chunked
    /// HTTP body. Each poll yields the next word without buffering.
    pub fn into_async(self) -> impl Stream<Item = String> + Send + Unpin {
        stream::iter(self)
    }

    fn finish(&mut self) {
        self.text = String::new();
        self.pos = 0;
    }
}

pub fn stream_answer(text: impl Into<String>) -> AnswerStream {
    AnswerStream::new(text)
}

impl Iterator for AnswerStream {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let rest = &self.text[self.pos..];
        let Some(offset) = rest.find(|c: char| !c.is_whitespace()) else {
            self.finish();
            return None;
        };
        let word = &rest[offset..];
        let len = word.find(char::is_whitespace).unwrap_or(word.len());
        let mut token = String::with_capacity(len + 1);
        token.push_str(&word[..len]);
        token.push(' ');
        self.pos += offset + len;
        Some(token)
    }
}

impl FusedIterator for AnswerStream {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_released_after_the_last_word() {
        let mut stream = AnswerStream::new("one two");
        assert_eq!(stream.next().as_deref(), Some("one "));
        assert_eq!(stream.next().as_deref(), Some("two "));
        assert!(stream.is_finished());
        assert_eq!(stream.next(), None);
        assert!(stream.text.is_empty());
        assert_eq!(stream.next(), None);
    }
}
