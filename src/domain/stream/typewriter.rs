use std::time::Duration;

/// Presentation-side pacing of a finished reply into small chunks
#[derive(Debug, Clone, Copy)]
pub struct Typewriter {
    chunk_chars: usize,
    delay: Duration,
}

impl Typewriter {
    pub fn new(chunk_chars: usize, delay: Duration) -> Self {
        Self {
            chunk_chars: chunk_chars.max(1),
            delay,
        }
    }

    /// Split text into chunks of at most `chunk_chars` characters.
    /// Carriage returns are dropped since SSE data lines cannot carry them.
    pub fn chunks(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().filter(|c| *c != '\r').collect();
        chars
            .chunks(self.chunk_chars)
            .map(|chunk| chunk.iter().collect())
            .collect()
    }

    /// Sleep for one pacing interval
    pub async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}
