/// Order-preserving accumulator that groups a forward-only record sequence
/// into batches of a fixed maximum size.
///
/// `push` hands back a full batch exactly when the configured size is
/// reached; `finish` flushes whatever remains once the source is exhausted,
/// so the final batch may be smaller but is never empty.
pub struct Batcher<T> {
    capacity: usize,
    buffer: Vec<T>,
}

impl<T> Batcher<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            buffer: Vec::with_capacity(capacity.max(1)),
        }
    }

    pub fn push(&mut self, record: T) -> Option<Vec<T>> {
        self.buffer.push(record);
        if self.buffer.len() >= self.capacity {
            Some(std::mem::replace(
                &mut self.buffer,
                Vec::with_capacity(self.capacity),
            ))
        } else {
            None
        }
    }

    pub fn finish(&mut self) -> Option<Vec<T>> {
        if self.buffer.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.buffer))
        }
    }
}
