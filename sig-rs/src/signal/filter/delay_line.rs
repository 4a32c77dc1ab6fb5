/// Fixed-capacity history of the most recent samples.
///
/// Pushing overwrites the oldest slot and moves the head, so a push is O(1)
/// regardless of the capacity.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DelayLine {
    buf: Vec<f64>,
    head: usize,
}

impl DelayLine {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            buf: vec![0.0; capacity],
            head: 0,
        }
    }

    /// Record `x` as the newest sample. A zero-capacity line discards it.
    pub(crate) fn push(&mut self, x: f64) {
        if self.buf.is_empty() {
            return;
        }
        self.head = if self.head == 0 {
            self.buf.len() - 1
        } else {
            self.head - 1
        };
        self.buf[self.head] = x;
    }

    /// Sample pushed `delay` pushes ago, `0` being the newest.
    pub(crate) fn get(&self, delay: usize) -> f64 {
        self.buf[(self.head + delay) % self.buf.len()]
    }

    /// Newest first.
    pub(crate) fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.buf.len()).map(move |d| self.get(d))
    }

    pub(crate) fn reset(&mut self) {
        self.buf.iter_mut().for_each(|x| *x = 0.0);
        self.head = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::DelayLine;

    #[test]
    fn newest_sample_is_at_delay_zero() {
        let mut line = DelayLine::new(3);
        for x in [1.0, 2.0, 3.0, 4.0] {
            line.push(x);
        }
        assert_eq!(line.iter().collect::<Vec<_>>(), vec![4.0, 3.0, 2.0]);
        assert_eq!(line.get(1), 3.0);
    }

    #[test]
    fn reset_zeroes_history() {
        let mut line = DelayLine::new(2);
        line.push(5.0);
        line.reset();
        assert_eq!(line.iter().collect::<Vec<_>>(), vec![0.0, 0.0]);
    }

    #[test]
    fn zero_capacity_line_is_inert() {
        let mut line = DelayLine::new(0);
        line.push(1.0);
        assert_eq!(line.iter().count(), 0);
    }
}
