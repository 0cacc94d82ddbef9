use crate::game::Side;
use std::time::{Duration, Instant};

/// Periodic "moves considered" sampling while the opponent thinks.
///
/// `stop` consumes the sampler, so every computation stops its sampler once.
#[derive(Debug)]
pub struct ProgressSampler {
    interval: Duration,
    next_due: Instant,
    last: u64,
}

impl ProgressSampler {
    pub fn start(now: Instant, interval: Duration) -> Self {
        Self {
            interval,
            next_due: now + interval,
            last: 0,
        }
    }

    /// Takes a sample if the interval has elapsed. Returns the new value when sampled.
    pub fn poll(&mut self, now: Instant, read: impl FnOnce() -> u64) -> Option<u64> {
        if now < self.next_due {
            return None;
        }
        while self.next_due <= now {
            self.next_due += self.interval;
        }
        self.last = read();
        Some(self.last)
    }

    pub fn last(&self) -> u64 {
        self.last
    }

    /// Stops sampling and takes one final reading.
    pub fn stop(self, read: impl FnOnce() -> u64) -> u64 {
        let reading = read();
        tracing::trace!("Sampler stopped at {} (last sample {})", reading, self.last());
        reading
    }
}

/// The single in-flight opponent move request.
#[derive(Debug)]
pub struct EngineComputationHandle {
    request: u64,
    side: Side,
    started: Instant,
    sampler: ProgressSampler,
}

impl EngineComputationHandle {
    pub fn new(request: u64, side: Side, now: Instant, interval: Duration) -> Self {
        Self {
            request,
            side,
            started: now,
            sampler: ProgressSampler::start(now, interval),
        }
    }

    pub fn request(&self) -> u64 {
        self.request
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn sample(&mut self, now: Instant, read: impl FnOnce() -> u64) -> Option<u64> {
        self.sampler.poll(now, read)
    }

    /// Ends the computation, returning the final moves-considered reading.
    pub fn finish(self, read: impl FnOnce() -> u64) -> u64 {
        tracing::debug!(
            "Request {} finished after {:?}",
            self.request,
            self.started.elapsed()
        );
        self.sampler.stop(read)
    }
}
