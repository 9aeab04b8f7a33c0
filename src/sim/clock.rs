/// Hour counter of one episode.
///
/// The counter lives in `[0, episode_length)`; the tick that reaches
/// `episode_length` reports the end of the episode and wraps back to 0.
///
/// # Examples
///
/// ```
/// use microgrid_sim::sim::clock::EpisodeClock;
///
/// let mut clock = EpisodeClock::new(3);
/// assert!(!clock.tick());
/// assert!(!clock.tick());
/// assert!(clock.tick());
/// assert_eq!(clock.hour(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeClock {
    /// Current hour of the episode
    hour: usize,
    /// Hours per episode
    episode_length: usize,
}

impl EpisodeClock {
    /// Creates a clock at hour 0.
    ///
    /// # Panics
    ///
    /// Panics if `episode_length` is zero.
    pub fn new(episode_length: usize) -> Self {
        assert!(episode_length > 0, "episode_length must be > 0");
        Self {
            hour: 0,
            episode_length,
        }
    }

    /// Current hour (0-based).
    pub fn hour(&self) -> usize {
        self.hour
    }

    /// Hours per episode.
    pub fn episode_length(&self) -> usize {
        self.episode_length
    }

    /// Rewinds to hour 0.
    pub fn reset(&mut self) {
        self.hour = 0;
    }

    /// Advances by one hour.
    ///
    /// # Returns
    ///
    /// `true` if this tick completed the episode (the clock is then back at 0).
    pub fn tick(&mut self) -> bool {
        self.hour += 1;
        if self.hour == self.episode_length {
            self.hour = 0;
            true
        } else {
            false
        }
    }
}
