/// The tie line between the microgrid and the external grid.
///
/// Exchange in either direction is capped at `exchange_ability`; a disabled
/// connection has zero capacity and the microgrid runs islanded.
#[derive(Debug, Clone, PartialEq)]
pub struct GridConnection {
    enabled: bool,
    exchange_ability: f32,
}

impl GridConnection {
    /// Creates a connection with the given per-hour exchange capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is negative.
    pub fn new(enabled: bool, capacity: f32) -> Self {
        assert!(capacity >= 0.0);

        Self {
            enabled,
            exchange_ability: if enabled { capacity } else { 0.0 },
        }
    }

    /// Creates a disabled (islanded) connection.
    pub fn islanded() -> Self {
        Self::new(false, 0.0)
    }

    /// Whether the tie line is in service.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Maximum import or export magnitude per hour.
    pub fn exchange_ability(&self) -> f32 {
        self.exchange_ability
    }

    /// Splits an exchange request into the part the line carries and the
    /// residual it cannot, both as non-negative magnitudes.
    pub fn cap(&self, requested: f32) -> (f32, f32) {
        if requested <= self.exchange_ability {
            (requested, 0.0)
        } else {
            (self.exchange_ability, requested - self.exchange_ability)
        }
    }

    /// Value of exchanging `energy_exchanged` at `price`.
    ///
    /// Sign-agnostic: the caller decides whether this is a purchase or a
    /// sale and applies any sell discount.
    pub fn cost(&self, price: f32, energy_exchanged: f32) -> f32 {
        price * energy_exchanged
    }
}
