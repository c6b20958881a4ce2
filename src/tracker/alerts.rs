use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Non-negative deltas, zero included, count as up.
    pub fn of(delta: f64) -> Self {
        if delta < 0.0 {
            Direction::Down
        } else {
            Direction::Up
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A threshold crossing, ready to be turned into a message.
///
/// Percentages are unsigned magnitudes; the sign lives in the direction.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertEvent {
    pub symbol: String,
    pub direction_since_last: Direction,
    pub pct_since_last: f64,
    pub direction_since_open: Direction,
    pub pct_since_open: f64,
    pub price: f64,
    pub currency: Option<String>,
}

impl AlertEvent {
    pub fn message(&self, decimal_places: u32) -> String {
        let places = decimal_places as usize;
        let mut message = format!(
            "Price alert: ticker symbol {} {} {:.*}% since last announced\n\n{} {:.*}% since market open",
            self.symbol,
            self.direction_since_last,
            places,
            self.pct_since_last,
            self.direction_since_open,
            places,
            self.pct_since_open,
        );

        if let Some(currency) = &self.currency {
            message.push_str(&format!("\nPrice: {} {}", self.price, currency));
        }
        message
    }
}
