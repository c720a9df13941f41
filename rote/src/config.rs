//! # Configuration Module - Session Policy Settings
//!
//! Policy constants for a typing session: how long a test may run, how often the
//! clocks tick, and how power-mode particles behave.
//!
//! ```rust
//! use rote::config::Configuration;
//! use web_time::Duration;
//!
//! // Use default configuration
//! let config = Configuration::default();
//! assert_eq!(config.max_test_time, Duration::from_secs(600));
//!
//! // Shorter tests, bigger bursts
//! let config = Configuration {
//!     max_test_time: Duration::from_secs(120),
//!     burst_size: 8,
//!     ..Configuration::default()
//! };
//! ```

use web_time::Duration;

/// Runtime configuration for a typing session
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    /// A session still in progress after this long fails
    ///
    /// **Default**: 600 seconds
    pub max_test_time: Duration,

    /// Period of the session clock. The elapsed time and the timeout are only
    /// evaluated on this tick.
    ///
    /// **Default**: 1 second
    pub clock_interval: Duration,

    /// Period of the particle simulation
    ///
    /// **Default**: 8 milliseconds
    pub particle_interval: Duration,

    /// Particles spawned per correctly typed character in power-mode
    ///
    /// **Default**: 5
    pub burst_size: usize,

    /// Particle physics applied on every particle tick
    pub physics: ParticlePhysics,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            max_test_time: Duration::from_secs(600),
            clock_interval: Duration::from_secs(1),
            particle_interval: Duration::from_millis(8),
            burst_size: 5,
            physics: ParticlePhysics::default(),
        }
    }
}

/// Constants driving the particle simulation.
///
/// Distances are in abstract pixels; hosts scale them to their own coordinate space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticlePhysics {
    /// Added to the vertical velocity every tick
    pub gravity: f64,
    /// Subtracted from the opacity every tick
    pub decay: f64,
    /// Horizontal launch velocity is drawn from `-spread_x..spread_x`
    pub spread_x: f64,
    /// Vertical launch velocity is drawn from `lift_min..lift_max`
    pub lift_min: f64,
    pub lift_max: f64,
    /// Particle size range
    pub size_min: f64,
    pub size_max: f64,
    /// Colour saturation and lightness in percent. The hue is random.
    pub saturation: f64,
    pub lightness: f64,
}

impl Default for ParticlePhysics {
    fn default() -> Self {
        Self {
            gravity: 0.1,
            decay: 0.02,
            spread_x: 2.0,
            lift_min: -4.2,
            lift_max: 1.8,
            size_min: 2.0,
            size_max: 7.0,
            saturation: 90.0,
            lightness: 65.0,
        }
    }
}
