//! Optimizer configuration.
//!
//! [`OptimizerConfig`] holds the parameters of the steady-state loop that
//! are independent of the chosen operators: population size, crossover
//! probability, history and termination settings.

use super::stop::ConvergenceStop;

/// Configuration for the steady-state optimizer.
///
/// # Defaults
///
/// ```
/// use u_nodelayout::ga::OptimizerConfig;
///
/// let config = OptimizerConfig::default();
/// assert_eq!(config.population_size, 200);
/// assert!((config.crossover_rate - 0.85).abs() < 1e-12);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_nodelayout::ga::OptimizerConfig;
///
/// let config = OptimizerConfig::default()
///     .with_population_size(50)
///     .with_convergence(100.0, 5_000)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptimizerConfig {
    /// Number of individuals in the population. Fixed for a run.
    pub population_size: usize,

    /// Probability of recombining the two offspring of a step (0.0–1.0).
    ///
    /// Mutation is always applied, crossover only with this probability.
    pub crossover_rate: f64,

    /// Maximum number of best-fitness samples kept for the stop condition.
    pub history_capacity: usize,

    /// Convergence criterion used by `stop_condition()`.
    pub convergence: ConvergenceStop,

    /// Whether [`run`](super::SteadyStateOptimizer::run) ends when the
    /// convergence criterion is met.
    pub stop_on_convergence: bool,

    /// Upper bound on iterations performed by a single `run` call.
    pub max_iterations: u32,

    /// Optional wall-clock limit for a single `run` call, in milliseconds.
    ///
    /// Checked before every step, so a run may overshoot by one step.
    pub time_limit_ms: Option<u64>,

    /// Random seed for reproducibility. `None` uses a random seed.
    pub seed: Option<u64>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            population_size: 200,
            crossover_rate: 0.85,
            history_capacity: 1000,
            convergence: ConvergenceStop::default(),
            stop_on_convergence: true,
            max_iterations: 1_000_000,
            time_limit_ms: None,
            seed: None,
        }
    }
}

impl OptimizerConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the best-fitness history capacity.
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// Sets the convergence threshold and period.
    pub fn with_convergence(mut self, threshold: f64, period: u32) -> Self {
        self.convergence = ConvergenceStop::new(threshold, period);
        self
    }

    /// Enables or disables stopping on convergence inside `run`.
    pub fn with_stop_on_convergence(mut self, stop: bool) -> Self {
        self.stop_on_convergence = stop;
        self
    }

    /// Sets the iteration limit of a single `run`.
    pub fn with_max_iterations(mut self, n: u32) -> Self {
        self.max_iterations = n;
        self
    }

    /// Sets the wall-clock limit of a single `run`.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Preset for interactive use: small population, short convergence
    /// window.
    ///
    /// - Population: 50, Convergence: 50 over 5 000 iterations
    pub fn fast() -> Self {
        Self {
            population_size: 50,
            convergence: ConvergenceStop::new(50.0, 5_000),
            max_iterations: 100_000,
            ..Self::default()
        }
    }

    /// Preset balancing layout quality and run time.
    ///
    /// - Population: 200, Convergence: 50 over 20 000 iterations
    pub fn balanced() -> Self {
        Self {
            population_size: 200,
            convergence: ConvergenceStop::new(50.0, 20_000),
            max_iterations: 500_000,
            ..Self::default()
        }
    }

    /// Preset for the best layouts on large graphs.
    ///
    /// - Population: 400, Convergence: 10 over 50 000 iterations
    pub fn quality() -> Self {
        Self {
            population_size: 400,
            convergence: ConvergenceStop::new(10.0, 50_000),
            max_iterations: 2_000_000,
            ..Self::default()
        }
    }

    /// Picks a preset by node count.
    ///
    /// - `node_count < 10` → [`fast()`](Self::fast)
    /// - `10 ≤ node_count < 40` → [`balanced()`](Self::balanced)
    /// - `node_count ≥ 40` → [`quality()`](Self::quality)
    pub fn auto_select(node_count: usize) -> Self {
        if node_count < 10 {
            Self::fast()
        } else if node_count < 40 {
            Self::balanced()
        } else {
            Self::quality()
        }
    }

    /// Validates the configuration.
    ///
    /// Returns `Err` with a description if any parameter is invalid.
    /// Operator-dependent minimum population sizes are checked by the
    /// optimizer itself.
    pub fn validate(&self) -> Result<(), String> {
        if self.population_size < 2 {
            return Err("population_size must be at least 2".into());
        }
        if self.population_size >= u32::MAX as usize {
            return Err("population_size must fit in u32".into());
        }
        if !(0.0..=1.0).contains(&self.crossover_rate) {
            return Err("crossover_rate must be within [0, 1]".into());
        }
        if self.history_capacity == 0 {
            return Err("history_capacity must be at least 1".into());
        }
        if self.convergence.period == 0 {
            return Err("convergence period must be at least 1".into());
        }
        if !self.convergence.threshold.is_finite() {
            return Err("convergence threshold must be finite".into());
        }
        if self.time_limit_ms == Some(0) {
            return Err("time_limit_ms must be positive or None".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OptimizerConfig::default();
        assert_eq!(config.population_size, 200);
        assert!((config.crossover_rate - 0.85).abs() < 1e-12);
        assert_eq!(config.history_capacity, 1000);
        assert_eq!(config.convergence, ConvergenceStop::new(50.0, 20_000));
        assert!(config.stop_on_convergence);
        assert!(config.seed.is_none());
        assert!(config.time_limit_ms.is_none());
    }

    #[test]
    fn test_builder_pattern() {
        let config = OptimizerConfig::default()
            .with_population_size(64)
            .with_crossover_rate(0.5)
            .with_history_capacity(10)
            .with_convergence(5.0, 100)
            .with_stop_on_convergence(false)
            .with_max_iterations(1234)
            .with_time_limit_ms(50)
            .with_seed(7);

        assert_eq!(config.population_size, 64);
        assert!((config.crossover_rate - 0.5).abs() < 1e-12);
        assert_eq!(config.history_capacity, 10);
        assert_eq!(config.convergence, ConvergenceStop::new(5.0, 100));
        assert!(!config.stop_on_convergence);
        assert_eq!(config.max_iterations, 1234);
        assert_eq!(config.time_limit_ms, Some(50));
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn test_clamp_crossover_rate() {
        let config = OptimizerConfig::default().with_crossover_rate(1.5);
        assert!((config.crossover_rate - 1.0).abs() < 1e-12);
        let config = OptimizerConfig::default().with_crossover_rate(-1.0);
        assert_eq!(config.crossover_rate, 0.0);
    }

    #[test]
    fn test_validate_ok() {
        assert!(OptimizerConfig::default().validate().is_ok());
        assert!(OptimizerConfig::fast().validate().is_ok());
        assert!(OptimizerConfig::balanced().validate().is_ok());
        assert!(OptimizerConfig::quality().validate().is_ok());
    }

    #[test]
    fn test_validate_population_too_small() {
        let config = OptimizerConfig::default().with_population_size(1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_period() {
        let config = OptimizerConfig::default().with_convergence(1.0, 0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_history() {
        let config = OptimizerConfig::default().with_history_capacity(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_time_limit() {
        let config = OptimizerConfig::default().with_time_limit_ms(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_auto_select_boundaries() {
        assert_eq!(OptimizerConfig::auto_select(9).population_size, 50);
        assert_eq!(OptimizerConfig::auto_select(10).population_size, 200);
        assert_eq!(OptimizerConfig::auto_select(39).population_size, 200);
        assert_eq!(OptimizerConfig::auto_select(40).population_size, 400);
    }

    #[test]
    fn test_preset_chainable() {
        let config = OptimizerConfig::fast().with_population_size(75).with_seed(42);
        assert_eq!(config.population_size, 75);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.convergence.period, 5_000);
    }
}
