//! Batch benchmarking of the layout optimizer on random graphs.
//!
//! [`BatchRun::spawn`] starts one background thread per node count. Each
//! thread generates `graphs_per_count` random graphs and optimizes every
//! graph `restarts_per_graph` times with a fresh optimizer, sending one
//! [`BatchRecord`] per restart over a channel.
//!
//! All threads share one cancellation flag, polled before every graph,
//! every restart and every optimizer step. [`BatchRun::cancel`] raises it
//! and joins every thread before returning.
//!
//! # Usage
//!
//! ```no_run
//! use u_nodelayout::batch::{BatchConfig, BatchRecord, BatchRun};
//!
//! let run = BatchRun::spawn(BatchConfig::default().with_seed(7)).unwrap();
//! println!("{}", BatchRecord::HEADER);
//! for record in run.join() {
//!     println!("{record}");
//! }
//! ```

use crate::ga::OptimizerConfig;
use crate::layout::{layout_optimizer, FitnessComponents, LayoutFitness, LayoutProblem, RandomGraphConfig};
use crate::random::stream_rng;
use crossbeam_channel::{Receiver, Sender};
use rand::Rng;
use std::fmt;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

/// Parameters of a batch run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BatchConfig {
    /// Smallest node count (inclusive).
    pub min_nodes: usize,
    /// Largest node count (inclusive).
    pub max_nodes: usize,
    /// Node count increment.
    pub node_step: usize,
    pub graphs_per_count: usize,
    pub restarts_per_graph: usize,
    pub population_size: usize,
    pub ports_per_node: usize,
    pub connection_rate: f64,
    pub canvas_per_node: f64,
    pub heuristic_routing: bool,
    pub convergence_threshold: f64,
    pub convergence_period: u32,
    /// Step limit per restart.
    pub max_iterations: u32,
    pub seed: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            min_nodes: 5,
            max_nodes: 20,
            node_step: 5,
            graphs_per_count: 3,
            restarts_per_graph: 3,
            population_size: 100,
            ports_per_node: 2,
            connection_rate: 0.1,
            canvas_per_node: 120.0,
            heuristic_routing: true,
            convergence_threshold: 50.0,
            convergence_period: 5_000,
            max_iterations: 200_000,
            seed: 0,
        }
    }
}

impl BatchConfig {
    pub fn with_node_range(mut self, min: usize, max: usize, step: usize) -> Self {
        self.min_nodes = min;
        self.max_nodes = max;
        self.node_step = step;
        self
    }

    pub fn with_graphs_per_count(mut self, n: usize) -> Self {
        self.graphs_per_count = n;
        self
    }

    pub fn with_restarts_per_graph(mut self, n: usize) -> Self {
        self.restarts_per_graph = n;
        self
    }

    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    pub fn with_ports_per_node(mut self, n: usize) -> Self {
        self.ports_per_node = n;
        self
    }

    pub fn with_connection_rate(mut self, rate: f64) -> Self {
        self.connection_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub fn with_canvas_per_node(mut self, size: f64) -> Self {
        self.canvas_per_node = size;
        self
    }

    pub fn with_heuristic_routing(mut self, enabled: bool) -> Self {
        self.heuristic_routing = enabled;
        self
    }

    pub fn with_convergence(mut self, threshold: f64, period: u32) -> Self {
        self.convergence_threshold = threshold;
        self.convergence_period = period;
        self
    }

    pub fn with_max_iterations(mut self, n: u32) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// The node counts visited, one thread each.
    pub fn node_counts(&self) -> Vec<usize> {
        (self.min_nodes..=self.max_nodes)
            .step_by(self.node_step.max(1))
            .collect()
    }

    /// Total number of records a complete run produces.
    pub fn record_count(&self) -> usize {
        self.node_counts().len() * self.graphs_per_count * self.restarts_per_graph
    }

    fn graph_config(&self, node_count: usize) -> RandomGraphConfig {
        RandomGraphConfig::default()
            .with_node_count(node_count)
            .with_ports_per_node(self.ports_per_node)
            .with_connection_rate(self.connection_rate)
            .with_canvas_per_node(self.canvas_per_node)
    }

    fn optimizer_config(&self, seed: u64) -> OptimizerConfig {
        OptimizerConfig::default()
            .with_population_size(self.population_size)
            .with_convergence(self.convergence_threshold, self.convergence_period)
            .with_max_iterations(self.max_iterations)
            .with_seed(seed)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.min_nodes < 2 {
            return Err("min_nodes must be at least 2".into());
        }
        if self.max_nodes < self.min_nodes {
            return Err("max_nodes must not be below min_nodes".into());
        }
        if self.node_step == 0 {
            return Err("node_step must be at least 1".into());
        }
        if !(self.canvas_per_node.is_finite() && self.canvas_per_node > 0.0) {
            return Err("canvas_per_node must be positive".into());
        }
        if !(0.0..=1.0).contains(&self.connection_rate) {
            return Err("connection_rate must be within [0, 1]".into());
        }
        // the default layout operators need a 5-tournament and 2 survivors
        if self.population_size < 5 {
            return Err("population_size must be at least 5".into());
        }
        self.optimizer_config(self.seed).validate()
    }
}

/// Outcome of one restart.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BatchRecord {
    pub node_count: usize,
    pub graph: usize,
    pub restart: usize,
    pub link_count: usize,
    pub elapsed_ms: u64,
    pub iterations: u32,
    pub fitness: f64,
    pub components: FitnessComponents,
    /// Edge and edge-node crossings divided by the link count.
    pub crossings_per_link: f64,
    /// Overlapping node pairs divided by the number of node pairs.
    pub overlaps_per_pair: f64,
}

impl BatchRecord {
    /// Column names of [`to_line`](Self::to_line).
    pub const HEADER: &'static str = "nodes;graph;restart;links;elapsed_ms;iterations;fitness;\
overlap;position;angle;edge_crossing;edge_node_crossing;crossings_per_link;overlaps_per_pair";

    /// The record as one `;`-separated line.
    pub fn to_line(&self) -> String {
        let c = &self.components;
        format!(
            "{};{};{};{};{};{};{};{};{};{};{};{};{};{}",
            self.node_count,
            self.graph,
            self.restart,
            self.link_count,
            self.elapsed_ms,
            self.iterations,
            self.fitness,
            c.overlap,
            c.position,
            c.angle,
            c.edge_crossing,
            c.edge_node_crossing,
            self.crossings_per_link,
            self.overlaps_per_pair,
        )
    }
}

impl fmt::Display for BatchRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_line())
    }
}

/// Work of one batch thread.
type Job = Box<dyn FnOnce() + Send + 'static>;

/// A running batch.
///
/// Dropping it cancels the remaining work and waits for the threads.
pub struct BatchRun {
    cancel: Arc<AtomicBool>,
    handles: Vec<JoinHandle<()>>,
    records: Receiver<BatchRecord>,
}

impl BatchRun {
    /// Validates `config` and starts one thread per node count.
    ///
    /// If a thread cannot be spawned, the threads already started are
    /// cancelled and joined before the error is returned.
    pub fn spawn(config: BatchConfig) -> Result<Self, String> {
        Self::spawn_with(config, |name, job| thread::Builder::new().name(name).spawn(job))
    }

    fn spawn_with<F>(config: BatchConfig, mut spawner: F) -> Result<Self, String>
    where
        F: FnMut(String, Job) -> io::Result<JoinHandle<()>>,
    {
        config.validate()?;

        let (tx, rx) = crossbeam_channel::unbounded();
        let config = Arc::new(config);
        let node_counts = config.node_counts();
        let mut run = Self {
            cancel: Arc::new(AtomicBool::new(false)),
            handles: Vec::with_capacity(node_counts.len()),
            records: rx,
        };

        info!(
            threads = node_counts.len(),
            records = config.record_count(),
            "batch started"
        );

        for node_count in node_counts {
            let config = Arc::clone(&config);
            let cancel = Arc::clone(&run.cancel);
            let tx = tx.clone();
            let job: Job = Box::new(move || run_node_count(&config, node_count, &cancel, &tx));
            match spawner(format!("batch-{node_count}"), job) {
                Ok(handle) => run.handles.push(handle),
                Err(e) => {
                    run.cancel();
                    return Err(format!("failed to spawn batch thread: {e}"));
                }
            }
        }

        Ok(run)
    }

    /// Records as they arrive. Disconnects once every thread has finished.
    pub fn records(&self) -> &Receiver<BatchRecord> {
        &self.records
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// Whether every thread has finished.
    pub fn is_finished(&self) -> bool {
        self.handles.iter().all(JoinHandle::is_finished)
    }

    /// Stops all threads and waits for them.
    pub fn cancel(&mut self) {
        self.cancel.store(true, Ordering::Relaxed);
        self.join_threads();
        info!("batch cancelled");
    }

    /// Waits for the batch to complete and returns the records not yet
    /// received.
    pub fn join(mut self) -> Vec<BatchRecord> {
        self.join_threads();
        self.records.try_iter().collect()
    }

    fn join_threads(&mut self) {
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                warn!("batch thread panicked");
            }
        }
    }
}

impl Drop for BatchRun {
    fn drop(&mut self) {
        if !self.handles.is_empty() {
            self.cancel();
        }
    }
}

fn run_node_count(
    config: &BatchConfig,
    node_count: usize,
    cancel: &Arc<AtomicBool>,
    tx: &Sender<BatchRecord>,
) {
    let mut rng = stream_rng(config.seed, node_count as u64);
    let graph_config = config.graph_config(node_count);
    let fitness = LayoutFitness::default().with_heuristic_routing(config.heuristic_routing);
    let cancel_flag = || cancel.load(Ordering::Relaxed);

    for graph_index in 0..config.graphs_per_count {
        if cancel_flag() {
            return;
        }
        let graph = match graph_config.generate(&mut rng) {
            Ok(graph) => Arc::new(graph),
            Err(e) => {
                warn!(node_count, error = %e, "graph generation failed");
                return;
            }
        };
        debug!(node_count, graph_index, links = graph.link_count(), "graph generated");

        for restart in 0..config.restarts_per_graph {
            if cancel_flag() {
                return;
            }
            let problem = LayoutProblem::new(Arc::clone(&graph), fitness.clone());
            let mut optimizer = layout_optimizer(problem, config.optimizer_config(rng.random()));
            optimizer.initialize_population(config.population_size);
            let result = optimizer.run_with_cancel(Some(Arc::clone(cancel)));
            if result.cancelled {
                return;
            }

            let components = *optimizer.best().components();
            let record = BatchRecord {
                node_count,
                graph: graph_index,
                restart,
                link_count: graph.link_count(),
                elapsed_ms: result.elapsed.as_millis() as u64,
                iterations: result.iterations,
                fitness: result.best_fitness,
                components,
                crossings_per_link: crossings_per_link(&components, &fitness, graph.link_count()),
                overlaps_per_pair: overlaps_per_pair(&components, &fitness, node_count),
            };
            if tx.send(record).is_err() {
                // receiver gone
                return;
            }
        }
    }
    debug!(node_count, "batch thread finished");
}

fn crossings_per_link(c: &FitnessComponents, fitness: &LayoutFitness, links: usize) -> f64 {
    if links == 0 || fitness.crossing_penalty == 0.0 {
        return 0.0;
    }
    let crossings = (c.edge_crossing + c.edge_node_crossing) / fitness.crossing_penalty;
    crossings / links as f64
}

fn overlaps_per_pair(c: &FitnessComponents, fitness: &LayoutFitness, nodes: usize) -> f64 {
    let pairs = nodes * nodes.saturating_sub(1) / 2;
    if pairs == 0 || fitness.overlap_penalty == 0.0 {
        return 0.0;
    }
    c.overlap / fitness.overlap_penalty / pairs as f64
}
