//! Tick runner and result recording.

use std::time::Duration;

use hn_core::NodeId;
use hn_network::Network;
use hn_solver::{Solution, solve};
use tracing::debug;

use crate::error::{SimError, SimResult};

/// Options for the tick loop.
#[derive(Clone, Debug)]
pub struct TickOptions {
    /// Nominal period between ticks. The runner does not sleep itself; the
    /// host's timer fires at this cadence and calls [`TickRunner::step`].
    pub period: Duration,
    /// Safety limit on total ticks driven through `run_ticks`.
    pub max_ticks: u64,
}

impl Default for TickOptions {
    fn default() -> Self {
        Self {
            period: Duration::from_millis(100),
            max_ticks: 100_000,
        }
    }
}

/// Record of solved ticks.
#[derive(Clone, Debug, Default)]
pub struct TickRecord {
    /// Tick numbers (monotonic, starting at 1).
    pub ticks: Vec<u64>,
    /// Solution snapshots, one per tick.
    pub solutions: Vec<Solution>,
}

/// Drives the pure solver once per tick over an owned network.
///
/// Ticks are serialized by construction: `step` takes `&mut self`, so a
/// tick's full iteration loop completes before another can begin. While
/// running, the only legal mutation is valve toggling; structural edits
/// must go through [`TickRunner::replace_network`] with the runner stopped.
#[derive(Debug)]
pub struct TickRunner {
    network: Network,
    opts: TickOptions,
    running: bool,
    ticks_run: u64,
}

impl TickRunner {
    /// Create a stopped runner over a validated network.
    pub fn new(network: Network, opts: TickOptions) -> SimResult<Self> {
        if opts.period.is_zero() {
            return Err(SimError::InvalidArg {
                what: "tick period must be positive",
            });
        }
        if opts.max_ticks == 0 {
            return Err(SimError::InvalidArg {
                what: "max_ticks must be positive",
            });
        }
        Ok(Self {
            network,
            opts,
            running: false,
            ticks_run: 0,
        })
    }

    /// The network currently being solved.
    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Total ticks solved since construction.
    pub fn ticks_run(&self) -> u64 {
        self.ticks_run
    }

    /// Mark the simulation running.
    pub fn start(&mut self) {
        self.running = true;
    }

    /// Mark the simulation stopped. Structural edits become legal again.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Toggle a valve. Legal in any state: each tick re-reads valve state
    /// fresh and the solver carries nothing across ticks.
    pub fn set_valve_open(&mut self, id: NodeId, open: bool) -> SimResult<()> {
        self.network.set_valve_open(id, open)?;
        Ok(())
    }

    /// Swap in a structurally edited network. Rejected while running:
    /// topology and diameter edits must not interleave with ticks.
    pub fn replace_network(&mut self, network: Network) -> SimResult<()> {
        if self.running {
            return Err(SimError::EditWhileRunning {
                what: "replace_network",
            });
        }
        self.network = network;
        Ok(())
    }

    /// Run one atomic tick and return its solution.
    pub fn step(&mut self) -> SimResult<Solution> {
        if !self.running {
            return Err(SimError::InvalidArg {
                what: "step on a stopped runner",
            });
        }
        let solution = solve(&self.network);
        self.ticks_run += 1;
        debug!(
            tick = self.ticks_run,
            iterations = solution.iterations,
            converged = solution.converged,
            "tick solved"
        );
        Ok(solution)
    }

    /// Run up to `n` ticks back to back (the host timer stands in for the
    /// nominal period), stopping early at the `max_ticks` safety limit.
    pub fn run_ticks(&mut self, n: u64) -> SimResult<TickRecord> {
        if n == 0 {
            return Err(SimError::InvalidArg {
                what: "run_ticks of zero ticks",
            });
        }

        let mut record = TickRecord::default();
        let mut done = 0;
        while done < n && self.ticks_run < self.opts.max_ticks {
            let solution = self.step()?;
            record.ticks.push(self.ticks_run);
            record.solutions.push(solution);
            done += 1;
        }
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hn_core::units::{bar, m};
    use hn_network::NetworkBuilder;

    fn valve_line() -> (Network, NodeId, NodeId) {
        let mut builder = NetworkBuilder::new();
        let r = builder.add_reservoir("R", bar(100.0));
        let v = builder.add_valve("V", false);
        let j = builder.add_junction("J");
        builder.add_pipe("RV", r, v, m(1.0));
        builder.add_pipe("VJ", v, j, m(1.0));
        (builder.build().unwrap(), v, j)
    }

    #[test]
    fn options_defaults() {
        let opts = TickOptions::default();
        assert_eq!(opts.period, Duration::from_millis(100));
        assert_eq!(opts.max_ticks, 100_000);
    }

    #[test]
    fn invalid_options_are_rejected() {
        let (network, _, _) = valve_line();
        let opts = TickOptions {
            period: Duration::ZERO,
            max_ticks: 10,
        };
        assert!(TickRunner::new(network, opts).is_err());
    }

    #[test]
    fn step_requires_running() {
        let (network, _, _) = valve_line();
        let mut runner = TickRunner::new(network, TickOptions::default()).unwrap();
        assert!(runner.step().is_err());

        runner.start();
        assert!(runner.step().is_ok());
        assert_eq!(runner.ticks_run(), 1);
    }

    #[test]
    fn valve_toggle_between_ticks_shows_up_next_tick() {
        let (network, v, j) = valve_line();
        let mut runner = TickRunner::new(network, TickOptions::default()).unwrap();
        runner.start();

        let blocked = runner.step().unwrap();
        assert_eq!(blocked.pressure(j), Some(0.0));

        runner.set_valve_open(v, true).unwrap();
        let flowing = runner.step().unwrap();
        assert!(flowing.pressure(j).unwrap() > 0.0);
    }

    #[test]
    fn structural_edits_only_while_stopped() {
        let (network, _, _) = valve_line();
        let mut runner = TickRunner::new(network.clone(), TickOptions::default()).unwrap();

        runner.start();
        assert!(matches!(
            runner.replace_network(network.clone()),
            Err(SimError::EditWhileRunning { .. })
        ));

        runner.stop();
        assert!(runner.replace_network(network).is_ok());
    }

    #[test]
    fn run_ticks_records_every_tick_up_to_the_cap() {
        let (network, _, _) = valve_line();
        let opts = TickOptions {
            max_ticks: 3,
            ..TickOptions::default()
        };
        let mut runner = TickRunner::new(network, opts).unwrap();
        runner.start();

        let record = runner.run_ticks(5).unwrap();
        assert_eq!(record.ticks, vec![1, 2, 3]);
        assert_eq!(record.solutions.len(), 3);
        assert_eq!(runner.ticks_run(), 3);
    }
}
