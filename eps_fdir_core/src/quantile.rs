//! P² online quantile estimator (Jain & Chlamtac, 1985) (§4.4).
//!
//! Tracks a single target quantile (e.g. the 99th percentile of a
//! residual distribution) in five markers, with O(1) update and no
//! stored sample history beyond a 5-element initialization buffer.

use eps_common::persistence::QuantileSnapshot;

/// Per-panel P² quantile tracker (§3 "P2Quantile").
#[derive(Debug, Clone, Copy)]
pub struct P2Quantile {
    q: [f64; 5],
    n_ideal: [f64; 5],
    n_actual: [u32; 5],
    count: u32,
    p: f64,
    initialized: bool,
    init_buffer: [f64; 5],
    init_count: u8,
}

impl P2Quantile {
    /// Create a tracker for target quantile `p` (`0 < p < 1`).
    pub fn new(p: f64) -> Self {
        Self {
            q: [0.0; 5],
            n_ideal: [0.0; 5],
            n_actual: [0; 5],
            count: 0,
            p,
            initialized: false,
            init_buffer: [0.0; 5],
            init_count: 0,
        }
    }

    /// Feed one observation into the estimator.
    pub fn update(&mut self, value: f64) {
        if self.init_count < 5 {
            self.init_buffer[self.init_count as usize] = value;
            self.init_count += 1;
            if self.init_count == 5 {
                self.init_buffer.sort_by(f64::total_cmp);
                for i in 0..5 {
                    self.q[i] = self.init_buffer[i];
                    self.n_actual[i] = i as u32 + 1;
                }
                self.n_ideal[0] = 1.0;
                self.n_ideal[1] = 1.0 + 2.0 * self.p;
                self.n_ideal[2] = 1.0 + 4.0 * self.p;
                self.n_ideal[3] = 3.0 + 2.0 * self.p;
                self.n_ideal[4] = 5.0;
                self.count = 5;
                self.initialized = true;
            }
            return;
        }

        let k = if value < self.q[0] {
            self.q[0] = value;
            0usize
        } else if value >= self.q[4] {
            self.q[4] = value;
            3usize
        } else {
            let mut found = 3usize;
            for i in 1..5 {
                if value < self.q[i] {
                    found = i - 1;
                    break;
                }
            }
            found
        };

        for i in (k + 1)..5 {
            self.n_actual[i] += 1;
        }

        self.count += 1;
        let n = self.count as f64;
        self.n_ideal[1] = 1.0 + 2.0 * self.p * (n - 1.0);
        self.n_ideal[2] = 1.0 + 4.0 * self.p * (n - 1.0);
        self.n_ideal[3] = 3.0 + 2.0 * self.p * (n - 1.0);
        self.n_ideal[4] = n;

        for i in 1..4 {
            let d = self.n_ideal[i] - self.n_actual[i] as f64;
            let can_move_up = d >= 1.0 && (self.n_actual[i + 1] as i64 - self.n_actual[i] as i64) > 1;
            let can_move_down =
                d <= -1.0 && (self.n_actual[i - 1] as i64 - self.n_actual[i] as i64) < -1;
            if can_move_up || can_move_down {
                let d_sign: i64 = if d >= 0.0 { 1 } else { -1 };

                let n_im1 = self.n_actual[i - 1] as f64;
                let n_i = self.n_actual[i] as f64;
                let n_ip1 = self.n_actual[i + 1] as f64;
                let q_im1 = self.q[i - 1];
                let q_i = self.q[i];
                let q_ip1 = self.q[i + 1];
                let ds = d_sign as f64;

                let q_new = q_i
                    + ds / (n_ip1 - n_im1)
                        * ((n_i - n_im1 + ds) * (q_ip1 - q_i) / (n_ip1 - n_i)
                            + (n_ip1 - n_i - ds) * (q_i - q_im1) / (n_i - n_im1));

                if q_im1 < q_new && q_new < q_ip1 {
                    self.q[i] = q_new;
                } else {
                    let neighbor = (i as i64 + d_sign) as usize;
                    self.q[i] = q_i
                        + ds * (self.q[neighbor] - q_i)
                            / (self.n_actual[neighbor] as f64 - n_i);
                }
                self.n_actual[i] = (self.n_actual[i] as i64 + d_sign) as u32;
            }
        }
    }

    /// Current estimate of the target quantile, `0.0` before
    /// initialization has completed.
    #[inline]
    pub fn value(&self) -> f64 {
        if self.initialized {
            self.q[2]
        } else {
            0.0
        }
    }

    /// Whether the 5-sample initialization phase has completed.
    #[inline]
    pub const fn ready(&self) -> bool {
        self.initialized
    }

    pub(crate) fn snapshot(&self) -> QuantileSnapshot {
        QuantileSnapshot {
            q: self.q,
            n_ideal: self.n_ideal,
            n_actual: self.n_actual,
            count: self.count,
            initialized: self.initialized,
        }
    }

    pub(crate) fn restore(&mut self, snapshot: &QuantileSnapshot) {
        self.q = snapshot.q;
        self.n_ideal = snapshot.n_ideal;
        self.n_actual = snapshot.n_actual;
        self.count = snapshot.count;
        self.initialized = snapshot.initialized;
        self.init_count = if snapshot.initialized { 5 } else { 0 };
    }
}
