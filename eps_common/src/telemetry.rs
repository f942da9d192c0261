//! Telemetry sink boundary (§6, §7 "User-visible behavior").
//!
//! Implementations may route to UART, SD, or downlink buffers; ordering
//! per panel must be preserved. All methods are infallible by design — a
//! transport that can fail swallows its own error (typically via
//! `tracing::warn!`) rather than bubbling it into the RT path, matching
//! §7's "FSM state transitions are never undone on telemetry failure".

/// Periodic telemetry sink for per-panel observability (§6).
pub trait TelemetrySink {
    /// Routine per-tick telemetry line: measured voltage/current/power.
    fn send_telemetry(&mut self, panel: u8, voltage: f32, current: f32, power: f32);

    /// Emitted on ENABLED → TRIPPED and RECOVERY → TRIPPED (§4.6).
    fn send_telemetry_alert(&mut self, panel: u8, power: f32, voltage: f32);

    /// Emitted exactly once on RECOVERY → DISABLED success (§4.6).
    fn send_telemetry_success(&mut self, panel: u8);

    /// Free-form structured log line (hardware timeouts, persistence
    /// errors, config rejections). Default forwards to `tracing::info!`.
    fn log_event(&mut self, panel: Option<u8>, message: &str) {
        match panel {
            Some(panel) => tracing::info!(panel, "{message}"),
            None => tracing::info!("{message}"),
        }
    }
}
