//! Presence sweep counters. HTTP and pool metrics live in the shared libs.

use lazy_static::lazy_static;
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

use crate::services::PresenceSweep;

lazy_static! {
    pub static ref PRESENCE_SWEEPS_TOTAL: IntCounter = register_int_counter!(
        "chat_presence_sweeps_total",
        "Number of completed presence sweeps"
    )
    .expect("Prometheus metrics registration should succeed at startup");
    pub static ref PRESENCE_SWEEP_ERRORS_TOTAL: IntCounter = register_int_counter!(
        "chat_presence_sweep_errors_total",
        "Number of presence sweeps that failed"
    )
    .expect("Prometheus metrics registration should succeed at startup");
    pub static ref PRESENCE_TRANSITIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "chat_presence_transitions_total",
        "Users flipped by presence sweeps",
        &["direction"]
    )
    .expect("Prometheus metrics registration should succeed at startup");
}

pub fn record_sweep(sweep: &PresenceSweep) {
    PRESENCE_SWEEPS_TOTAL.inc();
    PRESENCE_TRANSITIONS_TOTAL
        .with_label_values(&["online"])
        .inc_by(sweep.went_online);
    PRESENCE_TRANSITIONS_TOTAL
        .with_label_values(&["offline"])
        .inc_by(sweep.went_offline);
}

pub fn record_sweep_error() {
    PRESENCE_SWEEP_ERRORS_TOTAL.inc();
}
