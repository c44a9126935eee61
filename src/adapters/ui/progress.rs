//! Spinners shown while a store view is `loading`.

use crate::domain::DataStatus;
use crate::usecases::{Pending, View};
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::time::Duration;

/// Spin on one line while `fut` runs, then clear it.
pub async fn spin<F: Future>(message: &str, fut: F) -> F::Output {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.magenta} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    let out = fut.await;
    pb.finish_and_clear();
    out
}

/// Wait for a view to settle; no spinner when nothing is in flight.
pub async fn settle<T: Clone>(mut view: View<DataStatus<T>>, message: &str) -> DataStatus<T> {
    if !view.snapshot().is_loading() {
        return view.snapshot();
    }
    spin(message, view.settled()).await
}

/// Wait for a single mutation to report back.
pub async fn outcome<T: Default>(pending: Pending<T>, message: &str) -> DataStatus<T> {
    spin(message, pending.outcome()).await
}
