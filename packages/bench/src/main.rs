#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Latency benchmark for the analyze endpoint.
//!
//! Fires a fixed number of POST requests at each configured concurrency
//! level, records per-request wall-clock latency for successful responses
//! (failures are logged and excluded, never retried), and renders one
//! latency series per level to an SVG chart.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use clap::Parser;
use plotters::prelude::*;
use serde_json::json;

#[derive(Parser)]
#[command(about = "Measure analyze-endpoint latency under varying concurrency")]
struct Args {
    /// Analyze endpoint URL.
    #[arg(long, default_value = "http://127.0.0.1:8080/analyze")]
    url: String,

    /// Total requests per concurrency level.
    #[arg(long, default_value_t = 100)]
    requests: u64,

    /// Concurrency levels to exercise.
    #[arg(
        long = "concurrency",
        value_delimiter = ',',
        default_values_t = vec![1, 5, 10, 20, 50]
    )]
    concurrency: Vec<usize>,

    /// Prompt sent in each request body.
    #[arg(long, default_value = "Analyze crime trends in Chennai")]
    prompt: String,

    /// Output chart path.
    #[arg(long, default_value = "latency_plot.svg")]
    output: String,
}

/// Claims one request slot from the shared per-level budget.
fn claim(remaining: &AtomicU64) -> bool {
    remaining
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

/// Sends one request and returns its wall-clock latency, or `None` if the
/// request failed or came back non-2xx.
async fn measure_one(client: &reqwest::Client, url: &str, prompt: &str) -> Option<Duration> {
    let start = Instant::now();
    let result = client
        .post(url)
        .json(&json!({ "text": prompt }))
        .send()
        .await
        .and_then(reqwest::Response::error_for_status);

    match result {
        Ok(_) => Some(start.elapsed()),
        Err(e) => {
            log::warn!("Request failed: {e}");
            None
        }
    }
}

/// Runs one concurrency level: `workers` tasks drain a shared budget of
/// `args.requests` request slots and report successful latencies in
/// seconds.
async fn run_level(client: &reqwest::Client, args: &Args, workers: usize) -> Vec<f64> {
    let remaining = Arc::new(AtomicU64::new(args.requests));
    let mut handles = Vec::with_capacity(workers);

    for _ in 0..workers {
        let client = client.clone();
        let url = args.url.clone();
        let prompt = args.prompt.clone();
        let remaining = Arc::clone(&remaining);

        handles.push(tokio::spawn(async move {
            let mut latencies = Vec::new();
            while claim(&remaining) {
                if let Some(latency) = measure_one(&client, &url, &prompt).await {
                    latencies.push(latency.as_secs_f64());
                }
            }
            latencies
        }));
    }

    let mut all = Vec::new();
    for handle in handles {
        all.extend(handle.await.unwrap_or_default());
    }
    all
}

/// Renders one latency line series per concurrency level.
fn render_chart(
    path: &str,
    series: &[(usize, Vec<f64>)],
) -> Result<(), Box<dyn std::error::Error>> {
    let max_len = series.iter().map(|(_, l)| l.len()).max().unwrap_or(0);
    let max_latency = series
        .iter()
        .flat_map(|(_, l)| l.iter().copied())
        .fold(0.0_f64, f64::max);

    let root = SVGBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Latency of API Calls", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0..max_len.max(1), 0f64..(max_latency.max(0.001) * 1.1))?;

    chart
        .configure_mesh()
        .x_desc("Request Number")
        .y_desc("Latency (seconds)")
        .draw()?;

    for (i, (workers, latencies)) in series.iter().enumerate() {
        let color = Palette99::pick(i).to_rgba();
        chart
            .draw_series(LineSeries::new(
                latencies.iter().enumerate().map(|(x, y)| (x, *y)),
                &color,
            ))?
            .label(format!("{workers} concurrent users"))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
    }

    chart.configure_series_labels().border_style(&BLACK).draw()?;
    root.present()?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let args = Args::parse();
    let client = reqwest::Client::new();
    let mut series = Vec::new();

    for &workers in &args.concurrency {
        log::info!(
            "Sending {} requests with {workers} concurrent workers...",
            args.requests
        );
        let latencies = run_level(&client, &args, workers).await;
        log::info!(
            "{}/{} requests succeeded at concurrency {workers}",
            latencies.len(),
            args.requests
        );
        series.push((workers, latencies));
    }

    render_chart(&args.output, &series)?;
    log::info!("Wrote latency chart to {}", args.output);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_hands_out_exactly_the_budget() {
        let remaining = AtomicU64::new(100);
        let mut claimed = 0;
        while claim(&remaining) {
            claimed += 1;
        }
        assert_eq!(claimed, 100);
        // Budget stays exhausted.
        assert!(!claim(&remaining));
    }

    #[test]
    fn claim_on_zero_budget_yields_nothing() {
        let remaining = AtomicU64::new(0);
        assert!(!claim(&remaining));
    }
}
