//! Break a synthetic run down into the intervals of the embedded template.
//!
//! Run with: cargo run --example interval_breakdown
//!
//! Pass a JSON capture dump to analyze a real activity instead:
//! cargo run --example interval_breakdown -- path/to/capture.json

use workout_intervals::{
    build_training_data, embedded_template, format_pace, ActivityCapture, CaptureDecoder,
    GpsPoint, JsonCaptureDecoder, Sample, TrainingConfig,
};

/// An hour around a 400m track at alternating paces.
fn synthetic_run() -> ActivityCapture {
    let start_ms = 1_700_000_000_000;
    let center = GpsPoint::new(-23.5875, -46.6576); // Ibirapuera
    let radius_m = 400.0 / (2.0 * std::f64::consts::PI);
    let meters_per_degree = 111_195.0;

    let mut angle: f64 = 0.0;
    let samples = (0..3600)
        .map(|second| {
            // 4 min fast, 2 min easy
            let speed = if (second / 60) % 6 < 4 { 3.9 } else { 2.2 };
            angle += speed / radius_m;
            let mut sample = Sample::at(
                start_ms + second * 1_000,
                GpsPoint::new(
                    center.latitude + radius_m * angle.sin() / meters_per_degree,
                    center.longitude + radius_m * angle.cos() / meters_per_degree,
                ),
            );
            sample.speed = Some(speed);
            sample
        })
        .collect();

    ActivityCapture::new(start_ms, samples)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let capture = match std::env::args().nth(1) {
        Some(path) => JsonCaptureDecoder.decode(&std::fs::read(path)?)?,
        None => synthetic_run(),
    };

    let template = embedded_template()?;
    println!("Template: {}", template.title);
    println!("Samples:  {}\n", capture.samples.len());

    let data = build_training_data(&capture, &template, &TrainingConfig::default())?;

    println!("{:>3}  {:<10} {:<10} {:>8} {:>9} {:>7}", "#", "type", "intensity", "time", "distance", "pace");
    for (i, interval) in data.intervals.iter().enumerate() {
        let speed = interval.distance_meters / interval.duration_seconds;
        println!(
            "{:>3}  {:<10} {:<10} {:>7.0}s {:>8.0}m {:>7}",
            i + 1,
            format!("{:?}", interval.interval_type),
            format!("{:?}", interval.intensity),
            interval.duration_seconds,
            interval.distance_meters,
            format_pace(workout_intervals::pace_from_speed(speed)),
        );
    }

    let stats = &data.statistics;
    println!(
        "\nTotal: {:.2}km in {:.0}s, average pace {}/km",
        stats.total_distance / 1000.0,
        stats.total_time,
        format_pace(stats.average_pace)
    );

    let splits: Vec<String> = data
        .split_times_seconds
        .iter()
        .map(|s| format!("{:.0}s", s))
        .collect();
    println!("Kilometer splits: {}", splits.join(", "));

    Ok(())
}
