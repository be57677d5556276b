use std::{
    io::{stdout, Write},
    thread,
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

use args::Args;
use common::{
    misc::{human_duration, human_volume},
    progress::Progress,
};
use hollow::{
    format,
    hollow::{hollow_file, hollow_with_progress},
    HollowParams, HollowStats,
};

mod args;

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        LevelFilter::TRACE
    } else {
        LevelFilter::INFO
    };
    let filter = filter::Targets::new()
        .with_default(LevelFilter::OFF)
        .with_target("hollow", level)
        .with_target("common", level);
    let format = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();

    let config = args.hollow_config();
    let params = HollowParams::from(&config);

    println!(
        "Hollowing `{}` with {:.2}mm walls.",
        config.input.display(),
        params.wall_thickness
    );

    // Hollowing is multithreaded, so run it off the main thread and report
    // progress from here.
    let progress = Progress::new();
    let job = {
        let progress = progress.clone();
        let (input, output) = (config.input.clone(), config.output.clone());
        let dry_run = args.dry_run;
        thread::spawn(move || {
            if dry_run {
                let mesh = format::load_mesh(&input)?;
                hollow_with_progress(&mesh, &params, &progress)
            } else {
                hollow_file(&input, &output, &params, &progress)
            }
        })
    };

    while !job.is_finished() {
        print!("\rHollowing: {:.1}%", progress.progress() * 100.0);
        stdout().flush()?;
        thread::sleep(Duration::from_millis(50));
    }
    println!();

    let hollowed = match job.join() {
        Ok(result) => result
            .with_context(|| format!("Failed to hollow `{}`", config.input.display()))?,
        Err(_) => anyhow::bail!("Hollowing thread panicked"),
    };

    print_stats(&hollowed.stats);
    if args.dry_run {
        println!("Dry run, nothing written.");
    } else {
        println!("Wrote `{}`.", config.output.display());
    }

    Ok(())
}

fn print_stats(stats: &HollowStats) {
    println!(
        "Hollowed with {} walls of {:.2}mm in {}.",
        stats.method,
        stats.wall_thickness,
        human_duration(stats.elapsed)
    );
    if let Some(thickness) = stats.min_local_thickness {
        println!(" \\ Thinnest section: {thickness:.2}mm");
    }
    if let Some(scale) = stats.scale_factor {
        println!(" \\ Cavity scale: {scale:.3}");
    }
    println!(" \\ Thinnest wall: {:.2}mm", stats.min_wall);
    println!(
        " \\ Volume: {} -> {} ({:.1}% material saved)",
        human_volume(stats.input_volume),
        human_volume(stats.output_volume),
        stats.material_savings() * 100.0
    );
    println!(
        " \\ Faces: {} -> {}, vertices: {} -> {}",
        stats.input_faces, stats.output_faces, stats.input_vertices, stats.output_vertices
    );
}
