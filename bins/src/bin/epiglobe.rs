// SPDX-License-Identifier: GPL-3.0-or-later

//!
//! *Part of the wider epiglobe project*
//!
//! Native tooling for epiglobe datasets: summarise a dataset, or replay the
//! globe's timeline headless and log what the widgets would have shown
//!

use clap::{Parser, Subcommand};
use epiglobe_core::{Dataset, MetricType, format_count};
use epiglobe_engine::{
    Event, EventBus, ManualScheduler, PlaybackConfig, PlaybackEngine, Scheduler, SeekRequest,
    Topic,
};
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, TermLogger, TerminalMode,
};
use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;

#[macro_use]
extern crate log;
extern crate simplelog;

type Engine = PlaybackEngine<Rc<ManualScheduler>>;

/// epiglobe entry point
///
/// One of:
/// - Print a summary of a dataset
/// - Replay the timeline of a dataset against a manual clock
fn main() {
    let args = Cli::parse();

    // Setup logging
    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let config_log = ConfigBuilder::new()
        .add_filter_allow_str("epiglobe")
        .build();
    if let Err(error) = CombinedLogger::init(vec![TermLogger::new(
        level,
        config_log,
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]) {
        eprintln!("Error setting up logging: {error}");
    }

    let result = match &args.command {
        Command::Inspect { dataset } => inspect(dataset),
        Command::Replay {
            dataset,
            metric,
            seek,
            play,
            config,
        } => replay(dataset, *metric, seek, *play, config.as_deref()),
    };

    if let Err(error) = result {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

/// epiglobe CLI args using [clap]
#[derive(Parser, Debug)]
#[command(
    version,
    about = "epiglobe tool for checking datasets and playback",
    after_help = "This is intended for use when preparing datasets and in CI"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log debug output too
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print a summary of the dataset at the path
    Inspect {
        /// Path to the dataset JSON
        dataset: PathBuf,
    },

    /// Grow the markers to the latest date, then make each seek in turn
    Replay {
        /// Path to the dataset JSON
        dataset: PathBuf,

        /// Metric to show (cases, active, deaths or recovered)
        #[arg(long)]
        metric: Option<MetricType>,

        /// Date to seek to (`YYYY-MM-DD`), may be repeated
        #[arg(long)]
        seek: Vec<String>,

        /// Press play once the seeks are done
        #[arg(long)]
        play: bool,

        /// Path to a playback config JSON
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn load_dataset(path: &Path) -> Result<Dataset, Box<dyn std::error::Error>> {
    info!("Loading dataset from {}", path.display());
    let json = std::fs::read_to_string(path)?;
    let dataset = Dataset::from_json(&json)?;
    dataset.log_summary();
    Ok(dataset)
}

fn inspect(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = load_dataset(path)?;
    let range = dataset.range();

    println!(
        "{} to {} ({} days)",
        range.start(),
        range.end(),
        range.len()
    );
    println!(
        "{} entities, {} markers",
        dataset.entities().len(),
        dataset.total_points()
    );
    for metric in MetricType::ALL {
        let total = dataset.total_at(metric, range.end());
        println!("{metric}: {}", format_count(total));
    }
    for entity in dataset.entities() {
        let population = entity
            .population()
            .map(|population| format_count(population as f64))
            .unwrap_or_else(|| String::from("unknown"));
        println!(
            "  {} {} ({} to {}, population {population}, {} markers)",
            entity.id(),
            entity.name(),
            entity.local_range().start(),
            entity.local_range().end(),
            entity.coordinates().len()
        );
    }
    Ok(())
}

fn replay(
    path: &Path,
    metric: Option<MetricType>,
    seeks: &[String],
    play: bool,
    config: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = Rc::new(load_dataset(path)?);
    let config = match config {
        Some(path) => PlaybackConfig::load(path)?,
        None => PlaybackConfig::default(),
    };

    let bus = Rc::new(EventBus::new());
    let clock = Rc::new(ManualScheduler::new());
    let engine = Rc::new(RefCell::new(PlaybackEngine::new(
        dataset,
        Rc::clone(&bus),
        Rc::clone(&clock),
        config,
    )));
    PlaybackEngine::connect(&engine);
    let renders = log_widgets(&bus, &clock);

    engine.borrow_mut().start();
    run(&engine, &clock);

    if let Some(metric) = metric {
        bus.publish(Event::MetricChanged(metric))?;
        run(&engine, &clock);
    }
    for text in seeks {
        bus.publish(Event::SeekRequested(SeekRequest::TextInput(text.clone())))?;
        run(&engine, &clock);
    }
    if play {
        bus.publish(Event::SeekRequested(SeekRequest::Latest))?;
        run(&engine, &clock);
    }

    let engine = engine.borrow();
    let state = engine.state();
    println!(
        "Finished at {} showing {} after {}ms ({} renders, {} marker writes)",
        state.current_date,
        engine.metric(),
        clock.now(),
        renders.get(),
        engine.field().write_count()
    );
    Ok(())
}

/// Tick the engine until its animation (and any chained one) has finished
fn run(engine: &Rc<RefCell<Engine>>, clock: &ManualScheduler) {
    let ticks = clock.drive(|| engine.borrow_mut().tick());
    debug!("Animation finished after {ticks} ticks");
}

/// Log what the slider, date input and total label are told, returning a
/// count of the renders requested
fn log_widgets(bus: &EventBus, clock: &Rc<ManualScheduler>) -> Rc<Cell<usize>> {
    let time = Rc::clone(clock);
    bus.subscribe(Topic::SliderSync, move |event| {
        if let Event::SliderSync(index) = event {
            debug!("{:>6}ms slider {index}", time.now());
        }
    });

    let time = Rc::clone(clock);
    bus.subscribe(Topic::DateTextSync, move |event| {
        if let Event::DateTextSync(date) = event {
            info!("{:>6}ms date {date}", time.now());
        }
    });

    bus.subscribe(Topic::MetricTotalChanged, |event| {
        if let Event::MetricTotalChanged { metric, label, .. } = event {
            debug!("total {metric}: {label}");
        }
    });

    let renders = Rc::new(Cell::new(0));
    let count = Rc::clone(&renders);
    bus.subscribe(Topic::RenderNeeded, move |_| {
        count.set(count.get() + 1);
    });
    renders
}
