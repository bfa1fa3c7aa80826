//! Demo runner binary.
//!
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use common::protocol::SessionStart;
use env_logger::TimestampPrecision;
use stability_classifier::{StabilityClassifier, TargetPicker};
use tm_demo::{
    meter::spawn_meter_logger,
    model::{load_model, Model, ModelLocator, ModelSource, DEFAULT_MODEL_BASE_URL},
    recording::{spawn_replay, write_recording, Pace, RecordingReader, Script, ScriptSegment},
    session::Session,
    tick_channel,
    variant::Variant,
};

#[derive(Parser, Debug)]
#[clap(author, version)]
struct Args {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a recording through one of the demo pages
    Run(RunArgs),
    /// Write a recording from label:duration_ms segments
    Script(ScriptArgs),
    /// Print the label set of a model
    Labels(ModelArgs),
}

#[derive(ClapArgs, Debug)]
struct ModelArgs {
    /// Teachable Machine model id to download
    #[clap(long, conflicts_with = "model_dir")]
    model_id: Option<String>,

    /// Directory holding an exported model
    #[clap(long)]
    model_dir: Option<PathBuf>,

    /// Base URL models are downloaded from
    #[clap(long, default_value = DEFAULT_MODEL_BASE_URL)]
    model_base_url: String,

    /// Where downloaded models are cached
    #[clap(long)]
    cache_dir: Option<PathBuf>,
}

impl ModelArgs {
    fn source(&self) -> Option<ModelSource> {
        match (&self.model_id, &self.model_dir) {
            (_, Some(dir)) => Some(ModelSource::Local(dir.clone())),
            (Some(model_id), None) => Some(ModelSource::Remote {
                locator: ModelLocator::new(&self.model_base_url),
                model_id: model_id.clone(),
                cache_dir: self.cache_dir.clone(),
            }),
            (None, None) => None,
        }
    }

    async fn load(&self) -> Result<Option<Model>> {
        match self.source() {
            Some(source) => Ok(Some(load_model(&source).await?)),
            None => Ok(None),
        }
    }
}

#[derive(ClapArgs, Debug)]
struct RunArgs {
    /// Demo page to run
    #[clap(long, value_enum)]
    variant: Variant,

    /// Recording to replay
    #[clap(long)]
    recording: PathBuf,

    #[clap(flatten)]
    model: ModelArgs,

    /// Keep the recorded spacing between ticks
    #[clap(long)]
    realtime: bool,

    /// Seed for target selection
    #[clap(long)]
    seed: Option<u64>,

    /// Override the page's dwell time
    #[clap(long)]
    min_dwell_ms: Option<u64>,

    /// Override the page's grace period
    #[clap(long)]
    grace_ms: Option<u64>,

    /// Override the page's hold-to-complete duration
    #[clap(long)]
    hold_ms: Option<u64>,

    /// Override the page's minimum prediction score
    #[clap(long)]
    min_score: Option<f32>,
}

#[derive(ClapArgs, Debug)]
struct ScriptArgs {
    /// Label set in model order, taken from the model when not given
    #[clap(long, value_delimiter = ',')]
    labels: Vec<String>,

    #[clap(flatten)]
    model: ModelArgs,

    /// Frames per second
    #[clap(long, default_value = "30")]
    fps: u32,

    /// Recording to write
    #[clap(long)]
    out: PathBuf,

    /// Model id stored in the recording header
    #[clap(long, default_value = "scripted")]
    session_model_id: String,

    /// Segments such as `warrior:6000`
    #[clap(required = true)]
    segments: Vec<ScriptSegment>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logger
    env_logger::builder()
        .format_timestamp(Some(TimestampPrecision::Millis))
        .init();

    match args.command {
        Command::Run(args) => run(args).await,
        Command::Script(args) => script(args).await,
        Command::Labels(args) => labels(args).await,
    }
}

async fn run(args: RunArgs) -> Result<()> {
    let reader = RecordingReader::open(&args.recording).await?;
    let recorded = reader.session_start().clone();

    let labels = match args.model.load().await? {
        Some(model) => {
            if model.labels() != recorded.labels.as_slice() {
                bail!(
                    "recording labels {:?} do not match model {} labels {:?}",
                    &recorded.labels,
                    &model.id,
                    model.labels()
                );
            }
            model.metadata.labels
        }
        None => {
            log::warn!(
                "No model given, using labels of recorded model {}",
                &recorded.model_id
            );
            recorded.labels
        }
    };

    let mut config = args.variant.config(labels);
    if let Some(min_dwell_ms) = args.min_dwell_ms {
        config.min_dwell_ms = min_dwell_ms;
    }
    if let Some(grace_ms) = args.grace_ms {
        config.grace_ms = grace_ms;
    }
    if let Some(hold_ms) = args.hold_ms {
        config.hold_to_complete_ms = hold_ms;
    }
    if let Some(min_score) = args.min_score {
        config.min_score = min_score;
    }
    log::info!("Running {:?} with {:?}", args.variant, &config);

    let picker = match args.seed {
        Some(seed) => TargetPicker::seeded(seed),
        None => TargetPicker::from_entropy(),
    };
    let classifier = StabilityClassifier::with_picker(config, picker)?;
    let session = Session::new(classifier, args.variant.renderer());

    spawn_meter_logger();

    let pace = match args.realtime {
        true => Pace::Realtime,
        false => Pace::Unpaced,
    };
    let (tx, rx) = tick_channel();
    let replay = spawn_replay(reader, tx, pace);

    let summary = session.run(rx).await;
    let replayed = replay.await;

    println!("ticks: {} ({} rejected)", summary.ticks, summary.rejected);
    for event in summary.events.iter() {
        println!("{event}");
    }
    if let Some(target) = summary.target {
        println!("target: {target}");
    }
    println!("board: {}", summary.board);

    match replayed {
        Ok(Ok(sent)) => log::debug!("Replayed {sent} ticks"),
        Ok(Err(e)) => log::warn!("Replay stopped early: {e:#}"),
        Err(e) => log::warn!("Replay task failed: {e}"),
    }

    Ok(())
}

async fn script(args: ScriptArgs) -> Result<()> {
    let labels = match args.labels.is_empty() {
        false => args.labels,
        true => match args.model.load().await? {
            Some(model) => model.metadata.labels,
            None => bail!("pass --labels or a model to take them from"),
        },
    };

    let ticks = Script::new(args.segments, args.fps)?.render(&labels)?;
    let count = ticks.len();
    write_recording(
        &args.out,
        SessionStart::new(args.session_model_id, labels),
        ticks,
    )
    .await?;

    log::info!("Wrote {} ticks to {}", count, args.out.display());
    Ok(())
}

async fn labels(args: ModelArgs) -> Result<()> {
    let Some(model) = args.load().await? else {
        bail!("pass --model-id or --model-dir");
    };

    for label in model.labels() {
        println!("{label}");
    }
    Ok(())
}
