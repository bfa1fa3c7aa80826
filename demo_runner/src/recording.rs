//! Prediction recordings: the capture source of a demo session.
//!
//! Frames are length-delimited, bincode-encoded [`ProtoMsg`]s, starting with a
//! [`SessionStart`] header. A [`Script`] renders `label:duration_ms` segments
//! into ticks so recordings can be produced without a camera.
use std::{path::Path, str::FromStr, time::Duration};

use anyhow::{bail, Context, Result};
use bytes::Bytes;
use common::protocol::{ProtoMsg, SessionStart, TickMsg};
use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::{fs::File, task::JoinHandle, time::Instant};
use tokio_util::codec::{FramedRead, FramedWrite, LengthDelimitedCodec};

use crate::TickSender;

/// Score given to the scripted label; the rest is shared by the others.
const SCRIPTED_SCORE: f32 = 0.85;
/// Longest script that will be rendered, one hour.
const MAX_SCRIPT_MS: u64 = 60 * 60 * 1000;

pub struct RecordingWriter {
    transport: FramedWrite<File, LengthDelimitedCodec>,
}

impl RecordingWriter {
    pub async fn create(path: impl AsRef<Path>, start: SessionStart) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)
            .await
            .with_context(|| format!("failed to create {}", path.display()))?;

        let mut writer = Self {
            transport: FramedWrite::new(file, LengthDelimitedCodec::new()),
        };
        writer.send(&ProtoMsg::SessionStart(start)).await?;

        Ok(writer)
    }

    pub async fn write_tick(&mut self, tick: TickMsg) -> Result<()> {
        self.send(&ProtoMsg::Tick(tick)).await
    }

    /// Flush and close the file.
    pub async fn finish(mut self) -> Result<()> {
        SinkExt::<Bytes>::close(&mut self.transport).await?;
        Ok(())
    }

    async fn send(&mut self, msg: &ProtoMsg) -> Result<()> {
        let data = msg.serialize()?;
        self.transport.send(Bytes::from(data)).await?;
        Ok(())
    }
}

pub struct RecordingReader {
    transport: FramedRead<File, LengthDelimitedCodec>,
    start: SessionStart,
}

impl RecordingReader {
    /// Open a recording and read its header.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .await
            .with_context(|| format!("failed to open {}", path.display()))?;
        let mut transport = FramedRead::new(file, LengthDelimitedCodec::new());

        let start = match transport.next().await {
            Some(Ok(data)) => match ProtoMsg::deserialize(&data) {
                Ok(ProtoMsg::SessionStart(start)) => start,
                Ok(other) => bail!("recording starts with {other:?} instead of a header"),
                Err(e) => bail!("undecodable recording header: {e}"),
            },
            Some(Err(e)) => bail!("failed to read recording header: {e}"),
            None => bail!("empty recording {}", path.display()),
        };

        Ok(Self { transport, start })
    }

    pub fn session_start(&self) -> &SessionStart {
        &self.start
    }

    /// Next tick, or `None` at the end of the recording.
    ///
    /// Undecodable frames are logged and skipped. A frame that cannot be read,
    /// such as the truncated tail of an interrupted recording, ends it.
    pub async fn next_tick(&mut self) -> Result<Option<TickMsg>> {
        while let Some(frame) = self.transport.next().await {
            let frame = match frame {
                Ok(frame) => frame,
                Err(e) => {
                    log::warn!("Recording ends with an unreadable frame: {e}");
                    return Ok(None);
                }
            };
            match ProtoMsg::deserialize(&frame) {
                Ok(ProtoMsg::Tick(tick)) => return Ok(Some(tick)),
                Ok(ProtoMsg::SessionStart(_)) => log::warn!("Skipping repeated session header"),
                Err(e) => log::warn!("Skipping undecodable frame: {e}"),
            }
        }
        Ok(None)
    }
}

/// Replay speed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Pace {
    /// Push ticks as fast as the session consumes them.
    Unpaced,
    /// Keep the recorded spacing between ticks.
    Realtime,
}

/// Spawn a task pushing the recording's ticks into `tx`.
///
/// Resolves to the number of ticks sent. Stops early, without error, when the
/// receiving session goes away.
pub fn spawn_replay(
    mut reader: RecordingReader,
    tx: TickSender,
    pace: Pace,
) -> JoinHandle<Result<usize>> {
    tokio::spawn(async move {
        let started = Instant::now();
        let mut first_ms = None;
        let mut sent = 0;

        while let Some(tick) = reader.next_tick().await? {
            if pace == Pace::Realtime {
                let first_ms = *first_ms.get_or_insert(tick.time_ms);
                let offset = Duration::from_millis(tick.time_ms.saturating_sub(first_ms));
                tokio::time::sleep_until(started + offset).await;
            }

            if tx.send(tick).await.is_err() {
                log::info!("Session closed, stopping replay after {sent} ticks");
                break;
            }
            sent += 1;
        }

        log::debug!("Replay finished after {sent} ticks");
        Ok::<_, anyhow::Error>(sent)
    })
}

#[derive(Debug, Error, PartialEq)]
pub enum ScriptError {
    #[error("segment {0:?} is not of the form label:duration_ms")]
    BadSegment(String),
    #[error("label {0:?} is not in the label set")]
    UnknownLabel(String),
    #[error("frame rate must be positive")]
    ZeroFps,
    #[error("script is longer than {max_ms}ms")]
    TooLong { max_ms: u64 },
}

/// A label held for a duration.
#[derive(Clone, Debug, PartialEq)]
pub struct ScriptSegment {
    pub label: String,
    pub duration_ms: u64,
}

impl FromStr for ScriptSegment {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad_segment = || ScriptError::BadSegment(s.to_owned());

        let (label, duration) = s.rsplit_once(':').ok_or_else(bad_segment)?;
        let duration_ms = duration.trim().parse().map_err(|_| bad_segment())?;
        if label.is_empty() {
            return Err(bad_segment());
        }

        Ok(Self {
            label: label.to_owned(),
            duration_ms,
        })
    }
}

/// Sequence of segments rendered at a fixed frame rate.
#[derive(Clone, Debug)]
pub struct Script {
    segments: Vec<ScriptSegment>,
    frame_interval_ms: u64,
}

impl Script {
    pub fn new(segments: Vec<ScriptSegment>, fps: u32) -> Result<Self, ScriptError> {
        if fps == 0 {
            return Err(ScriptError::ZeroFps);
        }
        Ok(Self {
            segments,
            frame_interval_ms: (1000 / u64::from(fps)).max(1),
        })
    }

    /// Render ticks starting at time zero.
    ///
    /// Every segment yields at least one tick and the frame cadence carries
    /// across segment boundaries. Scripts may not run past one hour.
    pub fn render(&self, labels: &[String]) -> Result<Vec<TickMsg>, ScriptError> {
        let mut ticks = Vec::new();
        let mut now_ms: u64 = 0;

        for segment in self.segments.iter() {
            let index = labels
                .iter()
                .position(|label| label == &segment.label)
                .ok_or_else(|| ScriptError::UnknownLabel(segment.label.clone()))?;
            let scores = scripted_scores(labels.len(), index);

            let end_ms = now_ms
                .checked_add(segment.duration_ms)
                .filter(|end_ms| *end_ms <= MAX_SCRIPT_MS)
                .ok_or(ScriptError::TooLong {
                    max_ms: MAX_SCRIPT_MS,
                })?;
            loop {
                ticks.push(TickMsg::new(now_ms, scores.clone()));
                now_ms += self.frame_interval_ms;
                if now_ms >= end_ms {
                    break;
                }
            }
        }

        Ok(ticks)
    }
}

fn scripted_scores(num_labels: usize, index: usize) -> Vec<f32> {
    if num_labels == 1 {
        return vec![1.0];
    }
    let rest = (1.0 - SCRIPTED_SCORE) / (num_labels - 1) as f32;
    (0..num_labels)
        .map(|i| if i == index { SCRIPTED_SCORE } else { rest })
        .collect()
}

/// Write a complete recording in one go.
pub async fn write_recording(
    path: impl AsRef<Path>,
    start: SessionStart,
    ticks: Vec<TickMsg>,
) -> Result<()> {
    let mut writer = RecordingWriter::create(path, start).await?;
    for tick in ticks {
        writer.write_tick(tick).await?;
    }
    writer.finish().await
}
