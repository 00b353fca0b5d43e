//! Command implementations

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::adapters::{MockProbeAdapter, TracingProgressAdapter};
use crate::app::container::{AppContainer, DefaultAppContainer};
use crate::app::session::CropSession;
use crate::cli::args::{
    parse_area, CropArgs, DimsArgs, InspectArgs, PreviewArgs, ProgressMode, SelectArgs,
    SelectionArgs,
};
use crate::command::{build_command, compute_output_dimensions};
use crate::domain::model::{MediaFile, ParentBox};
use crate::engine::progress::{ConsoleProgressCallback, JsonProgressCallback};
use crate::error::CropError;
use crate::output::default_output_path;
use crate::selector::input::InputEvent;
use crate::selector::AreaSelector;
use crate::utils::format_file_size;
use crate::utils::time::{format_time, parse_time};

/// Execute the crop command
pub async fn crop(container: &DefaultAppContainer, args: CropArgs) -> Result<()> {
    info!("Starting crop operation");
    info!("Input: {}", args.input.display());

    let mut session = container.session();
    prepare_session(&mut session, &args.input, &args.selection).await?;

    let tracker = session.tracker();
    tracker.add_callback(Arc::new(TracingProgressAdapter::default()));
    match args.progress {
        ProgressMode::Console => tracker.add_callback(Arc::new(ConsoleProgressCallback)),
        ProgressMode::Json => tracker.add_callback(Arc::new(JsonProgressCallback)),
        ProgressMode::None => {}
    }

    if let Some(preview) = session.command_preview() {
        debug!("Engine command: {}", preview);
    }

    let output_path = output_path_for(&args.input, args.output.as_deref());
    info!("Output: {}", output_path.display());

    let handle = session.cancel_handle();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, canceling crop");
            handle.cancel();
        }
    });

    let result = session.crop().await;
    interrupt.abort();

    let artifact = match result {
        Ok(artifact) => artifact,
        Err(CropError::EngineAborted) => bail!("Crop canceled"),
        Err(e) => return Err(e).context("Crop failed"),
    };

    let written = artifact
        .save_to(&output_path)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;
    info!(
        "Wrote {} ({})",
        output_path.display(),
        format_file_size(written)
    );
    println!("{}", output_path.display());
    Ok(())
}

#[derive(Serialize)]
struct PreviewReport {
    command: String,
    args: Vec<String>,
    area: String,
    output_width: u32,
    output_height: u32,
}

/// Execute the preview command
pub async fn preview(container: &DefaultAppContainer, args: PreviewArgs) -> Result<()> {
    let mut session = match (args.frame.as_deref(), args.duration) {
        (Some(frame), Some(duration)) => {
            let frame = ParentBox::parse(frame)?;
            debug!("Using the given frame and duration instead of probing");
            let probe = Arc::new(MockProbeAdapter::new(
                frame.width as u32,
                frame.height as u32,
                duration,
            ));
            DefaultAppContainer::with_parts(
                container.settings().clone(),
                probe,
                container.engine_factory(),
            )
            .session()
        }
        (None, None) => container.session(),
        _ => bail!("--frame and --duration must be given together"),
    };
    prepare_session(&mut session, &args.input, &args.selection).await?;

    let request = session.crop_request()?;
    let command = session
        .command_preview()
        .ok_or_else(|| anyhow!("No file loaded"))?;

    if args.json {
        let plan = request.command_plan();
        let (output_width, output_height) = plan.output_dimensions();
        let report = PreviewReport {
            command,
            args: build_command(&plan),
            area: session.area_text(),
            output_width,
            output_height,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", command);
    }
    Ok(())
}

#[derive(Serialize)]
struct SelectionReport {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    output_width: u32,
    output_height: u32,
    handled: usize,
    events: usize,
}

/// Execute the select command
pub fn select(args: SelectArgs) -> Result<()> {
    let frame = ParentBox::parse(&args.frame)?;
    let script = match &args.script {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display()))?,
        None => std::io::read_to_string(std::io::stdin()).context("Failed to read script from stdin")?,
    };
    let events: Vec<InputEvent> =
        serde_json::from_str(&script).context("Script must be a JSON array of input events")?;

    let mut selector = AreaSelector::attached(frame);
    let handled = events.iter().filter(|event| selector.handle(event)).count();
    debug!(handled, total = events.len(), "Replayed input events");

    let bbox = selector.bounding_box();
    let (output_width, output_height) = compute_output_dimensions(bbox.width, bbox.height, args.scale);

    if args.json {
        let report = SelectionReport {
            x: bbox.x,
            y: bbox.y,
            width: bbox.width,
            height: bbox.height,
            output_width,
            output_height,
            handled,
            events: events.len(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Area: {} x {} at ({}, {})", bbox.width, bbox.height, bbox.x, bbox.y);
        println!("Output Dimensions: {} x {}", output_width, output_height);
        println!("Handled: {} of {} events", handled, events.len());
    }
    Ok(())
}

/// Execute the dims command
pub fn dims(args: DimsArgs) -> Result<()> {
    let (width, height) = compute_output_dimensions(args.width, args.height, args.scale);
    println!("Output Dimensions: {} x {}", width, height);
    Ok(())
}

/// Execute the inspect command
pub async fn inspect(container: &DefaultAppContainer, args: InspectArgs) -> Result<()> {
    info!("Inspecting: {}", args.input.display());

    let media = container
        .probe()
        .probe(&args.input)
        .await
        .with_context(|| format!("Failed to inspect {}", args.input.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&media)?);
    } else {
        println!("File: {}", args.input.display());
        println!("Dimensions: {} x {}", media.width, media.height);
        println!("Duration: {}", format_time(media.duration));
    }
    Ok(())
}

/// Load `input` and apply the selection, trim and transform options
async fn prepare_session(
    session: &mut CropSession,
    input: &Path,
    selection: &SelectionArgs,
) -> Result<()> {
    let file = MediaFile::from_path(input);
    let loaded = session
        .load_files(std::slice::from_ref(&file))
        .await
        .map(|_| ());
    if let Err(e) = loaded {
        let message = session
            .banner()
            .message()
            .map(str::to_string)
            .unwrap_or_else(|| e.to_string());
        return Err(anyhow::Error::new(e).context(message));
    }

    if let Some(area) = selection.area.as_deref() {
        let bbox = parse_area(area)?;
        if !session.selector_mut().apply_geometry(bbox) {
            let frame = session
                .media()
                .map(|m| format!("{} x {}", m.width, m.height))
                .unwrap_or_default();
            bail!("Area {} does not fit the {} frame", area, frame);
        }
    }

    let start = selection.start.as_deref().map(parse_time).transpose()?;
    let end = selection.end.as_deref().map(parse_time).transpose()?;
    if let Some(controls) = session.controls_mut() {
        // End first, so a later start is checked against the new end
        if let Some(end) = end {
            if !controls.set_end(end) {
                bail!(
                    "End time {} must be after the start and within {}",
                    format_time(end),
                    format_time(controls.duration())
                );
            }
        }
        if let Some(start) = start {
            if !controls.set_start(start) {
                bail!(
                    "Start time {} must be before the end time {}",
                    format_time(start),
                    format_time(controls.end())
                );
            }
        }
    }

    if let Some(scale) = selection.scale {
        let applied = session.set_scale(scale);
        if applied != scale {
            warn!("Unusable scale {}, using {}", scale, applied);
        }
    }
    if selection.no_audio {
        session.set_remove_audio(true);
    }

    info!(
        area = %session.area_text(),
        output = %session.output_dimensions_text(),
        "Selection ready"
    );
    Ok(())
}

/// Resolve the output path for a crop of `input`
pub fn output_path_for(input: &Path, explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_path(input))
}
