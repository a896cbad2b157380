mod capture;
mod compositing;
mod constants;
mod control;
mod error;
mod output;
mod pipeline;
mod segmentation;

use anyhow::{Context, Result};
use capture::{DepthCapture, DepthSource};
use clap::Parser;
use compositing::BackgroundProvider;
use constants::{OUTPUT_HEIGHT, OUTPUT_WIDTH, WORKING_SIZE};
use control::{Command, CommandSource, Params, StdinCommands};
use image::RgbImage;
use output::{letterbox, OutputSink, PixelLayout, Preview, PreviewWindow, V4L2Output};
use pipeline::FramePipeline;
use segmentation::{mask_to_rgb, Preprocessor};
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Color stream device index
    #[arg(short, long, default_value_t = 0)]
    color_device: u32,

    /// Disparity stream device path (8-bit GREY, values 0-95)
    #[arg(short, long, default_value = "/dev/video1")]
    disparity_device: PathBuf,

    /// Output v4l2loopback device path
    #[arg(short, long, default_value = "/dev/video10")]
    output_device: PathBuf,

    /// Pixel layout written to the loopback device
    #[arg(long, value_enum, default_value_t = PixelLayout::Yuyv)]
    pixel_layout: PixelLayout,

    /// Target frames per second
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(1..))]
    fps: u32,

    /// Path to background image file
    /// If not provided, a blurred copy of the camera frame is used
    #[arg(short, long)]
    background: Option<PathBuf>,

    /// Run without the preview window and read commands from stdin
    #[arg(long)]
    no_preview: bool,

    /// Show the mask (grayscale) in the preview instead of the composite
    #[arg(long)]
    show_mask: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Start mirrored
    #[arg(long)]
    mirror: bool,

    /// Initial focus threshold
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(i32).range(0..=256))]
    focus: i32,

    /// Initial half-width of the translucent band
    #[arg(long, default_value_t = 40, value_parser = clap::value_parser!(i32).range(0..=256))]
    translucent_size: i32,

    /// Initial median blur kernel size (odd)
    #[arg(long, default_value_t = 67, value_parser = parse_odd)]
    blur: u32,

    /// Initial dilation iterations
    #[arg(long, default_value_t = 4)]
    dilate: u32,
}

impl Args {
    fn initial_params(&self) -> Params {
        Params {
            mirror: self.mirror,
            focus: self.focus,
            translucent_size: self.translucent_size,
            blur: self.blur,
            dilate: self.dilate,
        }
    }
}

fn parse_odd(value: &str) -> Result<u32, String> {
    let n: u32 = value.parse().map_err(|e| format!("{}", e))?;
    if n % 2 == 1 {
        Ok(n)
    } else {
        Err(format!("{} is not an odd number", n))
    }
}

/// Where the operator sees the preview and types commands
enum Console {
    Window(PreviewWindow),
    Headless(StdinCommands),
}

impl CommandSource for Console {
    fn poll(&mut self) -> Vec<char> {
        match self {
            Console::Window(window) => window.poll(),
            Console::Headless(stdin) => stdin.poll(),
        }
    }

    fn is_open(&self) -> bool {
        match self {
            Console::Window(window) => window.is_open(),
            Console::Headless(stdin) => stdin.is_open(),
        }
    }
}

impl Preview for Console {
    fn show(&mut self, frame: &RgbImage) -> Result<()> {
        match self {
            Console::Window(window) => window.show(frame),
            Console::Headless(_) => Ok(()),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    tracing::info!("Depthmatte starting");
    tracing::info!("Working resolution: {}x{}", WORKING_SIZE, WORKING_SIZE);
    tracing::info!("Output: {}x{} {:?}", OUTPUT_WIDTH, OUTPUT_HEIGHT, args.pixel_layout);
    tracing::info!("Target FPS: {}", args.fps);

    let preprocessor = Preprocessor::new(WORKING_SIZE);
    let background = BackgroundProvider::from_config(args.background.as_deref(), &preprocessor);
    let pipeline = FramePipeline::new(preprocessor, background);

    // Devices are released in reverse order when they go out of scope
    let mut capture = DepthCapture::new(args.color_device, &args.disparity_device)
        .context("Failed to initialize depth camera")?;

    let mut output = V4L2Output::new(
        &args.output_device,
        OUTPUT_WIDTH,
        OUTPUT_HEIGHT,
        args.pixel_layout,
    )
    .context("Failed to initialize v4l2loopback output")?;

    let (cw, ch) = capture.resolution();
    let (ow, oh) = output.resolution();
    tracing::info!("Capture: {}x{} -> output {}x{}", cw, ch, ow, oh);

    let mut console = if args.no_preview {
        tracing::info!("Running headless, type commands followed by Enter");
        Console::Headless(StdinCommands::new())
    } else {
        Console::Window(
            PreviewWindow::new("Preview", WORKING_SIZE, WORKING_SIZE)
                .context("Failed to open preview window")?,
        )
    };

    tracing::info!("Commands:");
    control::log_key_map();

    let mut params = args.initial_params();
    params.log();

    let frames = run_pipeline(
        &mut capture,
        &mut output,
        &mut console,
        &pipeline,
        &mut params,
        args.fps,
        args.show_mask,
    )?;

    tracing::info!("Stopped after {} frames", frames);
    Ok(())
}

/// Drive the frame loop until quit, preview closure or a fatal error
///
/// Returns the number of frames delivered to the sink.
fn run_pipeline<S, O, U>(
    source: &mut S,
    output: &mut O,
    console: &mut U,
    pipeline: &FramePipeline,
    params: &mut Params,
    target_fps: u32,
    show_mask: bool,
) -> Result<u64>
where
    S: DepthSource,
    O: OutputSink,
    U: CommandSource + Preview,
{
    let frame_duration = Duration::from_secs_f32(1.0 / target_fps as f32);
    let mut frame_count = 0u64;
    let mut total_capture_time = Duration::ZERO;
    let mut total_process_time = Duration::ZERO;
    let mut total_output_time = Duration::ZERO;

    tracing::info!("Starting main pipeline loop");

    while console.is_open() {
        let loop_start = Instant::now();

        // Capture frame pair
        let capture_start = Instant::now();
        let pair = source.next_pair().context("Failed to capture frame")?;
        total_capture_time += capture_start.elapsed();

        // Mask and composite
        let process_start = Instant::now();
        let frame = pipeline
            .process(&pair, params)
            .context("Failed to process frame")?;
        total_process_time += process_start.elapsed();

        let shown = if show_mask {
            console.show(&mask_to_rgb(&frame.mask))
        } else {
            console.show(&frame.composite)
        };
        shown.context("Failed to update preview")?;

        // Output frame
        let output_start = Instant::now();
        output
            .write_frame(&letterbox(&frame.composite))
            .context("Failed to write frame")?;
        total_output_time += output_start.elapsed();

        frame_count += 1;

        // Log stats every 30 frames
        if frame_count % 30 == 0 {
            let avg_capture_ms = total_capture_time.as_secs_f64() * 1000.0 / frame_count as f64;
            let avg_process_ms = total_process_time.as_secs_f64() * 1000.0 / frame_count as f64;
            let avg_output_ms = total_output_time.as_secs_f64() * 1000.0 / frame_count as f64;
            let total_ms = avg_capture_ms + avg_process_ms + avg_output_ms;

            tracing::info!(
                "Frame {}: capture={:.1}ms, process={:.1}ms, output={:.1}ms, total={:.1}ms, fps={:.1}",
                frame_count,
                avg_capture_ms,
                avg_process_ms,
                avg_output_ms,
                total_ms,
                1000.0 / total_ms
            );
        }

        for key in console.poll() {
            let Some(command) = Command::from_key(key) else {
                continue;
            };
            if let ControlFlow::Break(()) = params.dispatch(command) {
                tracing::info!("Quit requested");
                return Ok(frame_count);
            }
        }

        // Frame rate limiting
        let elapsed = loop_start.elapsed();
        if elapsed < frame_duration {
            std::thread::sleep(frame_duration - elapsed);
        }
    }

    tracing::info!("Preview window closed");
    Ok(frame_count)
}
