use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command, ValueEnum, value_parser};
use dominant_mosaic::{image_helper, staging};
use dominant_mosaic::{GridShape, MosaicOutput, MosaicPipeline, ParallelPipeline, PipelineConfig};
use image::imageops::FilterType;

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ResizeFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Everything a run needs, resolved from the command line.
#[derive(Debug, Clone)]
struct Options {
    input: PathBuf,
    output: PathBuf,
    /// `None` when the report is disabled with `--json ""`.
    json: Option<PathBuf>,
    config: PipelineConfig,
    parallel: bool,
    quiet: bool,
}

fn build_command() -> Command {
    Command::new("dominant-mosaic")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Reduce an image to a grid of flat cells filled with each cell's most frequent color.")
        .arg(
            Arg::new("input")
                .long("input")
                .value_name("FILE")
                .help("Path to the input image file.")
                .value_parser(value_parser!(PathBuf))
                .default_value("image.jpg"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .value_name("FILE")
                .help("Path to the output PNG file.")
                .value_parser(value_parser!(PathBuf))
                .default_value("output.png"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .value_name("FILE")
                .help("Path to the JSON file for color information. An empty value disables it.")
                .default_value("colors.json"),
        )
        .arg(
            Arg::new("grid")
                .long("grid")
                .value_name("ROWSxCOLS")
                .help("Grid size in rowsxcols format.")
                .default_value("4x8"),
        )
        .arg(
            Arg::new("size")
                .long("size")
                .value_name("WxH")
                .help("Canvas size the input is resized to before partitioning.")
                .default_value("320x320"),
        )
        .arg(
            Arg::new("filter")
                .long("filter")
                .value_name("FILTER")
                .help("Resampling filter used for the resize.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(ResizeFilter))
                .default_value("lanczos3"),
        )
        .arg(
            Arg::new("parallel")
                .long("parallel")
                .help("Extract cell colors on one worker per CPU.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Do not print the per-cell colors.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Prints debug information verbosely.")
                .action(ArgAction::SetTrue),
        )
}

fn parse_size(size_str: &str) -> Result<(u32, u32), &'static str> {
    let parts: Vec<&str> = size_str.split(['x', 'X']).collect();
    if parts.len() != 2 {
        return Err("Provide size in the format WxH.");
    }

    let w = parts[0].trim().parse::<u32>().map_err(|_| "Invalid width.")?;
    let h = parts[1].trim().parse::<u32>().map_err(|_| "Invalid height.")?;

    match (w, h) {
        (0, _) => Err("Width is zero."),
        (_, 0) => Err("Height is zero."),
        _ => Ok((w, h)),
    }
}

/// Validates the configuration strings before any image work starts.
fn resolve_options(matches: &ArgMatches) -> Result<Options> {
    let grid_str = matches.get_one::<String>("grid").context("--grid has no value")?;
    let grid: GridShape = grid_str.parse().context("invalid --grid")?;

    let size_str = matches.get_one::<String>("size").context("--size has no value")?;
    let (canvas_width, canvas_height) =
        parse_size(size_str).map_err(|e| anyhow::anyhow!("invalid --size {size_str:?}: {e}"))?;

    let filter = matches
        .get_one::<ResizeFilter>("filter")
        .copied()
        .context("--filter has no value")?;

    let json = matches
        .get_one::<String>("json")
        .filter(|path| !path.is_empty())
        .map(PathBuf::from);

    Ok(Options {
        input: matches
            .get_one::<PathBuf>("input")
            .cloned()
            .context("--input has no value")?,
        output: matches
            .get_one::<PathBuf>("output")
            .cloned()
            .context("--output has no value")?,
        json,
        config: PipelineConfig {
            canvas_width,
            canvas_height,
            grid,
            resize_filter: filter.into(),
        },
        parallel: matches.get_flag("parallel"),
        quiet: matches.get_flag("quiet"),
    })
}

async fn compute(options: &Options) -> Result<MosaicOutput> {
    let image = image_helper::load(&options.input)
        .with_context(|| format!("error opening image {}", options.input.display()))?;

    let output = if options.parallel {
        let pipeline = ParallelPipeline::new(options.config)?;
        log::info!("parallel extraction with {} workers", pipeline.workers());
        pipeline.process(&image).await?
    } else {
        MosaicPipeline::new(options.config)?.process(&image)?
    };

    log::info!(
        "{} cells, {} distinct dominant colors",
        output.colors.len(),
        output.distinct_colors()
    );
    Ok(output)
}

/// Stages the mosaic and the report in temp files, then moves both into place.
/// Nothing appears at either path unless both were staged.
fn persist(options: &Options, output: &MosaicOutput) -> Result<()> {
    let png = image_helper::stage_png(&output.mosaic, &options.output)
        .with_context(|| format!("error writing output image {}", options.output.display()))?;

    let report = match &options.json {
        Some(json) => Some(
            output
                .report
                .stage_json(json)
                .with_context(|| format!("error writing JSON file {}", json.display()))?,
        ),
        None => None,
    };

    staging::commit(png, &options.output)
        .with_context(|| format!("error writing output image {}", options.output.display()))?;
    log::info!("wrote mosaic to {}", options.output.display());

    if let (Some(staged), Some(json)) = (report, &options.json) {
        staging::commit(staged, json)
            .with_context(|| format!("error writing JSON file {}", json.display()))?;
        log::info!("wrote color report with {} entries to {}", output.report.len(), json.display());
    }
    Ok(())
}

async fn run(options: &Options) -> Result<()> {
    let output = compute(options).await?;

    if !options.quiet {
        for entry in output.report.entries() {
            println!("Sub-image {} dominant color: {}", entry.subimage, entry.color);
        }
    }

    persist(options, &output)?;
    println!("New image with dominant colors created: {}", options.output.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = build_command().get_matches();

    let default_level = if matches.get_flag("verbose") { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let options = resolve_options(&matches)?;
    log::debug!("options: {:?}", options);
    run(&options).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use dominant_mosaic::ColorReport;
    use image::{Rgb, RgbImage};

    fn options_from(args: &[&str]) -> Result<Options> {
        let mut argv = vec!["dominant-mosaic"];
        argv.extend_from_slice(args);
        let matches = build_command().try_get_matches_from(argv)?;
        resolve_options(&matches)
    }

    #[test]
    fn defaults_match_documented_cli() {
        let options = options_from(&[]).unwrap();
        assert_eq!(options.input, PathBuf::from("image.jpg"));
        assert_eq!(options.output, PathBuf::from("output.png"));
        assert_eq!(options.json, Some(PathBuf::from("colors.json")));
        assert_eq!(options.config, PipelineConfig::default());
        assert!(!options.parallel);
    }

    #[test]
    fn empty_json_disables_report() {
        let options = options_from(&["--json", ""]).unwrap();
        assert_eq!(options.json, None);
    }

    #[test]
    fn malformed_grid_is_rejected_before_loading() {
        for bad in ["4", "4x", "axb", "0x3"] {
            assert!(options_from(&["--grid", bad]).is_err(), "grid {bad:?}");
        }
    }

    #[test]
    fn parses_size_argument() {
        assert_eq!(parse_size("320x200"), Ok((320, 200)));
        assert_eq!(parse_size("0x200"), Err("Width is zero."));
        assert_eq!(parse_size("10x0"), Err("Height is zero."));
        assert_eq!(parse_size("10"), Err("Provide size in the format WxH."));
        assert_eq!(parse_size("tenx10"), Err("Invalid width."));
    }

    #[test]
    fn filter_names_map_to_image_filters() {
        let options = options_from(&["--filter", "catmull-rom"]).unwrap();
        assert_eq!(options.config.resize_filter, FilterType::CatmullRom);
    }

    #[tokio::test]
    async fn end_to_end_writes_mosaic_and_report() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.png");
        let output = dir.path().join("output.png");
        let json = dir.path().join("colors.json");
        RgbImage::from_pixel(40, 40, Rgb([200, 100, 50])).save(&input).unwrap();

        let options = options_from(&[
            "--input",
            input.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
            "--json",
            json.to_str().unwrap(),
            "--grid",
            "2x2",
            "--size",
            "20x20",
            "--filter",
            "nearest",
            "--quiet",
        ])
        .unwrap();
        run(&options).await.unwrap();

        let mosaic = image::open(&output).unwrap().to_rgba8();
        assert_eq!(mosaic.dimensions(), (20, 20));
        assert_eq!(mosaic.get_pixel(19, 19).0, [200, 100, 50, 255]);

        let report: ColorReport =
            serde_json::from_str(&std::fs::read_to_string(&json).unwrap()).unwrap();
        assert_eq!(report.len(), 4);
        assert!(report.entries().iter().all(|e| e.color == "#c86432"));
    }

    #[tokio::test]
    async fn missing_input_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("output.png");
        let json = dir.path().join("colors.json");
        let options = options_from(&[
            "--input",
            dir.path().join("absent.jpg").to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
            "--json",
            json.to_str().unwrap(),
        ])
        .unwrap();

        assert!(run(&options).await.is_err());
        assert!(!output.exists());
        assert!(!json.exists());
    }

    #[tokio::test]
    async fn unwritable_report_leaves_no_mosaic_behind() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.png");
        let output = dir.path().join("output.png");
        let json = dir.path().join("missing").join("colors.json");
        RgbImage::from_pixel(16, 16, Rgb([10, 20, 30])).save(&input).unwrap();

        let options = options_from(&[
            "--input",
            input.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
            "--json",
            json.to_str().unwrap(),
            "--size",
            "16x16",
            "--quiet",
        ])
        .unwrap();

        let err = run(&options).await.unwrap_err();
        assert!(format!("{err:#}").contains("error writing JSON file"), "{err:#}");
        assert!(!output.exists());
        assert!(!json.exists());
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .filter(|name| name != "input.png")
            .collect();
        assert!(leftovers.is_empty(), "{leftovers:?}");
    }
}
