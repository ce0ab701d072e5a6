use std::{error::Error, fs, path::Path};

use clap::Parser;
use serde::{Deserialize, Serialize};

use mvpose_core::{Capture, TargetSpec};
use mvpose_pipeline::{estimate_rig_poses, estimate_single_shot, PoseEstimationResult, RigCamera};

/// Multi-camera rig pose estimation.
#[derive(Debug, Parser)]
#[command(author, version, about = "Multi-camera rig pose estimation pipeline")]
struct Args {
    /// Path to a JSON file containing a RigPoseInput.
    #[arg(long)]
    input: String,

    /// Optional path for the JSON result. Printed to stdout if omitted.
    #[arg(long)]
    output: Option<String>,

    /// Solve each camera independently against the board from the capture
    /// at this index, instead of running the joint pipeline.
    #[arg(long)]
    single_shot: Option<usize>,
}

/// On-disk input: rig description plus synchronized captures.
#[derive(Debug, Serialize, Deserialize)]
struct RigPoseInput {
    cameras: Vec<RigCamera>,
    target: TargetSpec,
    captures: Vec<Capture>,
    /// Serial of the reference camera. The first camera if omitted.
    #[serde(default)]
    reference_serial: Option<String>,
}

fn load_json_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, Box<dyn Error>> {
    let data = fs::read_to_string(path)?;
    let value = serde_json::from_str(&data)?;
    Ok(value)
}

fn reference_index(input: &RigPoseInput) -> Result<usize, Box<dyn Error>> {
    match &input.reference_serial {
        None => Ok(0),
        Some(serial) => input
            .cameras
            .iter()
            .position(|c| &c.serial == serial)
            .ok_or_else(|| format!("no camera with serial {serial:?} in the input").into()),
    }
}

fn run_from_file(
    input_path: &str,
    single_shot: Option<usize>,
) -> Result<PoseEstimationResult, Box<dyn Error>> {
    let input: RigPoseInput = load_json_file(Path::new(input_path))?;
    let target = input.target.build();

    if let Some(index) = single_shot {
        let capture = input
            .captures
            .get(index)
            .ok_or_else(|| format!("capture index {index} out of range"))?;
        return Ok(estimate_single_shot(&input.cameras, capture, &target)?);
    }

    let reference = reference_index(&input)?;
    Ok(estimate_rig_poses(
        input.cameras,
        target,
        input.captures,
        reference,
    )?)
}

fn main() {
    if let Err(err) = try_main() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let result = run_from_file(&args.input, args.single_shot)?;
    let json = serde_json::to_string_pretty(&result)?;

    match &args.output {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}
