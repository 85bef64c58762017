use std::env;
use std::fs;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use log::info;

use palmfx::{print_final_state, DataModel, EffectRuntime, HandState, Scene, ToggleState};

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse()?;
    let xml = fs::read_to_string(&options.path)
        .with_context(|| format!("failed to read scene {}", options.path))?;
    let scene = Scene::from_xml(&xml).context("failed to parse scene XML")?;

    println!(
        "Loaded scene with {} objects ({} vibrations, {} toggles)",
        scene.objects.len(),
        scene.vibrations.len(),
        scene.toggles.len()
    );
    for object in &scene.objects {
        println!(" - {} ({})", object.name, object.object_type);
    }

    let model = DataModel::from_objects(scene.objects.clone());
    let hand = Arc::new(HandState::new(scene.hand.preference, scene.hand.space));
    let mut runtime = EffectRuntime::from_scene(&scene, model.clone(), hand.clone(), options.seed)
        .context("failed to attach effects")?;

    info!(
        "running {} ticks of {:.4}s over a {}-frame hand track",
        options.ticks,
        options.dt,
        scene.track.len()
    );
    for tick in 0..options.ticks {
        // The last recorded frame is held once the track runs out.
        if let Some(frame) = scene.track.get(tick).or_else(|| scene.track.last()) {
            hand.submit_frame(frame);
        }
        runtime.tick(options.dt);
    }
    println!("Ran {} tick(s)", options.ticks);

    print_final_state(&model);
    for (target, state) in runtime.toggle_states() {
        let label = match state {
            ToggleState::Normal => "normal",
            ToggleState::Inverted => "inverted",
        };
        println!("Toggle {target}: {label}");
    }
    Ok(())
}

struct CliOptions {
    path: String,
    ticks: usize,
    dt: f32,
    seed: Option<u64>,
}

impl CliOptions {
    const USAGE: &'static str = "Usage: palmfx <scene.xml> [--ticks N] [--dt SECONDS] [--seed N]";

    fn parse() -> Result<Self> {
        Self::parse_from(env::args().skip(1))
    }

    fn parse_from(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut args = args.into_iter();
        let Some(path) = args.next() else {
            return Err(anyhow!(Self::USAGE));
        };
        let mut options = Self {
            path,
            ticks: 60,
            dt: 1.0 / 60.0,
            seed: None,
        };
        while let Some(arg) = args.next() {
            let mut value = |flag: &str| {
                args.next()
                    .ok_or_else(|| anyhow!("{flag} expects a value. {}", Self::USAGE))
            };
            match arg.as_str() {
                "--ticks" => {
                    options.ticks = value("--ticks")?
                        .parse()
                        .context("--ticks must be a non-negative integer")?;
                }
                "--dt" => {
                    let dt: f32 = value("--dt")?
                        .parse()
                        .context("--dt must be a number of seconds")?;
                    if !dt.is_finite() || dt < 0.0 {
                        return Err(anyhow!("--dt must be a finite, non-negative number"));
                    }
                    options.dt = dt;
                }
                "--seed" => {
                    options.seed = Some(
                        value("--seed")?
                            .parse()
                            .context("--seed must be an unsigned integer")?,
                    );
                }
                other => {
                    return Err(anyhow!(
                        "Unknown argument: {other}. Expected --ticks, --dt or --seed"
                    ));
                }
            }
        }
        Ok(options)
    }
}
