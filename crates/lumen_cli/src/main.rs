//! Lumen command-line renderer.
//!
//! Loads one or more OBJ scenes, path-traces them, and writes a PNG.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};

use lumen_core::load_obj;
use lumen_render::{render, Camera, Lambertian, RenderConfig, RenderGroup, Scene, Vec3};

const USAGE: &str = "\
Usage: lumen [OPTIONS] <SCENE.obj>...

Options:
  -r, --rays <N>      Sample rays per pixel (default 4)
  -d, --depth <N>     Maximum trace depth (default 4)
  -p, --size <N>      Image width and height in pixels (default 1024)
  -o, --output <PATH> Output image path (default render.png)
      --eye <X,Y,Z>   Camera position (default 0,5,15)
      --look <X,Y,Z>  Camera view direction (default 0,0,-1)
  -h, --help          Print this help
";

struct Args {
    scenes: Vec<PathBuf>,
    rays: u32,
    depth: u32,
    size: u32,
    output: PathBuf,
    eye: Vec3,
    look: Vec3,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        scenes: Vec::new(),
        rays: 4,
        depth: 4,
        size: 1024,
        output: PathBuf::from("render.png"),
        eye: Vec3::new(0.0, 5.0, 15.0),
        look: Vec3::new(0.0, 0.0, -1.0),
    };

    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "-r" | "--rays" => args.rays = next_value(&mut it, &arg)?,
            "-d" | "--depth" => args.depth = next_value(&mut it, &arg)?,
            "-p" | "--size" => args.size = next_value(&mut it, &arg)?,
            "-o" | "--output" => {
                args.output = PathBuf::from(next_arg(&mut it, &arg)?);
            }
            "--eye" => args.eye = parse_vec3(&next_arg(&mut it, &arg)?)?,
            "--look" => args.look = parse_vec3(&next_arg(&mut it, &arg)?)?,
            "-h" | "--help" => {
                print!("{USAGE}");
                std::process::exit(0);
            }
            _ if arg.starts_with('-') => bail!("unknown option {arg} (try --help)"),
            _ => args.scenes.push(PathBuf::from(arg)),
        }
    }

    if args.scenes.is_empty() {
        bail!("no OBJ scene files given (try --help)");
    }
    Ok(args)
}

fn next_arg(it: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    it.next().with_context(|| format!("{flag} needs a value"))
}

fn next_value<T: FromStr>(it: &mut impl Iterator<Item = String>, flag: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = next_arg(it, flag)?;
    value
        .parse()
        .with_context(|| format!("invalid value '{value}' for {flag}"))
}

fn parse_vec3(s: &str) -> Result<Vec3> {
    let parts: Vec<f32> = s
        .split(',')
        .map(|p| p.trim().parse::<f32>())
        .collect::<Result<_, _>>()
        .with_context(|| format!("invalid vector '{s}', expected X,Y,Z"))?;
    if parts.len() != 3 {
        bail!("invalid vector '{s}', expected X,Y,Z");
    }
    Ok(Vec3::new(parts[0], parts[1], parts[2]))
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = parse_args()?;

    let mut scene = Scene::new();
    for path in &args.scenes {
        let meshes =
            load_obj(path).with_context(|| format!("failed to load scene {}", path.display()))?;
        for loaded in &meshes {
            let material = Arc::new(Lambertian::from_desc(&loaded.material));
            scene.add_group(RenderGroup::from_mesh(&loaded.mesh, material));
        }
        log::info!("Scene {} loaded ({} shapes)", path.display(), meshes.len());
    }

    if scene.emissive_groups().is_empty() {
        log::warn!("Scene contains no emissive surfaces; the render will be black");
    }

    let camera = Camera::new(args.size, args.size, args.eye, args.look, Vec3::Y);
    let config = RenderConfig {
        rays_per_pixel: args.rays,
        max_depth: args.depth,
        ..RenderConfig::default()
    };

    let start = Instant::now();
    let film = render(&scene, &camera, &config);
    log::info!("Rendering finished in {:.1}s", start.elapsed().as_secs_f32());

    film.save(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    log::info!("Image saved to {}", args.output.display());

    Ok(())
}
