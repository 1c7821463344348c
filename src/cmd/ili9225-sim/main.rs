// SPDX-License-Identifier: GPL-3.0-or-later

use std::process;
use std::thread;
use std::time::Duration;

use clap::Parser;
use log::LevelFilter;
use simple_logger::SimpleLogger;

use ili9225::serial_port::SerialBridge;
use ili9225::{
    colors, config, Config, FrameSink, GfxFont, Ili9225, Ili9225Mirror, PngSink, Res, TcpViewer,
    Tee, Transport,
};

mod scenes;

use scenes::{Assets, Picture, Scene};

#[derive(Parser)]
#[command(name = "ili9225-sim")]
#[command(about = "Drive the ILI9225 driver against a simulated panel")]
struct Args {
    /// YAML configuration file
    #[arg(short, long, value_name = "file")]
    config: Option<String>,

    /// Also send every strobe to a serial SPI bridge ("AUTO" to detect)
    #[arg(short, long, value_name = "device")]
    port: Option<String>,

    /// Stream frames to the viewer configured in the `viewer` section
    #[arg(long)]
    viewer: bool,

    /// Write the last flushed frame to a PNG file
    #[arg(long, value_name = "filename")]
    png: Option<String>,

    /// TrueType font used by the text scene
    #[arg(long, value_name = "filename")]
    ttf: Option<String>,

    /// Milliseconds to wait after each scene
    #[arg(long, value_name = "ms", default_value_t = 0)]
    pause: u64,

    #[arg(long)]
    pixels: bool,

    #[arg(long)]
    lines: bool,

    #[arg(long)]
    rectangles: bool,

    #[arg(long)]
    circles: bool,

    #[arg(long)]
    text: bool,

    #[arg(long)]
    complex: bool,

    /// Fill the screen with a color name or RGB565 hex value
    #[arg(long, value_name = "color")]
    fill_screen: Option<String>,

    /// Draw a PNG image at the top left corner
    #[arg(long, value_name = "filename")]
    image: Option<String>,

    /// Increase log verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn scenes(&self) -> Res<Vec<Scene>> {
        let mut scenes = Vec::new();
        if self.pixels {
            scenes.push(Scene::Pixels);
        }
        if self.lines {
            scenes.push(Scene::Lines);
        }
        if self.rectangles {
            scenes.push(Scene::Rectangles);
        }
        if self.circles {
            scenes.extend([Scene::Circles, Scene::FilledCircles]);
        }
        if self.text {
            scenes.push(Scene::Text);
        }
        if self.complex {
            scenes.push(Scene::Complex);
        }
        if let Some(s) = &self.fill_screen {
            let color = colors::parse(s).ok_or_else(|| format!("invalid color: {s}"))?;
            scenes.push(Scene::FillScreen(color));
        }
        if self.image.is_some() {
            scenes.push(Scene::Picture);
        }

        if scenes.is_empty() {
            scenes = vec![
                Scene::Pixels,
                Scene::Lines,
                Scene::Rectangles,
                Scene::Circles,
                Scene::FilledCircles,
                Scene::Text,
                Scene::Complex,
            ];
        }
        Ok(scenes)
    }
}

/// A transport that keeps a mirror of the panel.
trait Mirrored: Transport {
    fn mirror(&mut self) -> &mut Ili9225Mirror;
}

impl Mirrored for Ili9225Mirror {
    fn mirror(&mut self) -> &mut Ili9225Mirror {
        self
    }
}

impl<B: Transport> Mirrored for Tee<Ili9225Mirror, B> {
    fn mirror(&mut self) -> &mut Ili9225Mirror {
        self.first_mut()
    }
}

fn main() {
    let args = Args::parse();

    match run(args) {
        Ok(_) => (),
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(1);
        }
    }
}

fn run(args: Args) -> Res<()> {
    let level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    SimpleLogger::new().with_level(level).init()?;

    let config = match &args.config {
        Some(path) => config::load(path)?,
        None => Config::default(),
    };
    let playlist = args.scenes()?;

    let mut assets = Assets::default();
    if let Some(path) = &args.ttf {
        log::info!("loading font {path}");
        assets.font = Some(GfxFont::from_ttf(std::fs::read(path)?, 16.0, b' ', b'~')?);
    }
    if let Some(path) = &args.image {
        log::info!("decoding {path}");
        assets.picture = Some(Picture::load(path)?);
    }

    let mut sinks: Vec<Box<dyn FrameSink>> = Vec::new();
    if args.viewer {
        let viewer = &config.viewer;
        sinks.push(Box::new(TcpViewer::connect(&viewer.host, viewer.port)?));
    }
    if let Some(path) = &args.png {
        sinks.push(Box::new(PngSink::new(path)));
    }

    let display = &config.display;
    let mirror = Ili9225Mirror::new(display.width, display.height)
        .with_label(&format!("{}-mirror", display.label));
    let pause = Duration::from_millis(args.pause);

    let digest = match &args.port {
        Some(port) => {
            let bridge = SerialBridge::open(port)?;
            let dev = Ili9225::new(Tee::new(mirror, bridge), config.pins).with_label(&display.label);
            simulate(dev, &config, &playlist, &assets, &mut sinks, pause)?
        }
        None => {
            let dev = Ili9225::new(mirror, config.pins).with_label(&display.label);
            simulate(dev, &config, &playlist, &assets, &mut sinks, pause)?
        }
    };

    println!("digest: {digest:016x}");

    Ok(())
}

fn simulate<T: Mirrored>(
    mut dev: Ili9225<T>,
    config: &Config,
    playlist: &[Scene],
    assets: &Assets,
    sinks: &mut Vec<Box<dyn FrameSink>>,
    pause: Duration,
) -> Res<u64> {
    let display = &config.display;
    dev.initialize(display.width, display.height, display.rotation)?;
    if dev.state().is_none() {
        return Err("display configuration rejected".into());
    }
    dev.set_color_order(display.color_order)?;

    for &scene in playlist {
        log::info!("running {scene:?}");
        scenes::run(&mut dev, scene, assets)?;
        if let Err(e) = dev.transport_mut().mirror().flush(sinks) {
            log::warn!(error = e.to_string().as_str(); "flush failed, frame kept for the next scene");
        }
        thread::sleep(pause);
    }

    let mirror = dev.transport_mut().mirror();
    let stats = mirror.stats();
    log::info!(
        commands = stats.commands,
        words = stats.words,
        pixels = stats.pixels,
        dropped = stats.dropped;
        "done"
    );
    Ok(mirror.framebuffer().digest())
}
