//! Preview loop
//!
//! Parses one command per stdin line and drives a [`PreviewSession`]. Every
//! parameter change triggers a fresh render from the loaded source.

use crate::{
    Cli,
    config::{self, Config},
};
use anyhow::{Context, Result, bail};
use glitch_effect::{
    DisplacementMode, ParamKey, Parameters, PixelBuffer, PreviewSession,
    buffer::changed_pixels,
};
use log::info;
use std::{
    fmt,
    io::{self, BufRead, Write},
    path::Path,
    str::FromStr,
    time::{Duration, Instant},
};

const HELP: &str = "\
commands:
  <key>=<value>     set displacement, rgbShift, scanlines or noise
  mode <name>       displacement variant: blocks, rows or columns
  seed <n>          reseed the random generator
  render            render again with fresh randomness
  params            show the current values
  reset             restore the startup values
  save              store the current values in the config file
  help              show this message
  quit              leave";

const COMMAND_WORDS: &[&str] = &[
    "mode", "seed", "render", "params", "reset", "save", "help", "quit", "exit",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Set(ParamKey, f64),
    Mode(DisplacementMode),
    Seed(u64),
    Render,
    Params,
    Reset,
    Save,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let head = line
            .split(|c: char| c.is_whitespace() || c == '=')
            .next()
            .unwrap_or_default();
        if COMMAND_WORDS.contains(&head) && line.contains('=') {
            let words: Vec<_> = line.split(|c: char| c.is_whitespace() || c == '=').collect();
            let suggestion = words
                .into_iter()
                .filter(|w| !w.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            bail!("`{head}` is a command, not a parameter, try `{suggestion}`");
        }

        if line.contains('=') {
            let (key, value) = Parameters::parse_assignment(line)?;
            return Ok(Command::Set(key, value));
        }

        let mut words = line.split_whitespace();
        let name = words.next().unwrap_or_default();
        let arg = words.next();
        if words.next().is_some() {
            bail!("too many arguments in `{line}`");
        }

        let command = match (name, arg) {
            ("mode", Some(mode)) => Command::Mode(mode.parse().with_context(|| {
                format!("unknown mode `{mode}`, expected blocks, rows or columns")
            })?),
            ("seed", Some(seed)) => {
                Command::Seed(seed.parse().with_context(|| format!("bad seed `{seed}`"))?)
            }
            ("mode" | "seed", None) => bail!("`{name}` needs an argument"),
            ("render", None) => Command::Render,
            ("params", None) => Command::Params,
            ("reset", None) => Command::Reset,
            ("save", None) => Command::Save,
            ("help" | "?", None) => Command::Help,
            ("quit" | "exit", None) => Command::Quit,
            _ => bail!("unknown command `{line}`, try `help`"),
        };

        Ok(command)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderReport {
    pub width: u32,
    pub height: u32,
    pub elapsed: Duration,
    pub changed: usize,
}

impl fmt::Display for RenderReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} rendered in {:.2} ms, {}/{} pixels changed",
            self.width,
            self.height,
            self.elapsed.as_secs_f64() * 1000.0,
            self.changed,
            self.width as u64 * self.height as u64
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Rendered(RenderReport),
    Text(String),
    Quit,
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Rendered(report) => write!(f, "{report}"),
            Reply::Text(text) => write!(f, "{text}"),
            Reply::Quit => write!(f, "bye"),
        }
    }
}

#[derive(Debug)]
pub struct Preview {
    session: PreviewSession,
    startup: Parameters,
    config: Config,
}

impl Preview {
    /// Startup values come from the config, with `--set` overrides on top.
    /// `--mode` and `--seed` win over their config counterparts.
    pub fn new(cli: &Cli, config: Config) -> Result<Self> {
        let mut params = config.params;
        for assignment in &cli.set {
            params
                .apply_assignment(assignment)
                .with_context(|| format!("bad override `{assignment}`"))?;
        }

        let mut session = match cli.seed.or(config.render.seed) {
            Some(seed) => PreviewSession::with_seed(params, seed),
            None => PreviewSession::new(params),
        };
        session.set_displacement_mode(cli.mode.unwrap_or(config.render.displacement_mode));

        Ok(Self {
            session,
            startup: params,
            config,
        })
    }

    pub fn session(&self) -> &PreviewSession {
        &self.session
    }

    pub fn load(&mut self, image: PixelBuffer) {
        self.session.load_image(image);
    }

    /// `None` until an image is loaded
    pub fn render(&mut self) -> Option<RenderReport> {
        let start = Instant::now();
        let output = self.session.render()?;
        let elapsed = start.elapsed();

        let source = self.session.source()?;
        Some(RenderReport {
            width: output.width(),
            height: output.height(),
            elapsed,
            changed: changed_pixels(source, &output),
        })
    }

    pub fn handle(&mut self, command: Command) -> Result<Reply> {
        match command {
            Command::Set(key, value) => {
                self.session.set_param(key, value)?;
                info!("{key} = {value}");
                Ok(self.rendered())
            }
            Command::Mode(mode) => {
                self.session.set_displacement_mode(mode);
                info!("displacement mode = {mode}");
                Ok(self.rendered())
            }
            Command::Seed(seed) => {
                self.session.reseed(seed);
                Ok(self.rendered())
            }
            Command::Render => Ok(self.rendered()),
            Command::Params => Ok(Reply::Text(self.describe())),
            Command::Reset => {
                self.session.set_params(self.startup);
                Ok(self.rendered())
            }
            Command::Save => {
                self.config.params = *self.session.params();
                self.config.render.displacement_mode = self.session.displacement_mode();
                config::save(self.config.clone())?;
                Ok(Reply::Text(format!(
                    "saved to {}",
                    self.config.config_path.display()
                )))
            }
            Command::Help => Ok(Reply::Text(HELP.to_string())),
            Command::Quit => Ok(Reply::Quit),
        }
    }

    fn rendered(&mut self) -> Reply {
        match self.render() {
            Some(report) => Reply::Rendered(report),
            None => Reply::Text("no image loaded".to_string()),
        }
    }

    fn describe(&self) -> String {
        let params = self.session.params();
        let mut lines: Vec<String> = ParamKey::all_keys()
            .into_iter()
            .map(|key| {
                if key.is_percent() {
                    format!("{key} = {}%", params.get(key))
                } else {
                    format!("{key} = {} px", params.get(key))
                }
            })
            .collect();
        lines.push(format!("mode = {}", self.session.displacement_mode()));
        lines.join("\n")
    }
}

pub fn decode(path: &Path) -> Result<PixelBuffer> {
    let image = image::ImageReader::open(path)
        .with_context(|| format!("open {} failed", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("read {} failed", path.display()))?
        .decode()
        .with_context(|| format!("decode {} failed", path.display()))?;

    Ok(image.to_rgba8())
}

pub fn run(cli: &Cli, config: Config) -> Result<()> {
    let mut preview = Preview::new(cli, config)?;
    preview.load(decode(&cli.image)?);

    if let Some(report) = preview.render() {
        println!("{report}");
    }

    if cli.once {
        return Ok(());
    }

    let mut stdout = io::stdout();
    prompt(&mut stdout)?;

    for line in io::stdin().lock().lines() {
        let line = line.with_context(|| "read stdin failed")?;
        if !line.trim().is_empty() {
            match line.parse::<Command>().and_then(|c| preview.handle(c)) {
                Ok(Reply::Quit) => break,
                Ok(reply) => println!("{reply}"),
                Err(e) => println!("error: {e:#}"),
            }
        }
        prompt(&mut stdout)?;
    }

    Ok(())
}

fn prompt(out: &mut impl Write) -> Result<()> {
    write!(out, "> ")?;
    out.flush()?;
    Ok(())
}
