//! Command-line parsing for `epd-show`

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use waveshare_epd::{Builder, BuilderError, Model, PinAssignment, PinNumbering, SessionConfig};

pub const USAGE: &str = "\
Usage: epd-show --model <id> [options] <image>
       epd-show --list-models

Options:
  --model <id>          Panel model (see --list-models)
  --numbering <scheme>  Pin numbering: board (default) or bcm
  --cs <pin>            Chip select pin (default 24, board)
  --rst <pin>           Reset pin (default 11, board)
  --dc <pin>            Data/command pin (default 22, board)
  --busy <pin>          Busy pin (default 18, board)
  --spi-bus <n>         spidev bus (default 0)
  --spi-cs <n>          spidev chip select (default 0)
  --clock <hz>          SPI clock (default 2000000)
  --timeout-ms <ms>     Busy wait bound, 0 waits forever (default 30000)
  --chunk <bytes>       Data frame size (default 2048)
  --dry-run             Record the command stream instead of driving hardware
  --list-models         Print supported models and exit
  -h, --help            Print this help";

#[derive(Debug, Error, PartialEq)]
pub enum CliError {
    #[error("Missing value for {0}")]
    MissingValue(String),
    #[error("Invalid value for {flag}: {value}")]
    InvalidValue { flag: String, value: String },
    #[error("Unknown option: {0}")]
    UnknownOption(String),
    #[error("No image given")]
    MissingImage,
    #[error("More than one image given: {0}")]
    ExtraArgument(String),
    #[error(transparent)]
    Model(#[from] waveshare_epd::UnsupportedModel),
    #[error(transparent)]
    Config(#[from] BuilderError),
}

#[derive(Debug, PartialEq)]
pub enum Command {
    Show { config: SessionConfig, image: PathBuf, dry_run: bool },
    ListModels,
    Help,
}

fn value<I: Iterator<Item = String>>(args: &mut I, flag: &str) -> Result<String, CliError> {
    args.next()
        .ok_or_else(|| CliError::MissingValue(flag.to_string()))
}

fn number<T, I>(args: &mut I, flag: &str) -> Result<T, CliError>
where
    T: std::str::FromStr,
    I: Iterator<Item = String>,
{
    let raw = value(args, flag)?;
    raw.parse().map_err(|_| CliError::InvalidValue {
        flag: flag.to_string(),
        value: raw,
    })
}

/// Parse arguments (without the program name)
pub fn parse<I: IntoIterator<Item = String>>(args: I) -> Result<Command, CliError> {
    let mut args = args.into_iter();
    let mut builder = Builder::new();
    let mut pins = PinAssignment::default();
    let (mut spi_bus, mut spi_cs) = (0, 0);
    let mut image = None;
    let mut dry_run = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "--list-models" => return Ok(Command::ListModels),
            "--model" => builder = builder.model(value(&mut args, &arg)?.parse::<Model>()?),
            "--numbering" => {
                let scheme = value(&mut args, &arg)?;
                let numbering = match scheme.as_str() {
                    "board" => PinNumbering::Board,
                    "bcm" => PinNumbering::Bcm,
                    _ => {
                        return Err(CliError::InvalidValue {
                            flag: arg,
                            value: scheme,
                        });
                    }
                };
                builder = builder.numbering(numbering);
            }
            "--cs" => pins.cs = number(&mut args, &arg)?,
            "--rst" => pins.rst = number(&mut args, &arg)?,
            "--dc" => pins.dc = number(&mut args, &arg)?,
            "--busy" => pins.busy = number(&mut args, &arg)?,
            "--spi-bus" => spi_bus = number(&mut args, &arg)?,
            "--spi-cs" => spi_cs = number(&mut args, &arg)?,
            "--clock" => builder = builder.spi_clock_hz(number(&mut args, &arg)?),
            "--timeout-ms" => {
                let ms: u64 = number(&mut args, &arg)?;
                builder = builder.busy_timeout((ms > 0).then(|| Duration::from_millis(ms)));
            }
            "--chunk" => builder = builder.chunk_size(number(&mut args, &arg)?),
            "--dry-run" => dry_run = true,
            flag if flag.starts_with('-') => return Err(CliError::UnknownOption(arg)),
            _ if image.is_some() => return Err(CliError::ExtraArgument(arg)),
            _ => image = Some(PathBuf::from(arg)),
        }
    }

    let config = builder
        .pins(pins)
        .spi_device(spi_bus, spi_cs)
        .build()?;
    let image = image.ok_or(CliError::MissingImage)?;
    Ok(Command::Show {
        config,
        image,
        dry_run,
    })
}
