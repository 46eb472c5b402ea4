//! Show an image on a Waveshare tri-color e-paper panel.
//!
//! Pure white pixels stay white, pure black pixels turn black and every other
//! color is drawn red. The image must match the panel's resolution.

mod cli;

use std::error::Error;
use std::path::Path;

use cli::Command;
use waveshare_epd::mock::MockInterface;
use waveshare_epd::{AnyPanel, DisplayInterface, Epd, Model, SessionConfig, session};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match cli::parse(std::env::args().skip(1))? {
        Command::Help => println!("{}", cli::USAGE),
        Command::ListModels => {
            for model in Model::ALL {
                let dims = model.dimensions();
                println!("{model:<22} {}x{}", dims.width, dims.height);
            }
        }
        Command::Show {
            config,
            image,
            dry_run,
        } => {
            let pixels = load_pixels(&image, config.model)?;
            if dry_run {
                show_recorded(&config, &pixels)?;
            } else {
                show_on_hardware(&config, &pixels)?;
            }
        }
    }

    Ok(())
}

/// Raw RGB triplets, row-major
fn load_pixels(path: &Path, model: Model) -> Result<Vec<u8>, Box<dyn Error>> {
    let image = image::open(path)?.to_rgb8();
    let dims = model.dimensions();
    if image.dimensions() != (u32::from(dims.width), u32::from(dims.height)) {
        return Err(format!(
            "{} is {}x{}, {model} needs {}x{}",
            path.display(),
            image.width(),
            image.height(),
            dims.width,
            dims.height
        )
        .into());
    }
    log::info!("Loaded {} ({}x{})", path.display(), dims.width, dims.height);
    Ok(image.into_raw())
}

fn cycle<I: DisplayInterface>(
    panel: &mut AnyPanel<I>,
    pixels: &[u8],
) -> Result<(), waveshare_epd::Error<I>> {
    panel.power_on()?;
    panel.show_image(pixels)?;
    panel.power_off()
}

#[cfg(feature = "rpi")]
fn show_on_hardware(config: &SessionConfig, pixels: &[u8]) -> Result<(), Box<dyn Error>> {
    waveshare_epd::rpi::start(config, |panel| cycle(panel, pixels))??;
    Ok(())
}

#[cfg(not(feature = "rpi"))]
fn show_on_hardware(_config: &SessionConfig, _pixels: &[u8]) -> Result<(), Box<dyn Error>> {
    Err("built without the `rpi` feature, use --dry-run".into())
}

fn show_recorded(config: &SessionConfig, pixels: &[u8]) -> Result<(), Box<dyn Error>> {
    let mock = MockInterface::new();
    let probe = mock.probe();
    session::start(config.model, mock, |panel| {
        panel.set_chunk_size(config.chunk_size);
        cycle(panel, pixels)
    })?;
    log::info!(
        "Dry run: {} frames, {} events",
        probe.transfers(),
        probe.events().len()
    );
    Ok(())
}
