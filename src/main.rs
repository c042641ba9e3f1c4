use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{bail, Context, Result};
use clap::Parser;
use image::ImageFormat;
use log::{debug, error, info, warn};

use aseatlas::atlas::{Atlas, AtlasBuilder, AtlasSettings};
use aseatlas::config::Config;
use aseatlas::{catalogue, flatten, font, tiles, AsepriteFile};

fn main() -> Result<()> {
    init_logger()?;
    let config = Config::parse();
    run(&config)
}

fn init_logger() -> Result<()> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("{}: {}", record.level(), message))
        })
        .level(log::LevelFilter::Info)
        .chain(std::io::stdout())
        .apply()
        .context("could not initialize logger")
}

fn run(config: &Config) -> Result<()> {
    let sources = scan_textures_dir(&config.textures_dir)?;
    if sources.is_empty() {
        bail!(
            "no sprite sources (.ase, .aseprite, .png) found in {}",
            config.textures_dir.display()
        );
    }

    let mut builder = AtlasBuilder::new(AtlasSettings {
        width: config.atlas_width,
        height: config.atlas_height,
        tile_padding: config.tile_padding,
        crop: !config.no_crop,
    });

    for path in &sources {
        // One bad file must not sink the batch.
        if let Err(err) = add_source(&mut builder, path) {
            error!("skipping {}: {:#}", path.display(), err);
        }
    }

    add_font(&mut builder, config);

    let atlas = builder.build();
    write_outputs(&atlas, config)?;
    info!(
        "baked {} sprites, {} animations, {} tilesets, {} glyphs into {}",
        atlas.sprites.len(),
        atlas.animations.len(),
        atlas.tilesets.len(),
        atlas.glyphs.len(),
        config.out_image.display()
    );
    Ok(())
}

/// Collect sprite sources from a flat directory, newest first.
fn scan_textures_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut sources: Vec<(PathBuf, SystemTime)> = Vec::new();
    let entries =
        fs::read_dir(dir).with_context(|| format!("reading textures dir {}", dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("reading textures dir {}", dir.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        match path.extension().and_then(OsStr::to_str) {
            Some("ase") | Some("aseprite") | Some("png") => {
                let metadata = entry
                    .metadata()
                    .with_context(|| format!("reading metadata of {}", path.display()))?;
                // Not every filesystem records birth times.
                let created = metadata
                    .created()
                    .or_else(|_| metadata.modified())
                    .unwrap_or(SystemTime::UNIX_EPOCH);
                sources.push((path, created));
            }
            Some("gpl") => {
                warn!(
                    "extended palette files are not supported yet, skipping {}",
                    path.display()
                );
            }
            Some("aseprite-extension") => {
                warn!(
                    "extension packages are not supported yet, skipping {}",
                    path.display()
                );
            }
            _ => debug!("ignoring {}", path.display()),
        }
    }
    sources.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Ok(sources.into_iter().map(|(path, _)| path).collect())
}

fn add_source(builder: &mut AtlasBuilder, path: &Path) -> Result<()> {
    let stem = path
        .file_stem()
        .and_then(OsStr::to_str)
        .with_context(|| format!("non-UTF-8 file name: {}", path.display()))?;
    let name = catalogue::atlas_name(stem);
    // The tileset prefix routes a source to the tile extractor no matter
    // which format it arrived in.
    let is_tileset = stem.starts_with("tileset");

    if path.extension().and_then(OsStr::to_str) == Some("png") {
        let image = image::open(path)
            .with_context(|| format!("decoding {}", path.display()))?
            .to_rgba8();
        if is_tileset {
            let extracted = tiles::extract_tiles_from_image(&image)
                .with_context(|| format!("extracting tiles from {}", path.display()))?;
            builder.add_tileset(&name, extracted);
        } else {
            builder.add_image(&name, image);
        }
        return Ok(());
    }

    let ase =
        AsepriteFile::read_file(path).with_context(|| format!("decoding {}", path.display()))?;
    if is_tileset {
        let extracted = tiles::extract_tiles(&ase)
            .with_context(|| format!("extracting tiles from {}", path.display()))?;
        builder.add_tileset(&name, extracted);
    } else {
        let flattened = flatten::flatten(&ase)
            .with_context(|| format!("flattening {}", path.display()))?;
        builder.add_document(&name, flattened);
    }
    Ok(())
}

fn add_font(builder: &mut AtlasBuilder, config: &Config) {
    let Some(font_path) = &config.font else {
        debug!("no font configured");
        return;
    };
    let font_bytes = match fs::read(font_path) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(
                "font file {} not readable ({}); continuing without glyphs",
                font_path.display(),
                err
            );
            return;
        }
    };
    match font::rasterize_glyphs(&font_bytes, &config.charset, config.font_px) {
        Ok(glyphs) => builder.add_glyphs(glyphs),
        Err(err) => warn!(
            "could not rasterize {} ({:#}); continuing without glyphs",
            font_path.display(),
            err
        ),
    }
}

fn write_outputs(atlas: &Atlas, config: &Config) -> Result<()> {
    atlas
        .image
        .save_with_format(&config.out_image, ImageFormat::Png)
        .with_context(|| format!("writing atlas image {}", config.out_image.display()))?;
    catalogue::write_file(&config.out_catalogue, atlas)
        .with_context(|| format!("writing catalogue {}", config.out_catalogue.display()))?;
    Ok(())
}
