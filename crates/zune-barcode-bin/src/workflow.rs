/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::fmt::{Debug, Formatter};
use std::path::Path;
use std::time::Instant;

use clap::ArgMatches;
use log::{debug, info, warn};
use zune_barcode_bridge::{
    decode_from_compressed_image, encode_text_to_representations, ErrorDescriptor
};

use crate::cmd_parsers::{get_reader_options, get_writer_options};
use crate::file_io::OutputKind;

pub enum CmdErrors {
    Io(std::io::Error),
    Json(serde_json::Error),
    /// A call reported an error in its results
    Bridge(ErrorDescriptor),
    Generic(String)
}

impl Debug for CmdErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => writeln!(f, "IO error: {err}"),
            Self::Json(err) => writeln!(f, "Could not serialize results: {err}"),
            Self::Bridge(err) => writeln!(f, "{err}"),
            Self::Generic(err) => writeln!(f, "{err}")
        }
    }
}

impl From<std::io::Error> for CmdErrors {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for CmdErrors {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

fn decode_files(args: &ArgMatches) -> Result<(), CmdErrors> {
    let options = get_reader_options(args);
    let files = args
        .get_many::<String>("in")
        .ok_or_else(|| CmdErrors::Generic("no input files".to_string()))?;

    let mut first_error = None;

    for file in files {
        let start = Instant::now();
        let bytes = std::fs::read(file)?;
        let results = decode_from_compressed_image(&bytes, &options);
        info!("{file}: {} result(s) in {:?}", results.len(), start.elapsed());

        println!("{}", serde_json::to_string_pretty(&results)?);

        if let Some(failed) = results.iter().find(|r| !r.error.is_empty()) {
            warn!("{file}: {}", failed.error);
            first_error.get_or_insert_with(|| failed.error.clone());
        }
    }
    match first_error {
        Some(err) => Err(CmdErrors::Bridge(err)),
        None => Ok(())
    }
}

fn encode_text(args: &ArgMatches) -> Result<(), CmdErrors> {
    let text = args
        .get_one::<String>("text")
        .ok_or_else(|| CmdErrors::Generic("no text to encode".to_string()))?;
    let out = args
        .get_one::<String>("out")
        .ok_or_else(|| CmdErrors::Generic("no output file".to_string()))?;
    let out = Path::new(out);

    let kind = OutputKind::from_path(out).ok_or_else(|| {
        CmdErrors::Generic(format!(
            "Unknown output extension for {}, expected .png, .svg or .txt",
            out.display()
        ))
    })?;
    let options = get_writer_options(args);
    let options = match kind {
        OutputKind::Png => options.set_with_image(true),
        OutputKind::Svg => options.set_with_svg(true),
        OutputKind::Text => options.set_with_utf8(true)
    };

    let start = Instant::now();
    let encoded = encode_text_to_representations(text, &options);
    if !encoded.is_valid() {
        return Err(CmdErrors::Bridge(encoded.error));
    }
    debug!(
        "Encoded {} as {}x{} pixels in {:?}",
        encoded.format,
        encoded.bitmap.width,
        encoded.bitmap.height,
        start.elapsed()
    );

    match kind {
        OutputKind::Png => std::fs::write(out, &encoded.image)?,
        OutputKind::Svg => std::fs::write(out, &encoded.svg)?,
        OutputKind::Text => std::fs::write(out, &encoded.utf8)?
    }
    info!("Wrote {}", out.display());
    Ok(())
}

pub fn run_cmd(options: &ArgMatches) -> Result<(), CmdErrors> {
    match options.subcommand() {
        Some(("decode", args)) => decode_files(args),
        Some(("encode", args)) => encode_text(args),
        Some((name, _)) => Err(CmdErrors::Generic(format!("Unknown command {name}"))),
        None => Err(CmdErrors::Generic("No command given".to_string()))
    }
}
