/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use clap::parser::ValueSource;
use clap::ArgMatches;
use log::info;
use zune_barcode_bridge::{ReaderOptions, WriterOptions};

use crate::cmd_args::{BinarizerArg, TextModeArg};

pub mod global_options;

fn on_command_line(options: &ArgMatches, id: &str) -> bool {
    options.value_source(id) == Some(ValueSource::CommandLine)
}

/// Map the arguments of the `decode` subcommand onto reader options
pub fn get_reader_options(options: &ArgMatches) -> ReaderOptions {
    let mut reader = ReaderOptions::default()
        .set_is_pure(options.get_flag("pure"))
        .set_return_errors(options.get_flag("return-errors"))
        .set_try_rotate(!options.get_flag("no-rotate"))
        .set_try_invert(!options.get_flag("no-invert"));

    if let Some(max) = options.get_one::<u8>("max-symbols") {
        reader = reader.set_max_number_of_symbols(*max);
    }
    if let Some(formats) = options.get_one::<String>("formats") {
        info!("Looking for {formats}");
        reader = reader.set_format_names(formats.as_str());
    }
    if let Some(BinarizerArg(binarizer)) = options.get_one::<BinarizerArg>("binarizer") {
        info!("Using the {} binarizer", binarizer.name());
        reader = reader.set_binarizer(*binarizer);
    }
    if let Some(TextModeArg(mode)) = options.get_one::<TextModeArg>("text-mode") {
        reader = reader.set_text_mode(*mode);
    }
    reader
}

/// Map the arguments of the `encode` subcommand onto writer options
///
/// Representations are left off here, the output file decides which
/// one is produced.
pub fn get_writer_options(options: &ArgMatches) -> WriterOptions {
    let mut writer = WriterOptions::default()
        .set_with_quiet_zones(!options.get_flag("no-quiet-zone"))
        .set_with_hrt(options.get_flag("hrt"))
        .set_with_svg(false)
        .set_with_utf8(false)
        .set_with_image(false);

    if let Some(format) = options.get_one::<String>("format") {
        writer = writer.set_format_name(format.as_str());
    }
    if let Some(scale) = options.get_one::<u16>("scale") {
        writer = writer.set_scale(*scale);
    }
    if let Some(hint) = options.get_one::<u16>("size-hint") {
        writer = writer.set_size_hint(*hint);
    }
    if let Some(turns) = options.get_one::<i32>("rotate") {
        writer = writer.set_rotate(*turns);
    }
    if on_command_line(options, "ec-level") {
        if let Some(level) = options.get_one::<String>("ec-level") {
            info!("Error correction level {level}");
            writer = writer.set_ec_level(level.as_str());
        }
    }
    writer
}
