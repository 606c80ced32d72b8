/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use clap::builder::PossibleValue;
use clap::{value_parser, Arg, ArgAction, Command, ValueEnum};
use zune_barcode::{Binarizer, TextMode};

use crate::cmd_args::help_strings::{EC_LEVEL_HELP, FORMATS_HELP, OUTPUT_HELP};

pub(crate) mod help_strings;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct BinarizerArg(pub Binarizer);

impl ValueEnum for BinarizerArg
{
    fn value_variants<'a>() -> &'a [Self]
    {
        &[
            Self(Binarizer::LocalAverage),
            Self(Binarizer::GlobalHistogram),
            Self(Binarizer::FixedThreshold),
            Self(Binarizer::BoolCast)
        ]
    }

    fn to_possible_value(&self) -> Option<PossibleValue>
    {
        Some(match self.0
        {
            Binarizer::LocalAverage => PossibleValue::new("local-average"),
            Binarizer::GlobalHistogram => PossibleValue::new("global-histogram"),
            Binarizer::FixedThreshold => PossibleValue::new("fixed-threshold"),
            Binarizer::BoolCast => PossibleValue::new("bool-cast")
        })
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct TextModeArg(pub TextMode);

impl ValueEnum for TextModeArg
{
    fn value_variants<'a>() -> &'a [Self]
    {
        &[
            Self(TextMode::Plain),
            Self(TextMode::ECI),
            Self(TextMode::HRI),
            Self(TextMode::Hex),
            Self(TextMode::Escaped)
        ]
    }

    fn to_possible_value(&self) -> Option<PossibleValue>
    {
        Some(match self.0
        {
            TextMode::Plain => PossibleValue::new("plain"),
            TextMode::ECI => PossibleValue::new("eci"),
            TextMode::HRI => PossibleValue::new("hri"),
            TextMode::Hex => PossibleValue::new("hex"),
            TextMode::Escaped => PossibleValue::new("escaped")
        })
    }
}

#[rustfmt::skip]
fn decode_options() -> Command {
    Command::new("decode")
        .about("Read barcodes from images and print them as JSON")
        .arg(Arg::new("in")
            .short('i')
            .long("input")
            .help("PNG or JPEG file to read barcodes from")
            .action(ArgAction::Append)
            .required(true))
        .arg(Arg::new("formats")
            .long("formats")
            .help("Formats to look for, all readable formats when absent")
            .long_help(FORMATS_HELP))
        .arg(Arg::new("pure")
            .long("pure")
            .action(ArgAction::SetTrue)
            .help("The image holds one unrotated, unskewed symbol and nothing else"))
        .arg(Arg::new("return-errors")
            .long("return-errors")
            .action(ArgAction::SetTrue)
            .help("Also report symbols that were found but did not decode"))
        .arg(Arg::new("max-symbols")
            .long("max-symbols")
            .help("Stop after this many symbols, 0 for no limit")
            .value_parser(value_parser!(u8))
            .default_value("255"))
        .arg(Arg::new("binarizer")
            .long("binarizer")
            .help_heading("ADVANCED")
            .help("How pixels are split into dark and light")
            .value_parser(value_parser!(BinarizerArg)))
        .arg(Arg::new("text-mode")
            .long("text-mode")
            .help_heading("ADVANCED")
            .help("How payload bytes are turned into text")
            .value_parser(value_parser!(TextModeArg)))
        .arg(Arg::new("no-rotate")
            .long("no-rotate")
            .help_heading("ADVANCED")
            .action(ArgAction::SetTrue)
            .help("Do not look for rotated linear symbols"))
        .arg(Arg::new("no-invert")
            .long("no-invert")
            .help_heading("ADVANCED")
            .action(ArgAction::SetTrue)
            .help("Do not look for light on dark symbols"))
}

#[rustfmt::skip]
fn encode_options() -> Command {
    Command::new("encode")
        .about("Create a barcode and write it as PNG, SVG or text")
        .arg(Arg::new("text")
            .short('t')
            .long("text")
            .help("Content of the symbol")
            .required(true))
        .arg(Arg::new("format")
            .short('f')
            .long("format")
            .help("Format name or label, e.g. QRCode or EAN-13")
            .required(true))
        .arg(Arg::new("out")
            .short('o')
            .long("output")
            .help("File to write, its extension picks the representation")
            .long_help(OUTPUT_HELP)
            .required(true))
        .arg(Arg::new("scale")
            .long("scale")
            .help("Pixels per module, 0 derives it from --size-hint")
            .value_parser(value_parser!(u16))
            .default_value("0"))
        .arg(Arg::new("size-hint")
            .long("size-hint")
            .help("Minimum width in pixels when --scale is 0")
            .value_parser(value_parser!(u16))
            .default_value("200"))
        .arg(Arg::new("ec-level")
            .long("ec-level")
            .help("Error correction level")
            .long_help(EC_LEVEL_HELP))
        .arg(Arg::new("no-quiet-zone")
            .long("no-quiet-zone")
            .action(ArgAction::SetTrue)
            .help("Do not add a blank border around the symbol"))
        .arg(Arg::new("hrt")
            .long("hrt")
            .action(ArgAction::SetTrue)
            .help("Print the human readable text under linear symbols"))
        .arg(Arg::new("rotate")
            .long("rotate")
            .help("Clockwise quarter turns")
            .value_parser(value_parser!(i32))
            .allow_negative_numbers(true)
            .default_value("0"))
}

#[rustfmt::skip]
pub fn create_cmd_args() -> Command {
    Command::new("zune-barcode")
        .about("Read and write barcodes")
        .subcommand(decode_options())
        .subcommand(encode_options())
        .subcommand_required(true)
        .arg(Arg::new("debug")
            .long("debug")
            .action(ArgAction::SetTrue)
            .global(true)
            .help_heading("LOGGING")
            .help("Display debug information and higher"))
        .arg(Arg::new("trace")
            .long("trace")
            .action(ArgAction::SetTrue)
            .global(true)
            .help_heading("LOGGING")
            .help("Display very verbose information"))
        .arg(Arg::new("warn")
            .long("warn")
            .action(ArgAction::SetTrue)
            .global(true)
            .help_heading("LOGGING")
            .help("Display warnings and errors"))
        .arg(Arg::new("info")
            .long("info")
            .action(ArgAction::SetTrue)
            .global(true)
            .help_heading("LOGGING")
            .help("Display information about the options in use"))
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn command_is_well_formed()
    {
        create_cmd_args().debug_assert();
    }

    #[test]
    fn decode_arguments()
    {
        let matches = create_cmd_args()
            .try_get_matches_from([
                "zune-barcode", "decode", "-i", "a.png", "-i", "b.jpg", "--binarizer",
                "bool-cast", "--max-symbols", "3", "--debug"
            ])
            .unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "decode");
        assert_eq!(sub.get_many::<String>("in").unwrap().count(), 2);
        assert_eq!(sub.get_one::<u8>("max-symbols"), Some(&3));
        assert_eq!(
            sub.get_one::<BinarizerArg>("binarizer"),
            Some(&BinarizerArg(Binarizer::BoolCast))
        );
        assert!(sub.get_flag("debug"));
    }

    #[test]
    fn encode_requires_a_format()
    {
        let result = create_cmd_args().try_get_matches_from(["zune-barcode", "encode", "-t", "x", "-o", "x.png"]);
        assert!(result.is_err());
    }
}
