/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use clap::builder::PossibleValue;
use clap::{value_parser, Arg, ArgAction, Command, ValueEnum};

/// Chroma subsampling mode as accepted on the command line, mirrored
/// one-to-one onto [`zune_jpeg_encode::Sampling`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CliSampling {
    S444,
    S422,
    S420
}

impl CliSampling {
    pub fn into_sampling(self) -> zune_jpeg_encode::Sampling {
        match self {
            CliSampling::S444 => zune_jpeg_encode::Sampling::S444,
            CliSampling::S422 => zune_jpeg_encode::Sampling::S422,
            CliSampling::S420 => zune_jpeg_encode::Sampling::S420
        }
    }
}

impl ValueEnum for CliSampling {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::S444, Self::S422, Self::S420]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        Some(match self {
            Self::S444 => PossibleValue::new("0").alias("444"),
            Self::S422 => PossibleValue::new("1").alias("422"),
            Self::S420 => PossibleValue::new("2").alias("420")
        })
    }
}

#[rustfmt::skip]
pub fn create_cmd_args() -> Command {
    Command::new("zune-jfif")
        .author("Caleb Etemesi")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Encode a 24-bit BMP into a baseline sequential JPEG")
        .next_line_help(false)
        .term_width(200)
        .arg(Arg::new("in")
            .help("Input 24-bit, uncompressed BMP file")
            .action(ArgAction::Set)
            .value_parser(value_parser!(std::ffi::OsString))
            .required(true))
        .arg(Arg::new("out")
            .help("Output JPEG file")
            .action(ArgAction::Set)
            .value_parser(value_parser!(std::ffi::OsString))
            .required(true))
        .arg(Arg::new("quality")
            .help("Quality in [1,100]; out-of-range values are clamped to 50")
            .action(ArgAction::Set)
            .value_parser(value_parser!(u8))
            .required(true))
        .arg(Arg::new("sampling")
            .help("Chroma subsampling mode: 0=4:4:4, 1=4:2:2, 2=4:2:0")
            .action(ArgAction::Set)
            .value_parser(value_parser!(CliSampling))
            .required(true))
        .arg(Arg::new("debug")
            .long("debug")
            .help_heading("LOGGING")
            .help("Display debug information")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("trace")
            .long("trace")
            .help_heading("LOGGING")
            .help("Display very verbose debugging information")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("warn")
            .long("warn")
            .help_heading("LOGGING")
            .help("Display warnings and errors")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("info")
            .long("info")
            .help_heading("LOGGING")
            .help("Display progress information")
            .action(ArgAction::SetTrue))
}
