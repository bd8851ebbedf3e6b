/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::process::exit;

use log::error;

mod cmd_args;
mod cmd_parsers;
mod encode;

pub fn main() {
    let cmd = cmd_args::create_cmd_args();
    let options = cmd.get_matches();

    cmd_parsers::global_options::setup_logger(&options);

    let result = encode::run_encode(&options);

    if let Err(err) = result {
        println!();
        error!(" Could not complete workflow, reason {err:?}");
        println!();
        exit(-1);
    }
}
