/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Arg, ArgMatches, Command, value_parser};
use clap_complete::Shell;

const COMMAND_VERSION: &str = "version";
const COMMAND_COMPLETION: &str = "completion";

fn build_cli_args() -> Command {
    g3firehose::add_global_args(Command::new(g3firehose::build::PKG_NAME))
        .subcommand(Command::new(COMMAND_VERSION).override_help("Show version"))
        .subcommand(
            Command::new(COMMAND_COMPLETION).arg(
                Arg::new("target")
                    .value_name("SHELL")
                    .required(true)
                    .num_args(1)
                    .value_parser(value_parser!(Shell)),
            ),
        )
}

fn main() -> anyhow::Result<ExitCode> {
    let args = build_cli_args().get_matches();
    let proc_args = g3firehose::parse_global_args(&args)?;

    match args.subcommand() {
        Some((COMMAND_VERSION, _)) => {
            g3firehose::build::print_version();
            return Ok(ExitCode::SUCCESS);
        }
        Some((COMMAND_COMPLETION, sub_args)) => {
            generate_completion(sub_args);
            return Ok(ExitCode::SUCCESS);
        }
        _ => {}
    }

    let _log_guard =
        g3firehose::log::setup(proc_args.verbose_level).context("failed to setup logger")?;
    proc_args.summary();

    let rt = proc_args
        .main_runtime()
        .context("failed to start main runtime")?;
    rt.block_on(g3firehose::run(&proc_args))?;

    // only a quit signal ends the run
    Ok(ExitCode::FAILURE)
}

fn generate_completion(args: &ArgMatches) {
    if let Some(target) = args.get_one::<Shell>("target") {
        let mut app = build_cli_args();
        let bin_name = app.get_name().to_string();
        clap_complete::generate(*target, &mut app, bin_name, &mut io::stdout());
    }
}
