/*
 * Copyright 2025  Simon Arlott
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program.  If not, see <http://www.gnu.org/licenses/>.
 */
mod browser;
mod config;
mod desktop;
mod kiosk;
mod login;

use std::{env, process::ExitCode};

use anyhow::Error;
use clap::CommandFactory;
use config::{CommandLineArgs, Settings};
use log::error;

fn main() -> Result<ExitCode, Error> {
	let args = CommandLineArgs::parse_go_style(env::args_os()).unwrap_or_else(|err| err.exit());

	stderrlog::new()
		.module(module_path!())
		.show_module_names(true)
		.verbosity(usize::from(args.verbose) + 2)
		.init()?;

	let settings = match Settings::try_from(&args) {
		Ok(settings) => settings,
		Err(err) => {
			eprintln!("{}", CommandLineArgs::command().render_help());
			error!("{err}");
			return Ok(ExitCode::FAILURE);
		}
	};

	kiosk::run(&settings, &mut kiosk::Chromium::default())?;
	Ok(ExitCode::SUCCESS)
}
