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

use std::{
	path::{Path, PathBuf},
	process::Command,
};

use log::{debug, info, trace, warn};

/// X server that child processes connect to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct X11Session {
	pub display: String,
	pub xauthority: PathBuf,
}

impl X11Session {
	const DISPLAY: &str = ":0.0";

	pub fn for_home(home: &Path) -> Self {
		Self {
			display: Self::DISPLAY.to_owned(),
			xauthority: home.join(".Xauthority"),
		}
	}

	pub fn apply<'a>(&self, command: &'a mut Command) -> &'a mut Command {
		command
			.env("DISPLAY", &self.display)
			.env("XAUTHORITY", &self.xauthority)
	}
}

/// Prepare the LXDE session owned by the user at `home` to host the kiosk:
/// point child processes at its X server and stop the screen from blanking.
pub fn initialize_lxde(home: &Path) -> X11Session {
	const SCREEN_BLANKING_OFF: [&[&str]; 3] = [&["s", "off"], &["-dpms"], &["s", "noblank"]];
	let session = X11Session::for_home(home);

	info!("Initializing LXDE session for {}", home.display());

	if !session.xauthority.exists() {
		warn!(
			"X authority file {} not found",
			session.xauthority.display()
		);
	}

	for args in SCREEN_BLANKING_OFF {
		xset(&session, args);
	}

	session
}

fn xset(session: &X11Session, args: &[&str]) {
	let description = "xset ".to_owned() + &args.join(" ");

	trace!("Execute: {description}");

	match session.apply(&mut Command::new("xset")).args(args).output() {
		Ok(output) if output.status.success() => debug!("{description}: ok"),
		Ok(output) => warn!(
			"{description} failed ({}): {}",
			output.status,
			String::from_utf8_lossy(&output.stderr).trim()
		),
		Err(err) => warn!("Unable to run {description}: {err}"),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::ffi::OsStr;

	#[test]
	fn session_for_home() {
		let session = X11Session::for_home(Path::new("/home/pi"));

		assert_eq!(session.display, ":0.0");
		assert_eq!(session.xauthority, PathBuf::from("/home/pi/.Xauthority"));
	}

	#[test]
	fn session_environment() {
		let home = tempfile::tempdir().unwrap();
		let session = X11Session::for_home(home.path());
		let mut command = Command::new("true");

		session.apply(&mut command);

		let envs: Vec<_> = command.get_envs().collect();
		let xauthority = home.path().join(".Xauthority");

		assert!(envs.contains(&(OsStr::new("DISPLAY"), Some(OsStr::new(":0.0")))));
		assert!(envs.contains(&(OsStr::new("XAUTHORITY"), Some(xauthority.as_os_str()))));
	}
}
