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
	path::Path,
	process::{Child, Command},
};

use anyhow::{Context, Error, anyhow, bail};
use log::{debug, info, trace};
use tempfile::TempDir;
use url::Url;

use crate::{
	config::{KioskMode, ViewOptions},
	desktop::X11Session,
};

const PROGRAM: &str = "chromium-browser";

/// Query parameters owned by the kiosk, replaced on every generated URL.
const KIOSK_PARAMETERS: [&str; 3] = ["kiosk", "autofitpanels", "inactive"];

/// Dashboard URL with the kiosk display parameters applied.
pub fn kiosk_url(url: &Url, view: ViewOptions) -> Url {
	let kept: Vec<(String, String)> = url
		.query_pairs()
		.filter(|(key, _)| !KIOSK_PARAMETERS.iter().any(|parameter| key == parameter))
		.map(|(key, value)| (key.into_owned(), value.into_owned()))
		.collect();
	let mut kiosk = url.clone();

	kiosk.set_query(None);

	{
		let mut query = kiosk.query_pairs_mut();

		query.extend_pairs(&kept);

		match view.kiosk_mode {
			KioskMode::Normal => {
				query.append_pair("kiosk", "1");
			}
			KioskMode::Tv => {
				query.append_pair("kiosk", "tv");
			}
			KioskMode::None => {}
		}

		if view.autofit {
			query.append_key_only("autofitpanels");
		}
		if view.playlist {
			query.append_key_only("inactive");
		}
	}

	if kiosk.query() == Some("") {
		kiosk.set_query(None);
	}

	kiosk
}

#[derive(Debug)]
pub struct Browser {
	kiosk: bool,
	session: Option<X11Session>,
}

/// A browser process with its temporary profile, alive until `wait` returns.
#[derive(Debug)]
pub struct Running {
	browser: Browser,
	profile: TempDir,
	child: Child,
}

/// Keyboard input into the browser window.
#[derive(Debug)]
pub struct Keyboard {
	window: String,
	session: Option<X11Session>,
}

impl Browser {
	const FLAGS: [&str; 9] = [
		"--noerrdialogs",
		"--bwsi",
		"--incognito",
		"--disable-sync",
		"--disable-notifications",
		"--disable-overlay-scrollbar",
		"--ignore-certificate-errors",
		"--window-position=0,0",
		"--check-for-update-interval=31536000",
	];

	pub fn new(kiosk_mode: KioskMode, session: Option<X11Session>) -> Self {
		Self {
			kiosk: kiosk_mode != KioskMode::None,
			session,
		}
	}

	pub fn command(&self, profile: &Path, url: &Url) -> Command {
		let mut command = Command::new(PROGRAM);

		if let Some(session) = &self.session {
			session.apply(&mut command);
		}
		if self.kiosk {
			command.arg("--kiosk");
		}
		command
			.args(Self::FLAGS)
			.arg(format!("--user-data-dir={}", profile.display()))
			.arg(url.as_str());

		command
	}

	pub fn launch(self, url: &Url) -> Result<Running, Error> {
		let profile = tempfile::Builder::new()
			.prefix("grafana-kiosk-")
			.tempdir()
			.context("Unable to create browser profile")?;

		debug!("Browser profile {}", profile.path().display());

		let child = self
			.command(profile.path(), url)
			.spawn()
			.with_context(|| format!("Unable to start {PROGRAM}"))?;

		info!("Browser started on {url}");

		Ok(Running {
			browser: self,
			profile,
			child,
		})
	}
}

impl Running {
	/// Open another URL in the running browser.
	pub fn open(&self, url: &Url) -> Result<(), Error> {
		debug!("Open {url}");

		let status = self
			.browser
			.command(self.profile.path(), url)
			.status()
			.with_context(|| format!("Unable to run {PROGRAM}"))?;

		if !status.success() {
			bail!("Unable to open {url}: {PROGRAM} exited with {status}");
		}
		Ok(())
	}

	pub fn keyboard(&self) -> Result<Keyboard, Error> {
		Keyboard::find(self.browser.session.clone())
	}

	pub fn wait(mut self) -> Result<(), Error> {
		let status = self.child.wait().context("Browser stopped")?;

		if !status.success() {
			bail!("Browser exited with {status}");
		}

		info!("Browser exited");
		Ok(())
	}
}

impl Keyboard {
	const WINDOW_CLASS: &str = "chromium";

	/// Wait for a visible browser window to appear.
	pub fn find(session: Option<X11Session>) -> Result<Self, Error> {
		let output = xdotool(
			session.as_ref(),
			&["search", "--sync", "--onlyvisible", "--class", Self::WINDOW_CLASS],
		)?;
		let window = output
			.lines()
			.map(str::trim)
			.find(|line| !line.is_empty())
			.ok_or(anyhow!("Browser window not found"))?
			.to_owned();

		debug!("Browser window {window}");
		Ok(Self { window, session })
	}

	pub fn type_text(&self, text: &str) -> Result<(), Error> {
		self.activate()?;
		xdotool(
			self.session.as_ref(),
			&["type", "--clearmodifiers", "--delay", "50", "--", text],
		)
		.map(drop)
	}

	pub fn press(&self, key: &str) -> Result<(), Error> {
		trace!("Press key on browser: {key}");

		self.activate()?;
		xdotool(self.session.as_ref(), &["key", "--clearmodifiers", key]).map(drop)
	}

	fn activate(&self) -> Result<(), Error> {
		xdotool(
			self.session.as_ref(),
			&["windowactivate", "--sync", self.window.as_str()],
		)
		.map(drop)
	}
}

/// Run an xdotool command, returning its standard output. Only the
/// subcommand is logged, arguments may be credentials.
fn xdotool(session: Option<&X11Session>, args: &[&str]) -> Result<String, Error> {
	let subcommand = args.first().copied().unwrap_or_default();
	let mut command = Command::new("xdotool");

	trace!("Execute: xdotool {subcommand}");

	if let Some(session) = session {
		session.apply(&mut command);
	}

	let output = command
		.args(args)
		.output()
		.context("Unable to run xdotool")?;

	if !output.status.success() {
		bail!(
			"xdotool {subcommand} failed ({}): {}",
			output.status,
			String::from_utf8_lossy(&output.stderr).trim()
		);
	}

	Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
