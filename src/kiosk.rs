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

use std::path::Path;

use anyhow::Error;
use log::{debug, error, info};
use url::Url;

use crate::{
	browser::{self, Browser},
	config::{Credentials, LoginMethod, Settings, ViewOptions},
	desktop::{self, X11Session},
	login::{self, Login, SignIn},
};

/// Launchers that put a dashboard on screen. Each launcher blocks until
/// the kiosk session ends.
#[cfg_attr(test, mockall::automock)]
pub trait Kiosk {
	fn initialize_lxde(&mut self, home: &Path);

	fn local(&mut self, url: &Url, credentials: &Credentials, view: ViewOptions)
	-> Result<(), Error>;

	fn gcom(&mut self, url: &Url, credentials: &Credentials, view: ViewOptions)
	-> Result<(), Error>;

	fn anonymous(&mut self, url: &Url, view: ViewOptions) -> Result<(), Error>;
}

pub fn run<K: Kiosk>(settings: &Settings, kiosk: &mut K) -> Result<(), Error> {
	if settings.view.playlist {
		info!("Playlist mode");
	}

	if settings.lxde {
		kiosk.initialize_lxde(&settings.lxde_home);
	}

	debug!(
		"Login method {}, kiosk mode {}",
		settings.login_method.as_ref(),
		settings.view.kiosk_mode.as_ref()
	);

	match settings.login_method {
		LoginMethod::Local => {
			info!("Launching local login kiosk");
			kiosk.local(&settings.url, &settings.credentials, settings.view)
		}
		LoginMethod::Gcom => {
			info!("Launching GCOM login kiosk");
			kiosk.gcom(&settings.url, &settings.credentials, settings.view)
		}
		LoginMethod::Anonymous => {
			info!("Launching ANON login kiosk");
			kiosk.anonymous(&settings.url, settings.view)
		}
	}
}

/// Kiosk running in chromium, signing in with xdotool keyboard input.
#[derive(Debug, Default)]
pub struct Chromium {
	session: Option<X11Session>,
}

impl Chromium {
	fn launch(&self, login: Login, url: &Url, view: ViewOptions) -> Result<(), Error> {
		let target = browser::kiosk_url(url, view);
		let start = login.start_url(&target)?;
		let running = Browser::new(view.kiosk_mode, self.session.clone()).launch(&start)?;

		if let Err(err) = login.sign_in(&running, &target) {
			error!("{login:?} login failed: {err:#}");
		}

		running.wait()
	}
}

impl Kiosk for Chromium {
	fn initialize_lxde(&mut self, home: &Path) {
		self.session = Some(desktop::initialize_lxde(home));
	}

	fn local(
		&mut self,
		url: &Url,
		credentials: &Credentials,
		view: ViewOptions,
	) -> Result<(), Error> {
		self.launch(
			Login::from(login::Local::new(credentials.clone())),
			url,
			view,
		)
	}

	fn gcom(
		&mut self,
		url: &Url,
		credentials: &Credentials,
		view: ViewOptions,
	) -> Result<(), Error> {
		self.launch(
			Login::from(login::Gcom::new(credentials.clone())),
			url,
			view,
		)
	}

	fn anonymous(&mut self, url: &Url, view: ViewOptions) -> Result<(), Error> {
		self.launch(Login::from(login::Anonymous), url, view)
	}
}
