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

use std::{fmt, thread, time::Duration};

use anyhow::Error;
use enum_dispatch::enum_dispatch;
use log::{debug, info};
use url::Url;

use crate::{
	browser::{Keyboard, Running},
	config::Credentials,
};

/// Time for a login form to load after the browser window appears.
const PAGE_LOAD: Duration = Duration::from_secs(5);

/// Time for the Grafana.com OAuth redirects to land back on Grafana.
const OAUTH_REDIRECT: Duration = Duration::from_secs(10);

#[enum_dispatch]
pub trait SignIn {
	/// Page the browser is started on.
	fn start_url(&self, target: &Url) -> Result<Url, Error>;

	/// Sign in on the running browser, leaving it on `target`.
	fn sign_in(&self, browser: &Running, target: &Url) -> Result<(), Error>;
}

#[enum_dispatch(SignIn)]
#[derive(strum::AsRefStr)]
pub enum Login {
	Anonymous,
	Local,
	Gcom,
}

#[derive(Debug)]
pub struct Anonymous;

#[derive(Debug)]
pub struct Local {
	credentials: Credentials,
}

/// Grafana.com OAuth login.
#[derive(Debug)]
pub struct Gcom {
	credentials: Credentials,
}

fn enter_credentials(keyboard: &Keyboard, credentials: &Credentials) -> Result<(), Error> {
	debug!("Enter credentials for {}", credentials.username);

	keyboard.type_text(&credentials.username)?;
	keyboard.press("Tab")?;
	keyboard.type_text(&credentials.password)?;
	keyboard.press("Return")
}

impl fmt::Debug for Login {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_ref())
	}
}

impl SignIn for Anonymous {
	fn start_url(&self, target: &Url) -> Result<Url, Error> {
		Ok(target.clone())
	}

	fn sign_in(&self, _browser: &Running, _target: &Url) -> Result<(), Error> {
		Ok(())
	}
}

impl Local {
	pub fn new(credentials: Credentials) -> Self {
		Self { credentials }
	}
}

impl SignIn for Local {
	/* Grafana redirects to its login form and back to the dashboard afterwards */
	fn start_url(&self, target: &Url) -> Result<Url, Error> {
		Ok(target.clone())
	}

	fn sign_in(&self, browser: &Running, _target: &Url) -> Result<(), Error> {
		let keyboard = browser.keyboard()?;

		thread::sleep(PAGE_LOAD);
		enter_credentials(&keyboard, &self.credentials)?;

		info!("Signed in as {}", self.credentials.username);
		Ok(())
	}
}

impl Gcom {
	pub fn new(credentials: Credentials) -> Self {
		Self { credentials }
	}
}

impl SignIn for Gcom {
	fn start_url(&self, target: &Url) -> Result<Url, Error> {
		Ok(target.join("/login/grafana_com")?)
	}

	fn sign_in(&self, browser: &Running, target: &Url) -> Result<(), Error> {
		let keyboard = browser.keyboard()?;

		thread::sleep(PAGE_LOAD);
		enter_credentials(&keyboard, &self.credentials)?;

		info!("Signed in to Grafana.com as {}", self.credentials.username);

		thread::sleep(OAUTH_REDIRECT);
		browser.open(target)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn credentials() -> Credentials {
		Credentials {
			username: "u".to_owned(),
			password: "p".to_owned(),
		}
	}

	fn target() -> Url {
		Url::parse("https://grafana.example.com/d/abc/home?orgId=1&kiosk=1").unwrap()
	}

	#[test]
	fn anonymous_starts_on_dashboard() {
		let login = Login::from(Anonymous);

		assert_eq!(login.start_url(&target()).unwrap(), target());
	}

	#[test]
	fn local_starts_on_dashboard() {
		let login = Login::from(Local::new(credentials()));

		assert_eq!(login.start_url(&target()).unwrap(), target());
	}

	#[test]
	fn gcom_starts_on_oauth_login() {
		let login = Login::from(Gcom::new(credentials()));

		assert_eq!(
			login.start_url(&target()).unwrap().as_str(),
			"https://grafana.example.com/login/grafana_com"
		);
	}

	#[test]
	fn debug_names() {
		assert_eq!(format!("{:?}", Login::from(Anonymous)), "Anonymous");
		assert_eq!(format!("{:?}", Login::from(Gcom::new(credentials()))), "Gcom");
	}
}
